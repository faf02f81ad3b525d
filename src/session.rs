use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::adapter::{Adapter, DiscoveredDevice};
use crate::config::EnumerationConfig;
use crate::device::DeviceEnumerator;
use crate::model::EnumerationResult;
use crate::reporter::{Progress, Reporter};
use crate::Result;

/// Shared run flag. Clones observe and control the same run.
///
/// The enumeration loop only reads it, at each device, service and
/// characteristic boundary. An adapter call already in flight is not interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    running: Arc<AtomicBool>,
}

impl CancelToken {
    /// A token whose run is already marked as running.
    pub fn running() -> Self {
        let token = Self::default();
        token.begin();
        token
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask the run to stop at its next checkpoint.
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub(crate) fn begin(&self) {
        self.running.store(true, Ordering::SeqCst);
    }
}

/// Enumerates discovered devices one at a time.
pub struct Session {
    config: EnumerationConfig,
    cancel: CancelToken,
}

impl Default for Session {
    fn default() -> Self {
        Session::new(EnumerationConfig::default())
    }
}

impl Session {
    pub fn new(config: EnumerationConfig) -> Self {
        Self {
            config,
            cancel: CancelToken::default(),
        }
    }

    /// A handle that lets another task or thread stop the run.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn request_stop(&self) {
        self.cancel.request_stop();
    }

    pub fn is_running(&self) -> bool {
        self.cancel.is_running()
    }

    /// Discover devices with `adapter` and enumerate them.
    ///
    /// The run counts as started once discovery begins, so a stop requested
    /// while scanning yields an empty result. Only discovery can fail; the
    /// enumeration itself always yields a result.
    pub async fn start<A>(&self, adapter: &A, reporter: &dyn Reporter) -> Result<EnumerationResult>
    where
        A: Adapter + ?Sized,
    {
        self.cancel.begin();

        let devices = match adapter.discover().await {
            Ok(devices) => devices,
            Err(e) => {
                self.cancel.request_stop();
                return Err(e);
            }
        };
        log::debug!("Discovered {} devices", devices.len());

        Ok(self.enumerate_all(adapter, devices, reporter).await)
    }

    /// Enumerate `devices` in the configured order.
    ///
    /// A stop request ends the run before the next device and the records
    /// produced so far are returned. Repeated addresses keep the last record.
    pub async fn run<A>(
        &self,
        adapter: &A,
        devices: Vec<DiscoveredDevice>,
        reporter: &dyn Reporter,
    ) -> EnumerationResult
    where
        A: Adapter + ?Sized,
    {
        self.cancel.begin();
        self.enumerate_all(adapter, devices, reporter).await
    }

    /// The device loop of an already started run. Honors a stop requested
    /// at any point since the run started.
    async fn enumerate_all<A>(
        &self,
        adapter: &A,
        mut devices: Vec<DiscoveredDevice>,
        reporter: &dyn Reporter,
    ) -> EnumerationResult
    where
        A: Adapter + ?Sized,
    {
        let mut result = EnumerationResult::new();

        self.config.ordering.apply(&mut devices);

        let enumerator =
            DeviceEnumerator::new(adapter).connect_timeout(self.config.connect_timeout);

        reporter.report(&Progress::RunStarted {
            devices: devices.len(),
        });

        for device in &devices {
            if !self.cancel.is_running() {
                reporter.report(&Progress::StopObserved);
                break;
            }

            reporter.report(&Progress::DeviceFound {
                address: device.address.clone(),
                name: device.name.clone(),
                rssi: device.rssi,
            });

            let record = enumerator.enumerate(device, reporter, &self.cancel).await;
            if result.insert(record).is_some() {
                log::debug!("Replaced earlier record for {}", device.address);
            }
        }

        self.cancel.request_stop();

        reporter.report(&Progress::RunFinished {
            devices: result.len(),
        });

        result
    }
}
