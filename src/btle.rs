//! [`Adapter`] implementation on top of `btleplug`.

use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{
    Central, CentralEvent, CharPropFlags, Characteristic, Manager as _, Peripheral as _,
    ScanFilter,
};
use btleplug::platform::{Adapter as PlatformAdapter, Manager, Peripheral, PeripheralId};
use futures::StreamExt;
use tokio::time::{timeout, timeout_at, Instant};

use crate::adapter::{Adapter, Connection, DiscoveredDevice, GattService};
use crate::common::display_uuid;
use crate::config::ScanConfig;
use crate::{Error, Result};

/// The platform's BLE stack.
pub struct BtleAdapter {
    _manager: Manager,
    adapter: PlatformAdapter,
    config: ScanConfig,
}

impl BtleAdapter {
    /// Open the adapter selected by `config`.
    pub async fn new(config: ScanConfig) -> Result<Self> {
        let manager = Manager::new().await?;
        let mut adapters = manager.adapters().await?;

        if config.adapter_index >= adapters.len() {
            return Err(Error::NoAdapter(config.adapter_index));
        }

        let adapter = adapters.swap_remove(config.adapter_index);

        log::trace!("Using adapter: {:?}", adapter);

        Ok(Self {
            _manager: manager,
            adapter,
            config,
        })
    }

    async fn find_peripheral(&self, address: &str) -> Result<Option<Peripheral>> {
        let peripherals = self.adapter.peripherals().await?;

        Ok(peripherals
            .into_iter()
            .find(|p| p.address().to_string().eq_ignore_ascii_case(address)))
    }

    async fn describe(&self, id: &PeripheralId) -> Option<DiscoveredDevice> {
        let peripheral = self.adapter.peripheral(id).await.ok()?;
        let props = peripheral.properties().await.ok().flatten();

        let name = props.as_ref().and_then(|props| props.local_name.clone());
        if !self.config.accepts_name(name.as_deref()) {
            return None;
        }

        Some(DiscoveredDevice {
            address: peripheral.address().to_string(),
            name,
            rssi: props.and_then(|props| props.rssi),
        })
    }
}

#[async_trait]
impl Adapter for BtleAdapter {
    type Connection = BtleConnection;

    async fn discover(&self) -> Result<Vec<DiscoveredDevice>> {
        let mut events = self.adapter.events().await?;

        log::info!("Starting the scan");
        self.adapter.start_scan(ScanFilter::default()).await?;

        let deadline = Instant::now() + self.config.duration;
        let mut found: Vec<DiscoveredDevice> = Vec::new();

        while let Ok(Some(event)) = timeout_at(deadline, events.next()).await {
            let id = match event {
                CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => id,
                _ => continue,
            };

            if let Some(device) = self.describe(&id).await {
                match found.iter_mut().find(|d| d.address == device.address) {
                    // Later advertisements may carry a name or fresher RSSI.
                    Some(known) => *known = device,
                    None => {
                        log::debug!("Device discovered: {:?}", device);
                        found.push(device);
                    }
                }
            }

            if self
                .config
                .max_results
                .filter(|max_results| found.len() >= *max_results)
                .is_some()
            {
                log::info!("Scanner stop condition reached.");
                break;
            }
        }

        if let Err(e) = self.adapter.stop_scan().await {
            log::warn!("Could not stop the scan: {}", e);
        }

        log::info!("Scan finished with {} devices", found.len());
        Ok(found)
    }

    async fn connect(&self, address: &str, limit: Duration) -> Result<BtleConnection> {
        let peripheral = self
            .find_peripheral(address)
            .await?
            .ok_or_else(|| Error::DeviceNotFound(address.to_owned()))?;

        match timeout(limit, peripheral.connect()).await {
            Ok(Ok(())) => Ok(BtleConnection { peripheral }),
            Ok(Err(btleplug::Error::DeviceNotFound)) => {
                Err(Error::DeviceNotFound(address.to_owned()))
            }
            Ok(Err(btleplug::Error::TimedOut(_))) | Err(_) => Err(Error::ConnectTimeout(limit)),
            Ok(Err(e)) => Err(e.into()),
        }
    }
}

/// A connected `btleplug` peripheral.
pub struct BtleConnection {
    peripheral: Peripheral,
}

impl BtleConnection {
    /// Look `uuid` up inside `service` only; vendor profiles often repeat a
    /// characteristic UUID across services.
    fn find_characteristic(&self, service: &str, uuid: &str) -> Option<Characteristic> {
        self.peripheral
            .services()
            .into_iter()
            .filter(|s| display_uuid(&s.uuid) == service)
            .flat_map(|s| s.characteristics.into_iter())
            .find(|c| display_uuid(&c.uuid) == uuid)
    }
}

#[async_trait]
impl Connection for BtleConnection {
    async fn services(&self) -> Result<Vec<GattService>> {
        let mut services = self.peripheral.services();
        if services.is_empty() {
            self.peripheral.discover_services().await?;
            services = self.peripheral.services();
        }

        Ok(services
            .into_iter()
            .map(|service| GattService {
                uuid: display_uuid(&service.uuid),
                characteristics: service
                    .characteristics
                    .iter()
                    .map(|c| display_uuid(&c.uuid))
                    .collect(),
            })
            .collect())
    }

    async fn read_characteristic(&self, service: &str, uuid: &str) -> Result<Vec<u8>> {
        let failure = |reason: String| Error::ReadFailure {
            uuid: uuid.to_owned(),
            reason,
        };

        let characteristic = self
            .find_characteristic(service, uuid)
            .ok_or_else(|| failure("no such characteristic".into()))?;

        if !characteristic.properties.contains(CharPropFlags::READ) {
            return Err(failure("not readable".into()));
        }

        self.peripheral
            .read(&characteristic)
            .await
            .map_err(|e| failure(e.to_string()))
    }

    async fn disconnect(&self) -> Result<()> {
        self.peripheral.disconnect().await?;
        Ok(())
    }
}
