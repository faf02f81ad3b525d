use std::time::Duration;

use crate::adapter::{Adapter, Connection, DiscoveredDevice};
use crate::characteristic::CharacteristicReader;
use crate::config::DEFAULT_CONNECT_TIMEOUT;
use crate::model::{DeviceRecord, ServiceRecord};
use crate::reporter::{Progress, Reporter};
use crate::session::CancelToken;
use crate::Error;

/// Connects to one device and walks its GATT tree.
pub struct DeviceEnumerator<'a, A: ?Sized> {
    adapter: &'a A,
    reader: CharacteristicReader,
    connect_timeout: Duration,
}

impl<'a, A> DeviceEnumerator<'a, A>
where
    A: Adapter + ?Sized,
{
    pub fn new(adapter: &'a A) -> Self {
        Self {
            adapter,
            reader: CharacteristicReader::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Enumerate `device` and return whatever could be learned.
    ///
    /// Never fails: connection problems yield an unconnected record, and a stop
    /// request leaves the record holding the services collected so far. A
    /// successful connection is always followed by exactly one disconnect.
    pub async fn enumerate(
        &self,
        device: &DiscoveredDevice,
        reporter: &dyn Reporter,
        cancel: &CancelToken,
    ) -> DeviceRecord {
        let mut record = DeviceRecord::new(device);
        let address = device.address.as_str();

        reporter.report(&Progress::Connecting {
            address: address.to_owned(),
        });

        let connection = match self.adapter.connect(address, self.connect_timeout).await {
            Ok(connection) => connection,
            Err(e) => {
                let error = match e {
                    Error::ConnectTimeout(_) => "timeout".to_owned(),
                    Error::DeviceNotFound(_) => "device not found".to_owned(),
                    other => format!("error: {}", other),
                };
                reporter.report(&Progress::ConnectFailed {
                    address: address.to_owned(),
                    error,
                });
                return record;
            }
        };

        record.connected = true;
        reporter.report(&Progress::Connected {
            address: address.to_owned(),
        });

        self.enumerate_services(&connection, &mut record, reporter, cancel)
            .await;

        reporter.report(&Progress::Disconnecting {
            address: address.to_owned(),
        });
        if let Err(e) = connection.disconnect().await {
            reporter.report(&Progress::DisconnectFailed {
                address: address.to_owned(),
                error: e.to_string(),
            });
        }

        record
    }

    async fn enumerate_services(
        &self,
        connection: &A::Connection,
        record: &mut DeviceRecord,
        reporter: &dyn Reporter,
        cancel: &CancelToken,
    ) {
        let services = match connection.services().await {
            Ok(services) => services,
            Err(e) => {
                reporter.report(&Progress::ServiceDiscoveryFailed {
                    address: record.address.clone(),
                    error: e.to_string(),
                });
                return;
            }
        };

        reporter.report(&Progress::ServicesDiscovered {
            address: record.address.clone(),
            count: services.len(),
        });

        for service in services {
            if !cancel.is_running() {
                break;
            }

            let mut service_record = ServiceRecord::new(service.uuid.clone());
            let mut interrupted = false;

            for uuid in &service.characteristics {
                if !cancel.is_running() {
                    interrupted = true;
                    break;
                }

                if let Some(value) = self
                    .reader
                    .read(connection, &service.uuid, uuid, cancel)
                    .await
                {
                    service_record.characteristics.push(value);
                }
            }

            reporter.report(&Progress::ServiceEnumerated {
                uuid: service_record.uuid.clone(),
                characteristics: service_record.characteristics.len(),
            });
            record.services.push(service_record);

            if interrupted {
                break;
            }
        }
    }
}
