use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// A device seen while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    pub address: String,
    /// Local name, if the device advertised one
    pub name: Option<String>,
    /// Signal strength in dBm
    pub rssi: Option<i16>,
}

impl DiscoveredDevice {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: None,
            rssi: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_rssi(mut self, rssi: i16) -> Self {
        self.rssi = Some(rssi);
        self
    }
}

/// A GATT service and the UUIDs of its characteristics, in adapter order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GattService {
    pub uuid: String,
    pub characteristics: Vec<String>,
}

/// Access to a platform BLE stack.
///
/// Implementations report failures as values; the enumeration engine decides
/// which of them are fatal (none are).
#[async_trait]
pub trait Adapter: Send + Sync {
    type Connection: Connection;

    /// Scan for advertising devices.
    async fn discover(&self) -> Result<Vec<DiscoveredDevice>>;

    /// Connect to the device at `address`, giving up after `timeout`.
    ///
    /// Expected failures are [`Error::ConnectTimeout`](crate::Error::ConnectTimeout),
    /// [`Error::DeviceNotFound`](crate::Error::DeviceNotFound) and
    /// [`Error::Adapter`](crate::Error::Adapter).
    async fn connect(&self, address: &str, timeout: Duration) -> Result<Self::Connection>;
}

/// An established GATT session with one device.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn services(&self) -> Result<Vec<GattService>>;

    /// Read characteristic `uuid` of `service`. The same characteristic UUID
    /// may appear in several services.
    async fn read_characteristic(&self, service: &str, uuid: &str) -> Result<Vec<u8>>;

    async fn disconnect(&self) -> Result<()>;
}
