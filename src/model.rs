use std::collections::BTreeMap;

use crate::adapter::DiscoveredDevice;

/// What was learned about one device during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub address: String,
    pub name: Option<String>,
    pub rssi: Option<i16>,
    pub connected: bool,
    pub services: Vec<ServiceRecord>,
}

impl DeviceRecord {
    /// An unconnected record carrying the discovery metadata of `device`.
    pub fn new(device: &DiscoveredDevice) -> Self {
        Self {
            address: device.address.clone(),
            name: device.name.clone(),
            rssi: device.rssi,
            connected: false,
            services: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    pub uuid: String,
    /// Decoded characteristic values, in adapter order. Unreadable and
    /// empty values are left out.
    pub characteristics: Vec<String>,
}

impl ServiceRecord {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            characteristics: Vec::new(),
        }
    }
}

/// Device records keyed by address.
///
/// Inserting an address that is already present replaces the earlier record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumerationResult {
    devices: BTreeMap<String, DeviceRecord>,
}

impl EnumerationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `record` under its address, returning the record it replaced.
    pub fn insert(&mut self, record: DeviceRecord) -> Option<DeviceRecord> {
        self.devices.insert(record.address.clone(), record)
    }

    pub fn get(&self, address: &str) -> Option<&DeviceRecord> {
        self.devices.get(address)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Records ordered by address.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.devices.values()
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a EnumerationResult {
    type Item = &'a DeviceRecord;
    type IntoIter = std::collections::btree_map::Values<'a, String, DeviceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_address_keeps_the_last_record() {
        let device = DiscoveredDevice::new("AA:BB").with_name("Widget");
        let mut result = EnumerationResult::new();

        result.insert(DeviceRecord::new(&device));

        let mut second = DeviceRecord::new(&device);
        second.connected = true;
        second.services.push(ServiceRecord::new("180A"));
        let replaced = result.insert(second.clone());

        assert_eq!(replaced.map(|r| r.connected), Some(false));
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("AA:BB"), Some(&second));
    }
}
