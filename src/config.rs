use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::adapter::DiscoveredDevice;

pub const DEFAULT_SCAN_DURATION: Duration = Duration::from_secs(5);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ScanConfig {
    /// Index of the Bluetooth adapter to use. The first found adapter is used by default.
    pub(crate) adapter_index: usize,
    /// How long to listen for advertisements.
    pub(crate) duration: Duration,
    /// Filters the found devices based on local name.
    pub(crate) name_filter: Option<Box<dyn Fn(&str) -> bool + Send + Sync>>,
    /// Maximum results before the scan is stopped.
    pub(crate) max_results: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            adapter_index: 0,
            duration: DEFAULT_SCAN_DURATION,
            name_filter: None,
            max_results: None,
        }
    }
}

impl ScanConfig {
    /// Index of bluetooth adapter to use
    pub fn adapter_index(mut self, index: usize) -> Self {
        self.adapter_index = index;
        self
    }

    /// Listen for advertisements this long
    pub fn scan_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Filter scanned devices based on the device name
    pub fn filter_by_name(mut self, func: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.name_filter = Some(Box::new(func));
        self
    }

    /// Stop the scan after given number of matches
    pub fn stop_after_matches(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Require that the scanned devices have a name
    pub fn require_name(self) -> Self {
        if self.name_filter.is_none() {
            self.filter_by_name(|name| !name.is_empty())
        } else {
            self
        }
    }

    /// Whether a device with the given local name passes the name filter.
    pub(crate) fn accepts_name(&self, name: Option<&str>) -> bool {
        match self.name_filter.as_ref() {
            Some(filter) => name.map(|name| filter(name)).unwrap_or(false),
            None => true,
        }
    }
}

/// Order in which discovered devices are visited.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DeviceOrder {
    /// Fresh random order on every run
    #[default]
    Shuffled,
    /// Random order that is the same for the same seed
    Seeded(u64),
    /// Discovery order
    AsDiscovered,
}

impl DeviceOrder {
    pub(crate) fn apply(&self, devices: &mut [DiscoveredDevice]) {
        match *self {
            DeviceOrder::Shuffled => devices.shuffle(&mut rand::thread_rng()),
            DeviceOrder::Seeded(seed) => devices.shuffle(&mut StdRng::seed_from_u64(seed)),
            DeviceOrder::AsDiscovered => {}
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnumerationConfig {
    pub(crate) connect_timeout: Duration,
    pub(crate) ordering: DeviceOrder,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            ordering: DeviceOrder::default(),
        }
    }
}

impl EnumerationConfig {
    /// Give up on a connection attempt after this long
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Order in which discovered devices are enumerated
    pub fn ordering(mut self, ordering: DeviceOrder) -> Self {
        self.ordering = ordering;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices(n: usize) -> Vec<DiscoveredDevice> {
        (0..n)
            .map(|i| DiscoveredDevice::new(format!("00:00:00:00:00:{:02X}", i)))
            .collect()
    }

    #[test]
    fn as_discovered_keeps_order() {
        let mut list = devices(8);
        DeviceOrder::AsDiscovered.apply(&mut list);
        assert_eq!(list, devices(8));
    }

    #[test]
    fn seeded_order_is_reproducible_permutation() {
        let mut a = devices(16);
        let mut b = devices(16);
        DeviceOrder::Seeded(7).apply(&mut a);
        DeviceOrder::Seeded(7).apply(&mut b);
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort_by(|x, y| x.address.cmp(&y.address));
        assert_eq!(sorted, devices(16));
    }

    #[test]
    fn name_filter_rejects_unnamed_devices() {
        let config = ScanConfig::default().require_name();
        assert!(config.accepts_name(Some("Widget")));
        assert!(!config.accepts_name(Some("")));
        assert!(!config.accepts_name(None));
        assert!(ScanConfig::default().accepts_name(None));
    }

    #[test]
    fn defaults() {
        let config = EnumerationConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.ordering, DeviceOrder::Shuffled);
    }
}
