#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use btenum::{Adapter, Connection, DiscoveredDevice, Error, GattService, Progress, Reporter, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Discover,
    /// Address and the timeout the adapter was given
    Connect(String, Duration),
    Services(String),
    /// Address, service and characteristic
    Read(String, String, String),
    Disconnect(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected,
    Timeout,
    NotFound,
    StackError,
}

#[derive(Debug, Clone)]
pub struct MockService {
    pub uuid: String,
    /// `None` values fail to read
    pub characteristics: Vec<(String, Option<Vec<u8>>)>,
}

impl MockService {
    pub fn new(uuid: &str) -> Self {
        Self {
            uuid: uuid.to_owned(),
            characteristics: Vec::new(),
        }
    }

    pub fn value(mut self, uuid: &str, value: &[u8]) -> Self {
        self.characteristics
            .push((uuid.to_owned(), Some(value.to_vec())));
        self
    }

    pub fn unreadable(mut self, uuid: &str) -> Self {
        self.characteristics.push((uuid.to_owned(), None));
        self
    }
}

#[derive(Debug, Clone)]
pub struct MockDevice {
    pub connect: ConnectOutcome,
    pub services: Option<Vec<MockService>>,
    pub disconnect_fails: bool,
}

impl MockDevice {
    pub fn connected(services: Vec<MockService>) -> Self {
        Self {
            connect: ConnectOutcome::Connected,
            services: Some(services),
            disconnect_fails: false,
        }
    }

    pub fn failing(connect: ConnectOutcome) -> Self {
        Self {
            connect,
            services: Some(Vec::new()),
            disconnect_fails: false,
        }
    }
}

type Hook = Arc<dyn Fn(&Call) + Send + Sync>;

/// In-memory adapter that records every call it receives.
#[derive(Clone)]
pub struct MockAdapter {
    discovered: Vec<DiscoveredDevice>,
    devices: HashMap<String, MockDevice>,
    calls: Arc<Mutex<Vec<Call>>>,
    hook: Hook,
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self {
            discovered: Vec::new(),
            devices: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            hook: Arc::new(|_| {}),
        }
    }
}

impl MockAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device(mut self, device: DiscoveredDevice, behaviour: MockDevice) -> Self {
        self.devices.insert(device.address.clone(), behaviour);
        self.discovered.push(device);
        self
    }

    /// Called with every adapter call before it is answered.
    pub fn on_call(mut self, hook: impl Fn(&Call) + Send + Sync + 'static) -> Self {
        self.hook = Arc::new(hook);
        self
    }

    pub fn discovered(&self) -> Vec<DiscoveredDevice> {
        self.discovered.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        (self.hook)(&call);
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Adapter for MockAdapter {
    type Connection = MockConnection;

    async fn discover(&self) -> Result<Vec<DiscoveredDevice>> {
        self.record(Call::Discover);
        Ok(self.discovered.clone())
    }

    async fn connect(&self, address: &str, timeout: Duration) -> Result<MockConnection> {
        self.record(Call::Connect(address.to_owned(), timeout));

        let device = self
            .devices
            .get(address)
            .cloned()
            .ok_or_else(|| Error::DeviceNotFound(address.to_owned()))?;

        match device.connect {
            ConnectOutcome::Connected => Ok(MockConnection {
                address: address.to_owned(),
                device,
                adapter: self.clone(),
            }),
            ConnectOutcome::Timeout => Err(Error::ConnectTimeout(timeout)),
            ConnectOutcome::NotFound => Err(Error::DeviceNotFound(address.to_owned())),
            ConnectOutcome::StackError => Err(Error::Adapter("le-connection-abort-by-local".into())),
        }
    }
}

pub struct MockConnection {
    address: String,
    device: MockDevice,
    adapter: MockAdapter,
}

#[async_trait]
impl Connection for MockConnection {
    async fn services(&self) -> Result<Vec<GattService>> {
        self.adapter.record(Call::Services(self.address.clone()));

        let services = self
            .device
            .services
            .as_ref()
            .ok_or_else(|| Error::Adapter("service discovery failed".into()))?;

        Ok(services
            .iter()
            .map(|s| GattService {
                uuid: s.uuid.clone(),
                characteristics: s.characteristics.iter().map(|(uuid, _)| uuid.clone()).collect(),
            })
            .collect())
    }

    async fn read_characteristic(&self, service: &str, uuid: &str) -> Result<Vec<u8>> {
        self.adapter.record(Call::Read(
            self.address.clone(),
            service.to_owned(),
            uuid.to_owned(),
        ));

        self.device
            .services
            .iter()
            .flatten()
            .filter(|s| s.uuid == service)
            .flat_map(|s| s.characteristics.iter())
            .find(|(id, _)| id == uuid)
            .and_then(|(_, value)| value.clone())
            .ok_or_else(|| Error::ReadFailure {
                uuid: uuid.to_owned(),
                reason: "read not permitted".into(),
            })
    }

    async fn disconnect(&self) -> Result<()> {
        self.adapter.record(Call::Disconnect(self.address.clone()));

        if self.device.disconnect_fails {
            Err(Error::Adapter("not connected".into()))
        } else {
            Ok(())
        }
    }
}

/// Keeps every event it is given.
#[derive(Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<Progress>>,
}

impl CollectingReporter {
    pub fn events(&self) -> Vec<Progress> {
        self.events.lock().unwrap().clone()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, event: &Progress) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn widget() -> DiscoveredDevice {
    DiscoveredDevice::new("AA:BB")
        .with_name("Widget")
        .with_rssi(-60)
}
