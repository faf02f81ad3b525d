use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use futures::{Stream, StreamExt};
use stream_cancel::{Trigger, Valved};
use tokio::sync::broadcast;
use tokio::sync::broadcast::Sender;
use tokio_stream::wrappers::BroadcastStream;

/// Progress of an enumeration run. Purely informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    RunStarted {
        devices: usize,
    },
    DeviceFound {
        address: String,
        name: Option<String>,
        rssi: Option<i16>,
    },
    Connecting {
        address: String,
    },
    Connected {
        address: String,
    },
    ConnectFailed {
        address: String,
        error: String,
    },
    ServicesDiscovered {
        address: String,
        count: usize,
    },
    ServiceDiscoveryFailed {
        address: String,
        error: String,
    },
    ServiceEnumerated {
        uuid: String,
        characteristics: usize,
    },
    Disconnecting {
        address: String,
    },
    DisconnectFailed {
        address: String,
        error: String,
    },
    StopObserved,
    RunFinished {
        devices: usize,
    },
}

impl Progress {
    /// Whether the event describes a per-device failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Progress::ConnectFailed { .. }
                | Progress::ServiceDiscoveryFailed { .. }
                | Progress::DisconnectFailed { .. }
        )
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::RunStarted { devices } => {
                write!(f, "Starting Bluetooth enumeration of {} devices...", devices)
            }
            Progress::DeviceFound {
                address,
                name,
                rssi,
            } => {
                write!(
                    f,
                    "Found device: {} | Name: {} | RSSI: ",
                    address,
                    name.as_deref().unwrap_or("Unknown")
                )?;
                match rssi {
                    Some(rssi) => write!(f, "{} dBm", rssi),
                    None => write!(f, "N/A"),
                }
            }
            Progress::Connecting { address } => write!(f, "  Connecting to {}...", address),
            Progress::Connected { address } => {
                write!(f, "  Connected to {}! Enumerating services...", address)
            }
            Progress::ConnectFailed { address, error } => {
                write!(f, "  Failed to connect to {} ({})", address, error)
            }
            Progress::ServicesDiscovered { address, count } => {
                write!(f, "  {} services on {}", count, address)
            }
            Progress::ServiceDiscoveryFailed { address, error } => {
                write!(f, "  Could not list services of {} ({})", address, error)
            }
            Progress::ServiceEnumerated {
                uuid,
                characteristics,
            } => write!(
                f,
                "    Service: {} | {} readable characteristics",
                uuid, characteristics
            ),
            Progress::Disconnecting { address } => write!(f, "  Disconnecting from {}", address),
            Progress::DisconnectFailed { address, error } => {
                write!(f, "  Disconnect from {} failed ({})", address, error)
            }
            Progress::StopObserved => write!(f, "Stopping enumeration..."),
            Progress::RunFinished { devices } => {
                write!(f, "Enumeration complete! Found {} devices.", devices)
            }
        }
    }
}

/// Sink for progress events.
pub trait Reporter: Send + Sync {
    fn report(&self, event: &Progress);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report(&self, event: &Progress) {
        (**self).report(event)
    }
}

impl<R: Reporter + ?Sized> Reporter for Arc<R> {
    fn report(&self, event: &Progress) {
        (**self).report(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _event: &Progress) {}
}

/// Writes events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, event: &Progress) {
        if event.is_failure() {
            log::warn!("{}", event);
        } else {
            log::info!("{}", event);
        }
    }
}

/// Publishes events to any number of subscribers, e.g. a UI thread.
pub struct ChannelReporter {
    event_sender: Sender<Progress>,
    stream_stoppers: Arc<RwLock<Vec<Trigger>>>,
}

impl Default for ChannelReporter {
    fn default() -> Self {
        ChannelReporter::new(64)
    }
}

impl ChannelReporter {
    /// `capacity` bounds how far a slow subscriber may lag before it misses events.
    pub fn new(capacity: usize) -> Self {
        let (event_sender, _) = broadcast::channel(capacity);

        Self {
            event_sender,
            stream_stoppers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a new stream that receives progress events until [`close`](Self::close).
    pub fn event_stream(&self) -> Valved<Pin<Box<dyn Stream<Item = Progress> + Send>>> {
        let receiver = self.event_sender.subscribe();

        let stream: Pin<Box<dyn Stream<Item = Progress> + Send>> =
            Box::pin(BroadcastStream::new(receiver).filter_map(|x| async move { x.ok() }));

        let (trigger, stream) = Valved::new(stream);
        if let Ok(mut stoppers) = self.stream_stoppers.write() {
            stoppers.push(trigger);
        }

        stream
    }

    /// End all streams handed out so far.
    pub fn close(&self) {
        if let Ok(mut stoppers) = self.stream_stoppers.write() {
            stoppers.clear();
        }
    }
}

impl Reporter for ChannelReporter {
    fn report(&self, event: &Progress) {
        // No subscribers is fine.
        self.event_sender.send(event.clone()).ok();
    }
}
