//! Enumerate nearby BLE peripherals.
//!
//! A [`Session`] takes the devices found by a scan, connects to each of them in
//! turn, walks every service and characteristic, reads what it can and collects
//! it all into an [`EnumerationResult`]. A device that cannot be reached or read
//! only degrades its own record; the run always completes or is stopped via a
//! [`CancelToken`], and always yields a result.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use btenum::export::write_json_file;
//! use btenum::{BtleAdapter, EnumerationConfig, Error, LogReporter, ScanConfig, Session};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     pretty_env_logger::init();
//!
//!     // Listen for advertisements for five seconds
//!     let adapter = BtleAdapter::new(ScanConfig::default().scan_duration(Duration::from_secs(5))).await?;
//!
//!     // Connect to the devices one by one
//!     let session = Session::new(EnumerationConfig::default());
//!     let result = session.start(&adapter, &LogReporter).await?;
//!
//!     write_json_file(&result, "enumeration.json")?;
//!
//!     Ok(())
//! }
//!```
//!
//! Any BLE stack can drive the engine by implementing [`Adapter`] and [`Connection`].

#![warn(clippy::all, future_incompatible, nonstandard_style, rust_2018_idioms)]

pub use adapter::{Adapter, Connection, DiscoveredDevice, GattService};
pub use btle::{BtleAdapter, BtleConnection};
pub use characteristic::{decode_value, CharacteristicReader};
pub use config::{DeviceOrder, EnumerationConfig, ScanConfig};
pub use device::DeviceEnumerator;
pub use error::{Error, Result};
pub use model::{DeviceRecord, EnumerationResult, ServiceRecord};
pub use reporter::{ChannelReporter, LogReporter, NullReporter, Progress, Reporter};
pub use session::{CancelToken, Session};

mod adapter;
mod btle;
mod characteristic;
mod config;
mod device;
mod error;
mod model;
mod reporter;
mod session;

pub mod common;
pub mod export;
