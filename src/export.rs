//! Report writers for a finished [`EnumerationResult`].
//!
//! ## JSON
//!
//! An object keyed by device address:
//!
//! ```json
//! {
//!   "AA:BB": {
//!     "name": "Widget",
//!     "rssi": -60,
//!     "details": {
//!       "connected": "True",
//!       "services": [{ "uuid": "180A", "characteristics": ["Widget-1"] }]
//!     }
//!   }
//! }
//! ```
//!
//! ## Text
//!
//! A human-readable listing of the same records with service and
//! characteristic counts.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::model::{DeviceRecord, EnumerationResult, ServiceRecord};
use crate::Result;

const RULE_WIDTH: usize = 80;

#[derive(Serialize)]
struct JsonDevice<'a> {
    name: Option<&'a str>,
    rssi: Option<i16>,
    details: JsonDetails<'a>,
}

#[derive(Serialize)]
struct JsonDetails<'a> {
    connected: &'static str,
    services: Vec<JsonService<'a>>,
}

#[derive(Serialize)]
struct JsonService<'a> {
    uuid: &'a str,
    characteristics: &'a [String],
}

impl<'a> From<&'a DeviceRecord> for JsonDevice<'a> {
    fn from(record: &'a DeviceRecord) -> Self {
        JsonDevice {
            name: record.name.as_deref(),
            rssi: record.rssi,
            details: JsonDetails {
                connected: connected_label(record.connected),
                services: record.services.iter().map(JsonService::from).collect(),
            },
        }
    }
}

impl<'a> From<&'a ServiceRecord> for JsonService<'a> {
    fn from(service: &'a ServiceRecord) -> Self {
        JsonService {
            uuid: &service.uuid,
            characteristics: &service.characteristics,
        }
    }
}

fn connected_label(connected: bool) -> &'static str {
    if connected {
        "True"
    } else {
        "False"
    }
}

fn json_view(result: &EnumerationResult) -> BTreeMap<&str, JsonDevice<'_>> {
    result
        .iter()
        .map(|record| (record.address.as_str(), JsonDevice::from(record)))
        .collect()
}

/// Serialize `result` as a JSON value.
pub fn to_json_value(result: &EnumerationResult) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(json_view(result))?)
}

/// Pretty-printed JSON with two-space indentation.
pub fn to_json_string(result: &EnumerationResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(&json_view(result))?)
}

pub fn write_json<W: Write>(result: &EnumerationResult, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, &json_view(result))?;
    Ok(())
}

pub fn write_text<W: Write>(result: &EnumerationResult, mut writer: W) -> Result<()> {
    writeln!(writer, "Bluetooth Device Enumeration Results")?;
    writeln!(writer, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(writer)?;

    for record in result {
        writeln!(writer, "Device: {}", record.address)?;
        writeln!(
            writer,
            "  Name: {}",
            record.name.as_deref().unwrap_or("Unknown")
        )?;
        match record.rssi {
            Some(rssi) => writeln!(writer, "  RSSI: {} dBm", rssi)?,
            None => writeln!(writer, "  RSSI: N/A")?,
        }
        writeln!(writer, "  Connected: {}", connected_label(record.connected))?;

        if !record.services.is_empty() {
            writeln!(writer, "  Services: {}", record.services.len())?;
            for service in &record.services {
                writeln!(writer, "    UUID: {}", service.uuid)?;
                if !service.characteristics.is_empty() {
                    writeln!(
                        writer,
                        "      Characteristics: {}",
                        service.characteristics.len()
                    )?;
                }
            }
        }

        writeln!(writer)?;
        writeln!(writer, "{}", "-".repeat(RULE_WIDTH))?;
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn to_text_string(result: &EnumerationResult) -> Result<String> {
    let mut buf = Vec::new();
    write_text(result, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn write_json_file(result: &EnumerationResult, path: impl AsRef<Path>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(result, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn write_text_file(result: &EnumerationResult, path: impl AsRef<Path>) -> Result<()> {
    write_text(result, BufWriter::new(File::create(path)?))
}
