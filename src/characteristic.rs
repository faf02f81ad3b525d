use crate::adapter::Connection;
use crate::session::CancelToken;

/// Reads one characteristic value and turns it into report text.
#[derive(Debug, Default, Clone, Copy)]
pub struct CharacteristicReader;

impl CharacteristicReader {
    pub fn new() -> Self {
        Self
    }

    /// Read characteristic `uuid` of `service` over `connection`.
    ///
    /// Returns `None` when the run was stopped, the read failed, or the value
    /// was empty; the characteristic is then left out of the report.
    pub async fn read<C>(
        &self,
        connection: &C,
        service: &str,
        uuid: &str,
        cancel: &CancelToken,
    ) -> Option<String>
    where
        C: Connection + ?Sized,
    {
        if !cancel.is_running() {
            return None;
        }

        match connection.read_characteristic(service, uuid).await {
            Ok(bytes) => {
                let value = decode_value(&bytes);
                log::trace!("Read {}: {:?}", uuid, value);
                value
            }
            Err(e) => {
                log::debug!("Could not read {}: {}", uuid, e);
                None
            }
        }
    }
}

/// Turn raw characteristic bytes into report text.
///
/// Valid UTF-8 is kept as is. Anything else is rendered as `0x` followed by
/// lowercase hex, so binary payloads survive the trip into the report.
/// Empty results yield `None`.
pub fn decode_value(bytes: &[u8]) -> Option<String> {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => raw_representation(bytes),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn raw_representation(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for byte in bytes {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}
