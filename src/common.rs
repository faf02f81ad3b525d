//! Well-known GATT identifiers and UUID rendering.

use uuid::Uuid;

pub mod services {
    use btleplug::api::bleuuid::uuid_from_u16;
    use uuid::Uuid;

    pub const GENERIC_ACCESS: Uuid = uuid_from_u16(0x1800);
    pub const DEVICE_INFORMATION: Uuid = uuid_from_u16(0x180A);
    pub const BATTERY: Uuid = uuid_from_u16(0x180F);
}

pub mod characteristics {
    use btleplug::api::bleuuid::uuid_from_u16;
    use uuid::Uuid;

    pub const DEVICE_NAME: Uuid = uuid_from_u16(0x2A00);
    pub const BATTERY_LEVEL: Uuid = uuid_from_u16(0x2A19);
    pub const MANUFACTURER_NAME: Uuid = uuid_from_u16(0x2A29);
}

const BASE_UUID_LOW_BITS: u128 = 0x0000_1000_8000_0080_5f9b_34fb;
const LOW_96_BITS: u128 = (1 << 96) - 1;

/// Render a UUID the way GATT tools usually print it.
///
/// UUIDs derived from the Bluetooth base UUID with a 16-bit alias are shortened
/// to four uppercase hex digits (`180A`); everything else uses the hyphenated form.
pub fn display_uuid(uuid: &Uuid) -> String {
    let value = uuid.as_u128();

    if value & LOW_96_BITS == BASE_UUID_LOW_BITS && value >> 112 == 0 {
        format!("{:04X}", (value >> 96) as u16)
    } else {
        uuid.to_hyphenated().to_string()
    }
}
