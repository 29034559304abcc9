/// Valid advertisement lengths observed on the wire, inclusive.
pub const MIN_ADVERT_LEN: usize = 4;
pub const MAX_ADVERT_LEN: usize = 19;

/// BLE "flags" sub-record prefix some consoles prepend; skipped when present.
pub const FLAGS_PREFIX: [u8; 2] = [0x02, 0x01];

/// Only firmware major 6 uses the fixed layout below.
pub const SUPPORTED_BUILD_MAJOR: u8 = 6;
/// Firmware minor version from which the trailing gear byte is broadcast.
pub const GEAR_MIN_BUILD_MINOR: u8 = 21;

/// Fixed data block, offsets relative to the cursor after the version bytes.
pub const FIXED_BLOCK_LEN: usize = 14;

pub const INTERVAL_OFFSET: usize = 0;
pub const EQUIPMENT_OFFSET: usize = 1;
pub const CADENCE_RANGE: std::ops::Range<usize> = 2..4;
pub const HEART_RATE_RANGE: std::ops::Range<usize> = 4..6;
pub const POWER_RANGE: std::ops::Range<usize> = 6..8;
pub const ENERGY_RANGE: std::ops::Range<usize> = 8..10;
pub const MINUTES_OFFSET: usize = 10;
pub const SECONDS_OFFSET: usize = 11;
pub const DISTANCE_RANGE: std::ops::Range<usize> = 12..14;
pub const GEAR_OFFSET: usize = 14;

/// Bit 15 of the distance word carries the unit flag.
pub const DISTANCE_UNIT_BIT: u16 = 0x8000;
pub const DISTANCE_VALUE_MASK: u16 = 0x7FFF;

pub const KM_PER_MILE: f64 = 1.60934;
pub const MILES_PER_KM: f64 = 0.62137119;
