//! Field conversion quirks of the M-series broadcast format.
//!
//! The version bytes and the distance word both carry console-firmware
//! conventions that look wrong at first sight but are load-bearing: stored
//! session data downstream depends on them being reproduced exactly.

use super::layout;

/// Reinterpret a version byte's hex digits as a decimal numeral.
///
/// Raw 0x16 formats as "16" and parses as decimal 16. Raw bytes whose hex
/// form contains A-F (e.g. 0x1F) fail the decimal parse and yield 0. This
/// mirrors the console firmware's BCD-ish version encoding; it never errors.
///
/// # Examples
/// ```
/// use pedalscope_core::broadcast::units::build_value_convert;
///
/// assert_eq!(build_value_convert(0x06), 6);
/// assert_eq!(build_value_convert(0x21), 21);
/// assert_eq!(build_value_convert(0x1F), 0);
/// ```
pub fn build_value_convert(raw: u8) -> u8 {
    format!("{raw:X}").parse().unwrap_or(0)
}

/// Inverse of [`build_value_convert`]: decimal version number to wire byte.
///
/// Only values whose decimal digit string is a valid two-hex-digit byte can
/// be encoded (0..=99). Returns `None` otherwise.
pub fn build_value_encode(decimal: u8) -> Option<u8> {
    if decimal > 99 {
        return None;
    }
    u8::from_str_radix(&decimal.to_string(), 16).ok()
}

/// True when the interval byte marks a live (non-review) broadcast.
pub fn is_real_time(interval_raw: u8) -> bool {
    interval_raw == 0 || (interval_raw > 128 && interval_raw < 255)
}

/// Interval number carried by the interval byte.
///
/// 0 and 255 are the main-screen markers and carry no interval; values above
/// 128 are the real-time interval range and are offset by 128. 128 itself is
/// passed through unchanged, matching the historical call site.
pub fn interval_value(interval_raw: u8) -> u8 {
    if interval_raw == 0 || interval_raw == 255 {
        0
    } else if interval_raw > 128 && interval_raw < 255 {
        interval_raw - 128
    } else {
        interval_raw
    }
}

/// Which of the two historical distance conventions to apply.
///
/// The fleet's firmware variants disagree about what bit 15 of the distance
/// word means. Both readings shipped; callers pick one and the raw flag bit
/// is exposed on the telemetry record either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistanceConvention {
    /// Flag set: the lower 15 bits are already kilometers in tenths.
    /// Flag clear: the value is miles in tenths, converted to km.
    #[default]
    KilometersWhenFlagSet,
    /// Legacy reading: flag set scales the lower 15 bits by the
    /// miles-per-km constant; flag clear divides the full word by 10.
    ScaledMilesWhenFlagSet,
}

impl DistanceConvention {
    /// Convert the raw distance word to kilometers plus the raw flag bit.
    pub fn to_kilometers(self, raw: u16) -> (f64, bool) {
        let flag = raw & layout::DISTANCE_UNIT_BIT != 0;
        let km = match self {
            DistanceConvention::KilometersWhenFlagSet => {
                let value = f64::from(raw & layout::DISTANCE_VALUE_MASK) / 10.0;
                if flag { value } else { value * layout::KM_PER_MILE }
            }
            DistanceConvention::ScaledMilesWhenFlagSet => {
                if flag {
                    f64::from(raw & layout::DISTANCE_VALUE_MASK) * layout::MILES_PER_KM / 10.0
                } else {
                    f64::from(raw) / 10.0
                }
            }
        };
        (km, flag)
    }
}
