use crate::Telemetry;

use super::error::RejectReason;
use super::layout;
use super::reader::BroadcastReader;
use super::units::{self, DistanceConvention};

/// Policy for malformed input.
///
/// The two historical call sites disagree: the ingestion endpoint rejects
/// malformed payloads, the live-scan path zero-fills and carries on. Strict
/// is the default; see `DESIGN.md`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeMode {
    /// Malformed input yields a typed [`RejectReason`].
    #[default]
    Strict,
    /// Malformed input yields a zero-filled record instead of an error.
    Lenient,
}

/// Full decode policy: failure mode plus distance convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    pub mode: DecodeMode,
    pub distance: DistanceConvention,
}

/// Decode one advertisement payload with the default distance convention.
///
/// # Examples
/// ```
/// use pedalscope_core::{DecodeMode, decode};
///
/// let payload = [
///     0x02, 0x01, 0x06, 0x21, 0x00, 0x07, 0xE8, 0x03, 0xB0, 0x04, 0x96, 0x00,
///     0x28, 0x00, 0x02, 0x1E, 0x19, 0x80, 0x0C,
/// ];
/// let telemetry = decode(&payload, "AA:BB:CC:DD:EE:FF", -70, DecodeMode::Strict)?;
/// assert_eq!(telemetry.cadence_rpm, 100.0);
/// assert_eq!(telemetry.equipment_ordinal, 7);
/// assert_eq!(telemetry.gear, Some(12));
/// # Ok::<(), pedalscope_core::RejectReason>(())
/// ```
pub fn decode(
    payload: &[u8],
    address: &str,
    rssi: i16,
    mode: DecodeMode,
) -> Result<Telemetry, RejectReason> {
    decode_with(
        payload,
        address,
        rssi,
        DecodeOptions {
            mode,
            ..DecodeOptions::default()
        },
    )
}

/// Decode one advertisement payload with an explicit policy.
pub fn decode_with(
    payload: &[u8],
    address: &str,
    rssi: i16,
    options: DecodeOptions,
) -> Result<Telemetry, RejectReason> {
    match decode_frame(payload, address, rssi, options.distance) {
        Ok(telemetry) => Ok(telemetry),
        Err(reason) => match options.mode {
            DecodeMode::Strict => Err(reason),
            DecodeMode::Lenient => Ok(Telemetry::zeroed(address, rssi)),
        },
    }
}

fn decode_frame(
    payload: &[u8],
    address: &str,
    rssi: i16,
    distance: DistanceConvention,
) -> Result<Telemetry, RejectReason> {
    let actual = payload.len();
    if !(layout::MIN_ADVERT_LEN..=layout::MAX_ADVERT_LEN).contains(&actual) {
        return Err(RejectReason::LengthOutOfRange { actual });
    }

    let mut reader = BroadcastReader::new(payload);
    let build_major = units::build_value_convert(reader.read_u8(0).unwrap_or(0));
    let build_minor = units::build_value_convert(reader.read_u8(1).unwrap_or(0));
    reader.advance(2);

    let remaining = reader.remaining();
    if build_major != layout::SUPPORTED_BUILD_MAJOR || remaining < layout::FIXED_BLOCK_LEN {
        return Err(RejectReason::UnsupportedBuildOrTooShort {
            build_major,
            remaining,
        });
    }
    // The payload gate guarantees the whole fixed block is present.
    let gate = || RejectReason::UnsupportedBuildOrTooShort {
        build_major,
        remaining,
    };

    let interval_raw = reader.read_u8(layout::INTERVAL_OFFSET).ok_or_else(gate)?;
    let equipment_ordinal = reader.read_u8(layout::EQUIPMENT_OFFSET).ok_or_else(gate)?;
    let cadence_raw = reader
        .read_u16_le(layout::CADENCE_RANGE)
        .ok_or_else(gate)?;
    let heart_rate_raw = reader
        .read_u16_le(layout::HEART_RATE_RANGE)
        .ok_or_else(gate)?;
    let power_watts = reader.read_u16_le(layout::POWER_RANGE).ok_or_else(gate)?;
    let energy_kcal = reader.read_u16_le(layout::ENERGY_RANGE).ok_or_else(gate)?;
    let minutes = reader.read_u8(layout::MINUTES_OFFSET).ok_or_else(gate)?;
    let seconds = reader.read_u8(layout::SECONDS_OFFSET).ok_or_else(gate)?;
    let distance_raw = reader
        .read_u16_le(layout::DISTANCE_RANGE)
        .ok_or_else(gate)?;

    let (trip_distance_km, distance_metric_flag) = distance.to_kilometers(distance_raw);

    let gear = if build_minor >= layout::GEAR_MIN_BUILD_MINOR {
        reader.read_u8(layout::GEAR_OFFSET)
    } else {
        None
    };

    Ok(Telemetry {
        build_major,
        build_minor,
        interval_raw,
        is_real_time: units::is_real_time(interval_raw),
        interval_value: units::interval_value(interval_raw),
        equipment_ordinal,
        cadence_rpm: f64::from(cadence_raw) / 10.0,
        heart_rate_bpm: f64::from(heart_rate_raw) / 10.0,
        power_watts,
        energy_kcal,
        elapsed_seconds: u16::from(minutes) * 60 + u16::from(seconds),
        trip_distance_km,
        distance_metric_flag,
        gear,
        source_address: address.to_string(),
        rssi,
    })
}
