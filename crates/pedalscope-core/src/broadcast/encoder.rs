use thiserror::Error;

use super::layout;
use super::units;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("version {value} has no wire form: decimal digits must read as a hex byte (0..=99)")]
    VersionNotEncodable { value: u8 },
    #[error("distance {value} exceeds the 15-bit wire field")]
    DistanceOutOfRange { value: u16 },
}

/// Field values for one synthetic advertisement frame.
///
/// The exact inverse of the decoder's fixed-layout extraction: version
/// numbers are given in decimal and written through the inverse
/// hex-reinterpretation, cadence and heart rate in tenths, distance in
/// tenths with the unit flag carried separately.
#[derive(Debug, Clone)]
pub struct SyntheticBroadcast {
    pub build_major: u8,
    pub build_minor: u8,
    pub interval_raw: u8,
    pub equipment_ordinal: u8,
    pub cadence_tenths: u16,
    pub heart_rate_tenths: u16,
    pub power_watts: u16,
    pub energy_kcal: u16,
    pub minutes: u8,
    pub seconds: u8,
    pub distance_tenths: u16,
    pub metric_flag: bool,
    pub gear: Option<u8>,
    pub with_flags_prefix: bool,
}

impl Default for SyntheticBroadcast {
    fn default() -> Self {
        Self {
            build_major: layout::SUPPORTED_BUILD_MAJOR,
            build_minor: 30,
            interval_raw: 0,
            equipment_ordinal: 0,
            cadence_tenths: 0,
            heart_rate_tenths: 0,
            power_watts: 0,
            energy_kcal: 0,
            minutes: 0,
            seconds: 0,
            distance_tenths: 0,
            metric_flag: false,
            gear: None,
            with_flags_prefix: true,
        }
    }
}

impl SyntheticBroadcast {
    /// Build the wire payload for this frame.
    ///
    /// # Examples
    /// ```
    /// use pedalscope_core::broadcast::SyntheticBroadcast;
    ///
    /// let frame = SyntheticBroadcast {
    ///     cadence_tenths: 1000,
    ///     ..SyntheticBroadcast::default()
    /// };
    /// let payload = frame.encode()?;
    /// assert_eq!(&payload[..4], &[0x02, 0x01, 0x06, 0x30]);
    /// # Ok::<(), pedalscope_core::broadcast::EncodeError>(())
    /// ```
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let major = units::build_value_encode(self.build_major)
            .ok_or(EncodeError::VersionNotEncodable {
                value: self.build_major,
            })?;
        let minor = units::build_value_encode(self.build_minor)
            .ok_or(EncodeError::VersionNotEncodable {
                value: self.build_minor,
            })?;
        if self.distance_tenths > layout::DISTANCE_VALUE_MASK {
            return Err(EncodeError::DistanceOutOfRange {
                value: self.distance_tenths,
            });
        }

        let mut payload = Vec::with_capacity(layout::MAX_ADVERT_LEN);
        if self.with_flags_prefix {
            payload.extend_from_slice(&layout::FLAGS_PREFIX);
        }
        payload.push(major);
        payload.push(minor);
        payload.push(self.interval_raw);
        payload.push(self.equipment_ordinal);
        payload.extend_from_slice(&self.cadence_tenths.to_le_bytes());
        payload.extend_from_slice(&self.heart_rate_tenths.to_le_bytes());
        payload.extend_from_slice(&self.power_watts.to_le_bytes());
        payload.extend_from_slice(&self.energy_kcal.to_le_bytes());
        payload.push(self.minutes);
        payload.push(self.seconds);
        let mut distance_word = self.distance_tenths;
        if self.metric_flag {
            distance_word |= layout::DISTANCE_UNIT_BIT;
        }
        payload.extend_from_slice(&distance_word.to_le_bytes());
        if let Some(gear) = self.gear {
            payload.push(gear);
        }
        Ok(payload)
    }
}
