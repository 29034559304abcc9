//! JSON capture file source.
//!
//! A capture is a JSON array of observation records as written by the scan
//! recorder (and by the `synth` command): unix timestamp in seconds,
//! transport address, signal strength, and the raw payload as a hex string.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Observation, ObservationSource, SourceError};

/// One record of a JSON capture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureRecord {
    /// Unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<f64>,
    /// Transport address of the console.
    pub address: String,
    /// Signal strength in dBm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i16>,
    /// Raw advertisement payload, hex-encoded.
    pub data: String,
}

/// `ObservationSource` backed by a JSON capture file.
pub struct CaptureFileSource {
    records: std::vec::IntoIter<CaptureRecord>,
}

impl CaptureFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let text = fs::read_to_string(path)?;
        let records: Vec<CaptureRecord> = serde_json::from_str(&text)?;
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<CaptureRecord>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }
}

impl ObservationSource for CaptureFileSource {
    fn next_observation(&mut self) -> Result<Option<Observation>, SourceError> {
        let Some(record) = self.records.next() else {
            return Ok(None);
        };
        let payload = hex::decode(record.data.trim())?;
        Ok(Some(Observation {
            ts: record.ts,
            address: record.address,
            rssi: record.rssi.unwrap_or(0),
            payload,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::{CaptureFileSource, CaptureRecord};
    use crate::source::{ObservationSource, SourceError};

    #[test]
    fn records_decode_hex_payloads() {
        let mut source = CaptureFileSource::from_records(vec![CaptureRecord {
            ts: Some(1.5),
            address: "AA:BB:CC:DD:EE:FF".to_string(),
            rssi: Some(-70),
            data: "0201062100".to_string(),
        }]);

        let obs = source.next_observation().unwrap().unwrap();
        assert_eq!(obs.ts, Some(1.5));
        assert_eq!(obs.rssi, -70);
        assert_eq!(obs.payload, vec![0x02, 0x01, 0x06, 0x21, 0x00]);
        assert!(source.next_observation().unwrap().is_none());
    }

    #[test]
    fn missing_rssi_defaults_to_zero() {
        let mut source = CaptureFileSource::from_records(vec![CaptureRecord {
            ts: None,
            address: "a".to_string(),
            rssi: None,
            data: "06".to_string(),
        }]);
        let obs = source.next_observation().unwrap().unwrap();
        assert_eq!(obs.rssi, 0);
    }

    #[test]
    fn invalid_hex_is_a_source_error() {
        let mut source = CaptureFileSource::from_records(vec![CaptureRecord {
            ts: None,
            address: "a".to_string(),
            rssi: None,
            data: "zz".to_string(),
        }]);
        assert!(matches!(
            source.next_observation(),
            Err(SourceError::Hex(_))
        ));
    }
}
