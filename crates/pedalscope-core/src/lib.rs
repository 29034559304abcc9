//! Pedalscope core library for decoding fitness-beacon broadcasts.
//!
//! This crate implements the offline pipeline used by the CLI: observation
//! sources feed the replay layer, which drives the broadcast decoder
//! (layout/reader/parser) and aggregates results into a deterministic
//! report. Decoding is byte-oriented and side-effect free; all I/O is
//! isolated in `source` modules. Wire conventions are captured in the
//! broadcast reader and units helpers so the parser stays minimal.
//!
//! Invariants:
//! - The decoder is a pure function: no I/O, no logging, no panics on any
//!   input, identical output for identical input.
//! - Every non-optional telemetry field is always populated; lenient mode
//!   zero-fills instead of failing.
//! - Report outputs are deterministic and stable across runs.
//!
//! Version française (résumé):
//! Cette crate fournit le cœur hors ligne : sources d'observations ->
//! rejeu -> décodeur de trames (layout/reader/parser) -> rapport
//! déterministe. Les E/S restent dans `source`, les conventions du format
//! dans `reader` et `units`. Garanties : décodage pur et total, champs
//! toujours renseignés, ordre stable du rapport.
//!
//! # Examples
//! ```
//! use pedalscope_core::{DecodeMode, decode};
//!
//! let payload = [0x02, 0x01, 0x06, 0x21, 0x00, 0x07, 0xE8, 0x03, 0x00, 0x00,
//!     0x96, 0x00, 0x28, 0x00, 0x02, 0x1E, 0x19, 0x80, 0x0C];
//! let telemetry = decode(&payload, "AA:BB:CC:DD:EE:FF", -70, DecodeMode::Strict)?;
//! assert_eq!(telemetry.power_watts, 150);
//! # Ok::<(), pedalscope_core::RejectReason>(())
//! ```

use serde::{Deserialize, Serialize};

pub mod broadcast;
mod replay;
mod source;

pub use broadcast::{
    DecodeMode, DecodeOptions, DistanceConvention, EncodeError, RejectReason, SyntheticBroadcast,
    decode, decode_with,
};
pub use replay::{ReplayError, ReplayOptions, replay_capture_file, replay_source};
pub use source::{CaptureFileSource, CaptureRecord, Observation, ObservationSource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no clock is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Decoded representation of one broadcast advertisement.
///
/// Constructed once by the decoder and immutable from the caller's point of
/// view; owns no external resources.
///
/// # Examples
/// ```
/// use pedalscope_core::Telemetry;
///
/// let telemetry = Telemetry::zeroed("AA:BB:CC:DD:EE:FF", -70);
/// assert_eq!(telemetry.cadence_rpm, 0.0);
/// assert_eq!(telemetry.gear, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Firmware major version (hex-reinterpreted); gates the field layout.
    pub build_major: u8,
    /// Firmware minor version (hex-reinterpreted); gates the gear byte.
    pub build_minor: u8,
    /// Raw mode/interval byte as broadcast.
    pub interval_raw: u8,
    /// True iff `interval_raw` is 0 or strictly between 128 and 255.
    pub is_real_time: bool,
    /// Interval number derived from `interval_raw`.
    pub interval_value: u8,
    /// Equipment identifier byte.
    pub equipment_ordinal: u8,
    /// Cadence in RPM (raw 16-bit value divided by 10).
    pub cadence_rpm: f64,
    /// Heart rate in BPM (raw 16-bit value divided by 10).
    pub heart_rate_bpm: f64,
    /// Instantaneous power in watts, unscaled.
    pub power_watts: u16,
    /// Accumulated energy in kcal, unscaled.
    pub energy_kcal: u16,
    /// Elapsed workout time: minutes byte times 60 plus seconds byte.
    pub elapsed_seconds: u16,
    /// Trip distance in kilometers per the selected distance convention.
    pub trip_distance_km: f64,
    /// Raw bit 15 of the distance word, exposed for downstream
    /// disambiguation of the unit convention.
    pub distance_metric_flag: bool,
    /// Gear number; broadcast only from firmware minor 21 onward.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gear: Option<u8>,
    /// Echoed transport address.
    pub source_address: String,
    /// Echoed signal strength; informational only.
    pub rssi: i16,
}

impl Telemetry {
    /// Zero-filled record used by lenient decoding on structural failure.
    ///
    /// Derived fields still follow the derivation table, so an interval
    /// byte of 0 makes the zeroed record real-time.
    pub fn zeroed(address: &str, rssi: i16) -> Self {
        Self {
            build_major: 0,
            build_minor: 0,
            interval_raw: 0,
            is_real_time: true,
            interval_value: 0,
            equipment_ordinal: 0,
            cadence_rpm: 0.0,
            heart_rate_bpm: 0.0,
            power_watts: 0,
            energy_kcal: 0,
            elapsed_seconds: 0,
            trip_distance_km: 0.0,
            distance_metric_flag: false,
            gear: None,
            source_address: address.to_string(),
            rssi,
        }
    }
}

/// Aggregated replay report with deterministic ordering.
///
/// # Examples
/// ```
/// use pedalscope_core::make_stub_report;
///
/// let report = make_stub_report("capture.json", 123);
/// assert_eq!(report.report_version, pedalscope_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,

    /// Input capture metadata.
    pub input: InputInfo,

    /// Optional capture summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// Per-device summaries in stable address order.
    pub devices: Vec<DeviceSummary>,
    /// Reject summaries in stable identifier order.
    pub rejects: Vec<RejectSummary>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "pedalscope").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input capture metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the replay.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Basic capture summary (timestamps may be absent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Total observation count in the capture, rejects included.
    pub observations_total: u64,
    /// RFC3339 timestamp of the first observation (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    /// RFC3339 timestamp of the last observation (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Per-device replay summary.
///
/// One entry per transport address; the device map doubles as the
/// deduplication cache a live scanner keeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSummary {
    /// Transport address of the console.
    pub address: String,
    /// Equipment identifier from the most recent valid frame.
    pub equipment_ordinal: u8,
    /// Number of valid frames decoded for this device.
    pub frames_count: u64,
    /// Weakest signal strength observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rssi_min: Option<i16>,
    /// Strongest signal strength observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rssi_max: Option<i16>,
    /// Peak power across the capture.
    pub max_power_watts: u16,
    /// Peak cadence across the capture.
    pub max_cadence_rpm: f64,
    /// Most recent decoded record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<Telemetry>,
}

/// Aggregated rejection record.
///
/// # Examples
/// ```
/// use pedalscope_core::RejectSummary;
///
/// let reject = RejectSummary {
///     id: "PS-LENGTH-RANGE".to_string(),
///     message: "advertisement length out of range".to_string(),
///     count: 1,
///     examples: vec!["address AA:BB:CC:DD:EE:FF @ 12.5".to_string()],
/// };
/// assert_eq!(reject.count, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectSummary {
    /// Stable reject identifier (e.g., `PS-UNSUPPORTED-BUILD`).
    pub id: String,
    /// Human-readable message from the first occurrence.
    pub message: String,
    /// Number of observations aggregated into this reject.
    pub count: u64,
    /// At most three example contexts, formatted as `address A @ ts`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use pedalscope_core::make_stub_report;
///
/// let report = make_stub_report("capture.json", 123);
/// assert!(report.devices.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> CaptureReport {
    CaptureReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "pedalscope".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture_summary: None,
        devices: vec![],
        rejects: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_optional_fields_when_none() {
        let mut report = make_stub_report("capture.json", 1);
        report.capture_summary = Some(CaptureSummary {
            observations_total: 1,
            time_start: None,
            time_end: None,
        });
        report.devices = vec![DeviceSummary {
            address: "AA:BB:CC:DD:EE:FF".to_string(),
            equipment_ordinal: 0,
            frames_count: 1,
            rssi_min: None,
            rssi_max: None,
            max_power_watts: 0,
            max_cadence_rpm: 0.0,
            last: None,
        }];
        report.rejects = vec![RejectSummary {
            id: "PS-LENGTH-RANGE".to_string(),
            message: "advertisement length out of range".to_string(),
            count: 1,
            examples: Vec::new(),
        }];

        let value = serde_json::to_value(&report).expect("report json");
        let capture = value.get("capture_summary").expect("capture_summary");
        assert!(capture.get("time_start").is_none());
        assert!(capture.get("time_end").is_none());

        let device = &value["devices"][0];
        assert!(device.get("rssi_min").is_none());
        assert!(device.get("last").is_none());

        let reject = &value["rejects"][0];
        assert!(reject.get("examples").is_none());
    }

    #[test]
    fn telemetry_omits_gear_when_absent() {
        let value = serde_json::to_value(Telemetry::zeroed("a", 0)).expect("telemetry json");
        assert!(value.get("gear").is_none());
        assert_eq!(value["is_real_time"], serde_json::json!(true));
    }
}
