//! Offline capture replay.
//!
//! Drives every recorded observation through the strict decoder and
//! aggregates a deterministic [`CaptureReport`]: per-device summaries keyed
//! by transport address (the explicit deduplication cache the live scanner
//! would otherwise own) plus reject tallies with stable identifiers.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::broadcast::{DecodeMode, DecodeOptions, DistanceConvention, decode_with};
use crate::source::{CaptureFileSource, ObservationSource, SourceError};
use crate::{CaptureReport, CaptureSummary, make_stub_report};

mod devices;

use devices::{
    DeviceStats, RejectStats, add_observation, add_reject, build_device_summaries,
    build_reject_summaries,
};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Policy knobs for a replay run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayOptions {
    /// Distance convention handed to the decoder.
    pub distance: DistanceConvention,
}

/// Replay a JSON capture file into a report with default options.
pub fn replay_capture_file(path: &Path) -> Result<CaptureReport, ReplayError> {
    let source = CaptureFileSource::open(path)?;
    replay_source(path, source, ReplayOptions::default())
}

/// Replay any observation source into a report.
///
/// Decoding is always strict here: structural failures become reject
/// summaries instead of zero-filled records polluting the device stats.
pub fn replay_source<S: ObservationSource>(
    path: &Path,
    mut source: S,
    options: ReplayOptions,
) -> Result<CaptureReport, ReplayError> {
    let decode_options = DecodeOptions {
        mode: DecodeMode::Strict,
        distance: options.distance,
    };

    let mut observations_total = 0u64;
    let mut first_ts = None;
    let mut last_ts = None;
    let mut device_stats: HashMap<String, DeviceStats> = HashMap::new();
    let mut reject_stats: HashMap<&'static str, RejectStats> = HashMap::new();

    while let Some(obs) = source.next_observation()? {
        observations_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, obs.ts);
        match decode_with(&obs.payload, &obs.address, obs.rssi, decode_options) {
            Ok(telemetry) => add_observation(&mut device_stats, &obs, telemetry),
            Err(reason) => add_reject(&mut reject_stats, &reason, &obs),
        }
    }

    let input_bytes = fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
    let mut report = make_stub_report(&path.display().to_string(), input_bytes);
    if let Some(now) = format_now() {
        report.generated_at = now;
    }
    report.capture_summary = Some(CaptureSummary {
        observations_total,
        time_start: format_ts(first_ts),
        time_end: format_ts(last_ts),
    });
    report.devices = build_device_summaries(device_stats);
    report.rejects = build_reject_summaries(reject_stats);
    Ok(report)
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let Some(ts) = ts else { return };
    if first.is_none_or(|current| ts < current) {
        *first = Some(ts);
    }
    if last.is_none_or(|current| ts > current) {
        *last = Some(ts);
    }
}

fn format_ts(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1e9) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|moment| moment.format(&Rfc3339).ok())
}

fn format_now() -> Option<String> {
    OffsetDateTime::now_utc().format(&Rfc3339).ok()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{ReplayOptions, format_ts, replay_source};
    use crate::source::{CaptureFileSource, CaptureRecord};

    fn record(ts: Option<f64>, address: &str, data: &str) -> CaptureRecord {
        CaptureRecord {
            ts,
            address: address.to_string(),
            rssi: Some(-70),
            data: data.to_string(),
        }
    }

    #[test]
    fn replay_aggregates_devices_and_rejects() {
        // Two valid frames from one bike, one too-short payload.
        let valid = "02010621000764000000960000000000000000";
        let source = CaptureFileSource::from_records(vec![
            record(Some(10.0), "BIKE-1", valid),
            record(Some(11.0), "BIKE-1", valid),
            record(Some(12.0), "BIKE-2", "0601"),
        ]);

        let report = replay_source(
            Path::new("capture.json"),
            source,
            ReplayOptions::default(),
        )
        .unwrap();

        let summary = report.capture_summary.expect("capture summary");
        assert_eq!(summary.observations_total, 3);
        assert_eq!(summary.time_start.as_deref(), Some("1970-01-01T00:00:10Z"));
        assert_eq!(summary.time_end.as_deref(), Some("1970-01-01T00:00:12Z"));

        assert_eq!(report.devices.len(), 1);
        assert_eq!(report.devices[0].address, "BIKE-1");
        assert_eq!(report.devices[0].frames_count, 2);

        assert_eq!(report.rejects.len(), 1);
        assert_eq!(report.rejects[0].id, "PS-LENGTH-RANGE");
        assert_eq!(report.rejects[0].count, 1);
        assert_eq!(report.rejects[0].examples.len(), 1);
    }

    #[test]
    fn format_ts_is_rfc3339() {
        assert_eq!(format_ts(Some(0.0)).as_deref(), Some("1970-01-01T00:00:00Z"));
        assert_eq!(format_ts(None), None);
    }
}
