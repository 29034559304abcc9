use std::collections::HashMap;

use crate::broadcast::RejectReason;
use crate::source::Observation;
use crate::{DeviceSummary, RejectSummary, Telemetry};

const MAX_REJECT_EXAMPLES: usize = 3;

#[derive(Debug, Default)]
pub(crate) struct DeviceStats {
    pub frames: u64,
    pub rssi_min: Option<i16>,
    pub rssi_max: Option<i16>,
    pub max_power_watts: u16,
    pub max_cadence_rpm: f64,
    pub last: Option<Telemetry>,
}

#[derive(Debug, Default)]
pub(crate) struct RejectStats {
    pub message: String,
    pub count: u64,
    pub examples: Vec<String>,
}

pub(crate) fn add_observation(
    stats: &mut HashMap<String, DeviceStats>,
    obs: &Observation,
    telemetry: Telemetry,
) {
    let entry = stats.entry(obs.address.clone()).or_default();
    entry.frames += 1;
    entry.rssi_min = Some(entry.rssi_min.map_or(obs.rssi, |min| min.min(obs.rssi)));
    entry.rssi_max = Some(entry.rssi_max.map_or(obs.rssi, |max| max.max(obs.rssi)));
    entry.max_power_watts = entry.max_power_watts.max(telemetry.power_watts);
    if telemetry.cadence_rpm > entry.max_cadence_rpm {
        entry.max_cadence_rpm = telemetry.cadence_rpm;
    }
    entry.last = Some(telemetry);
}

pub(crate) fn add_reject(
    stats: &mut HashMap<&'static str, RejectStats>,
    reason: &RejectReason,
    obs: &Observation,
) {
    let entry = stats.entry(reason.id()).or_default();
    if entry.count == 0 {
        entry.message = reason.to_string();
    }
    entry.count += 1;
    if entry.examples.len() < MAX_REJECT_EXAMPLES {
        entry.examples.push(format_example(obs));
    }
}

fn format_example(obs: &Observation) -> String {
    match obs.ts {
        Some(ts) => format!("address {} @ {ts}", obs.address),
        None => format!("address {}", obs.address),
    }
}

pub(crate) fn build_device_summaries(stats: HashMap<String, DeviceStats>) -> Vec<DeviceSummary> {
    let mut devices: Vec<DeviceSummary> = stats
        .into_iter()
        .map(|(address, stats)| DeviceSummary {
            address,
            equipment_ordinal: stats
                .last
                .as_ref()
                .map_or(0, |telemetry| telemetry.equipment_ordinal),
            frames_count: stats.frames,
            rssi_min: stats.rssi_min,
            rssi_max: stats.rssi_max,
            max_power_watts: stats.max_power_watts,
            max_cadence_rpm: stats.max_cadence_rpm,
            last: stats.last,
        })
        .collect();

    devices.sort_by(|a, b| a.address.cmp(&b.address));
    devices
}

pub(crate) fn build_reject_summaries(
    stats: HashMap<&'static str, RejectStats>,
) -> Vec<RejectSummary> {
    let mut rejects: Vec<RejectSummary> = stats
        .into_iter()
        .map(|(id, stats)| RejectSummary {
            id: id.to_string(),
            message: stats.message,
            count: stats.count,
            examples: stats.examples,
        })
        .collect();

    rejects.sort_by(|a, b| a.id.cmp(&b.id));
    rejects
}
