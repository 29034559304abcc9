use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use pedalscope_core::{
    CaptureFileSource, CaptureRecord, DecodeMode, DecodeOptions, DistanceConvention,
    ReplayOptions, SyntheticBroadcast, decode_with, replay_source,
};
use time::OffsetDateTime;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("PEDALSCOPE_BUILD_COMMIT"),
    ", ",
    env!("PEDALSCOPE_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "pedalscope")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Offline decoder and analyzer for fitness-bike broadcast captures.",
    long_about = None,
    after_help = "Examples:\n  pedalscope decode 020106210007e803b00496002800021e19800c\n  pedalscope capture analyse scan.json -o report.json\n  pedalscope synth --bikes 4 --frames 30 -o scan.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode one advertisement payload and print the telemetry as JSON.
    Decode {
        /// Raw payload, hex-encoded
        payload: String,

        /// Transport address to echo into the record
        #[arg(long, default_value = "00:00:00:00:00:00")]
        address: String,

        /// Signal strength to echo into the record
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        rssi: i16,

        /// Zero-fill malformed payloads instead of rejecting them
        #[arg(long)]
        lenient: bool,

        /// Use the legacy distance convention (flag set scales by miles-per-km)
        #[arg(long)]
        legacy_distance: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Operations on recorded scan captures (offline-first).
    Capture {
        #[command(subcommand)]
        command: CaptureCommands,
    },
    /// Generate a deterministic synthetic capture for testing.
    Synth {
        /// Number of simulated bikes
        #[arg(long, default_value_t = 2)]
        bikes: u8,

        /// Frames per bike
        #[arg(long, default_value_t = 10)]
        frames: u32,

        /// Output capture path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        output: Option<PathBuf>,

        /// Write the capture JSON to stdout
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },
}

#[derive(Subcommand, Debug)]
enum CaptureCommands {
    /// Analyse a capture file and generate a versioned JSON report.
    #[command(alias = "analyze")]
    #[command(
        after_help = "Examples:\n  pedalscope capture analyse scan.json -o report.json\n  pedalscope capture analyze scan.json --stdout --pretty"
    )]
    Analyse {
        /// Path to a .json capture file
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if any observation was rejected
        #[arg(long)]
        strict: bool,

        /// List reject summaries after analysis
        #[arg(long)]
        list_rejects: bool,

        /// Use the legacy distance convention
        #[arg(long)]
        legacy_distance: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decode {
            payload,
            address,
            rssi,
            lenient,
            legacy_distance,
            pretty,
        } => cmd_decode(&payload, &address, rssi, lenient, legacy_distance, pretty),
        Commands::Capture { command } => match command {
            CaptureCommands::Analyse {
                input,
                report,
                stdout,
                pretty,
                compact,
                quiet,
                strict,
                list_rejects,
                legacy_distance,
            } => cmd_capture_analyse(
                input,
                report,
                stdout,
                pretty,
                compact,
                quiet,
                strict,
                list_rejects,
                legacy_distance,
            ),
        },
        Commands::Synth {
            bikes,
            frames,
            output,
            stdout,
        } => cmd_synth(bikes, frames, output, stdout),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

fn distance_convention(legacy: bool) -> DistanceConvention {
    if legacy {
        DistanceConvention::ScaledMilesWhenFlagSet
    } else {
        DistanceConvention::KilometersWhenFlagSet
    }
}

fn cmd_decode(
    payload: &str,
    address: &str,
    rssi: i16,
    lenient: bool,
    legacy_distance: bool,
    pretty: bool,
) -> Result<(), CliError> {
    let bytes = hex::decode(payload.trim()).map_err(|err| {
        CliError::new(
            format!("invalid hex payload: {err}"),
            Some("pass the raw manufacturer data as an even-length hex string".to_string()),
        )
    })?;

    let options = DecodeOptions {
        mode: if lenient {
            DecodeMode::Lenient
        } else {
            DecodeMode::Strict
        },
        distance: distance_convention(legacy_distance),
    };

    let telemetry = decode_with(&bytes, address, rssi, options).map_err(|reason| {
        CliError::new(
            format!("payload rejected: {reason}"),
            Some("use --lenient to zero-fill malformed payloads".to_string()),
        )
    })?;

    let json = if pretty {
        serde_json::to_string_pretty(&telemetry)
    } else {
        serde_json::to_string(&telemetry)
    }
    .context("JSON serialization failed")?;
    println!("{}", json);
    Ok(())
}

fn cmd_capture_analyse(
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    strict: bool,
    list_rejects: bool,
    legacy_distance: bool,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;
    let report = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    if let Some(report_path) = report.as_ref() {
        let report_abs = report_path
            .parent()
            .map(|parent| {
                if parent.as_os_str().is_empty() {
                    fs::canonicalize(".")
                } else {
                    fs::canonicalize(parent)
                }
            })
            .transpose()
            .with_context(|| format!("Failed to resolve output path: {}", report_path.display()))?;
        if let Some(report_dir) = report_abs {
            let report_target = report_dir.join(
                report_path
                    .file_name()
                    .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?,
            );
            if report_target == input_abs {
                return Err(CliError::new(
                    format!(
                        "report path must differ from input: {}",
                        report_path.display()
                    ),
                    Some("choose a different output path".to_string()),
                ));
            }
        }
    }

    let source = CaptureFileSource::open(&resolved_input)
        .with_context(|| format!("Failed to read capture: {}", resolved_input.display()))?;
    let options = ReplayOptions {
        distance: distance_convention(legacy_distance),
    };
    let rep = replay_source(&resolved_input, source, options).context("capture replay failed")?;
    let json = serialize_report(&rep, pretty, compact)?;

    if stdout {
        print!("{}", json);
        if list_rejects && !quiet {
            print_rejects(&rep);
        }
        if strict && !rep.rejects.is_empty() {
            return Err(CliError::new(
                "rejected observations present",
                Some("use --list-rejects to inspect".to_string()),
            ));
        }
        return Ok(());
    }

    let report = report.expect("report required when not using stdout");
    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    fs::write(&report, json)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;

    if list_rejects && !quiet {
        print_rejects(&rep);
    }
    if !quiet {
        eprintln!("OK: report written -> {}", report.display());
    }
    if strict && !rep.rejects.is_empty() {
        return Err(CliError::new(
            "rejected observations present",
            Some("use --list-rejects to inspect".to_string()),
        ));
    }
    Ok(())
}

fn cmd_synth(
    bikes: u8,
    frames: u32,
    output: Option<PathBuf>,
    stdout: bool,
) -> Result<(), CliError> {
    if bikes == 0 || frames == 0 {
        return Err(CliError::new(
            "nothing to generate",
            Some("use --bikes and --frames greater than zero".to_string()),
        ));
    }

    let start = OffsetDateTime::now_utc().unix_timestamp() as f64;
    let mut records = Vec::with_capacity(usize::from(bikes) * frames as usize);
    for frame in 0..frames {
        for bike in 0..bikes {
            let payload = synth_frame(bike, frame).map_err(|err| {
                CliError::new(format!("synthetic frame generation failed: {err}"), None)
            })?;
            records.push(CaptureRecord {
                ts: Some(start + f64::from(frame)),
                address: format!("C4:32:96:00:00:{:02X}", bike + 1),
                rssi: Some(-55 - i16::from(bike % 8) * 3),
                data: hex::encode(payload),
            });
        }
    }

    let json = serde_json::to_string(&records).context("JSON serialization failed")?;
    match output {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("Failed to write capture: {}", path.display()))?;
            eprintln!("OK: capture written -> {}", path.display());
        }
        None => {
            debug_assert!(stdout);
            print!("{}", json);
        }
    }
    Ok(())
}

/// Plausible workout ramp for one bike, no randomness involved.
fn synth_frame(bike: u8, frame: u32) -> Result<Vec<u8>, pedalscope_core::EncodeError> {
    let spread = u32::from(bike) * 37;
    SyntheticBroadcast {
        build_minor: 21,
        equipment_ordinal: bike + 1,
        cadence_tenths: (700 + (frame * 15 + spread) % 600) as u16,
        heart_rate_tenths: (1100 + (frame * 9 + spread) % 700) as u16,
        power_watts: (120 + (frame * 5 + spread) % 180) as u16,
        energy_kcal: (frame / 4) as u16,
        minutes: (frame / 60) as u8,
        seconds: (frame % 60) as u8,
        distance_tenths: ((frame * 2) % 0x8000) as u16,
        metric_flag: true,
        gear: Some((8 + (frame / 10 + u32::from(bike)) % 10) as u8),
        ..SyntheticBroadcast::default()
    }
    .encode()
}

fn serialize_report(
    rep: &pedalscope_core::CaptureReport,
    pretty: bool,
    compact: bool,
) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_rejects(rep: &pedalscope_core::CaptureReport) {
    eprintln!("Rejected observations:");
    for reject in &rep.rejects {
        eprintln!("  {} {} ({})", reject.id, reject.message, reject.count);
    }
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .json capture file".to_string()),
        ));
    }
    let meta = fs::metadata(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .json capture file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "json" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .json capture file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected a .json capture".to_string()),
        ));
    }
    if matches.len() > 1 {
        let hint = "pass a single capture file, or run once per file".to_string();
        let mut message = format!(
            "multiple files match pattern '{}' ({} matches)",
            pattern,
            matches.len()
        );
        let listed = matches.iter().take(3).collect::<Vec<_>>();
        if !listed.is_empty() {
            let mut details = String::new();
            details.push_str("; matches: ");
            details.push_str(
                &listed
                    .into_iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            );
            if matches.len() > 3 {
                details.push_str(", ...");
            }
            message.push_str(&details);
        }
        return Err(CliError::new(message, Some(hint)));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
