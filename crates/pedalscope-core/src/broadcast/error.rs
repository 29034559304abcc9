use thiserror::Error;

/// Structural rejection reasons surfaced in strict mode.
///
/// These are the only two failure modes of the decoder; the version-byte
/// hex-reinterpretation quirk silently defaults to 0 and never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("advertisement length out of range: got {actual} bytes, expected 4..=19")]
    LengthOutOfRange { actual: usize },
    #[error("unsupported build {build_major} or truncated payload: {remaining} bytes after version header")]
    UnsupportedBuildOrTooShort { build_major: u8, remaining: usize },
}

impl RejectReason {
    /// Stable identifier used by capture reports to aggregate rejects.
    pub fn id(&self) -> &'static str {
        match self {
            RejectReason::LengthOutOfRange { .. } => "PS-LENGTH-RANGE",
            RejectReason::UnsupportedBuildOrTooShort { .. } => "PS-UNSUPPORTED-BUILD",
        }
    }
}
