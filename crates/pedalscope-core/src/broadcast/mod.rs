//! M-series broadcast decoding.
//!
//! The parser applies the length gate, skips the optional BLE flags prefix,
//! reads the hex-reinterpreted version bytes, and extracts the 14-byte fixed
//! block (little-endian u16 pairs) plus the version-gated trailing gear
//! byte. Strict mode surfaces structural failures as [`RejectReason`];
//! lenient mode absorbs them into a zero-filled record.
//!
//! Byte offsets live in `layout`, cursor conventions in `reader`, and the
//! firmware conversion quirks (version digits, interval derivation, the two
//! distance conventions) in `units`. `encoder` is the exact inverse
//! transform, used for synthetic captures and round-trip tests.
//!
//! Version française (résumé):
//! Décodage des trames M-series : garde de longueur, préfixe "flags"
//! optionnel, octets de version réinterprétés en décimal, bloc fixe de 14
//! octets en petit-boutiste, octet de braquet conditionné par la version.
//! Les positions sont dans `layout`, les conventions dans `reader` et
//! `units`; `encoder` est la transformée inverse.

pub mod encoder;
pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod units;

pub use encoder::{EncodeError, SyntheticBroadcast};
pub use error::RejectReason;
pub use parser::{DecodeMode, DecodeOptions, decode, decode_with};
pub use units::DistanceConvention;
