use serde::Serialize;

/// Errors after which the byte stream cannot be trusted to contain a well-formed
/// record. Decoding stops at the first one.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
#[non_exhaustive]
pub enum StructuralError {
    #[error("truncated input at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedInput {
        /// Absolute offset of the read that failed
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("unsupported format version tag {found:#010x}")]
    UnsupportedFormatVersion {
        /// Raw tag value as found at offset 0
        found: u32,
    },

    #[error("header checksum mismatch: stored {expected:#010x}, computed {actual:#010x}")]
    HeaderChecksumMismatch { expected: u32, actual: u32 },

    #[error("record {record_index} checksum mismatch: stored {expected:#010x}, computed {actual:#010x}")]
    RecordChecksumMismatch {
        record_index: usize,
        offset: usize,
        expected: u32,
        actual: u32,
    },

    #[error("record {record_index} has unknown instrument mode code {code:#04x}")]
    UnknownInstrumentMode {
        record_index: usize,
        offset: usize,
        code: u8,
    },

    #[error("invalid timestamp at offset {offset}")]
    InvalidTimestamp { offset: usize },

    #[error("record {record_index} target id contains bytes outside the allowed charset")]
    InvalidTargetId { record_index: usize, offset: usize },

    #[error("file checksum mismatch: stored {expected:#010x}, computed {actual:#010x}")]
    FileChecksumMismatch { expected: u32, actual: u32 },

    #[error("{len} trailing bytes at offset {offset} do not form whole records")]
    TrailingBytes { offset: usize, len: usize },
}

/// Record fields subject to range checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    RightAscensionDeg,
    DeclinationDeg,
    RollAngleDeg,
}

impl Field {
    /// Name of the field as it appears on [crate::TargetRecord] and in serialized
    /// errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RightAscensionDeg => "right_ascension_deg",
            Self::DeclinationDeg => "declination_deg",
            Self::RollAngleDeg => "roll_angle_deg",
        }
    }
}

/// A domain invariant violated by bytes that otherwise decoded fine.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
#[non_exhaustive]
pub enum Violation {
    #[error("record {record_index} {} out of range: {value}", .field.name())]
    ValueOutOfRange {
        field: Field,
        record_index: usize,
        value: f64,
    },

    #[error("sequence gap: expected {expected_index}, found {found_index}")]
    SequenceGap {
        expected_index: u64,
        found_index: u64,
    },

    #[error("record {record_index} is scheduled before its predecessor")]
    TimeOrderingViolation { record_index: usize },

    #[error("header declares {declared} records, file contains {actual}")]
    RecordCountMismatch { declared: usize, actual: usize },

    #[error("record {record_index} sets undefined flag bits {bits:#04x}")]
    UndefinedFlags { record_index: usize, bits: u8 },

    #[error("record {record_index} is scheduled outside the session window")]
    OutsideSession { record_index: usize },

    #[error("session ends before it starts")]
    SessionWindowInverted,

    #[error("file contains no records")]
    NoRecords,
}

/// Result of a failed decode. Never accompanied by a partially decoded file.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "class", content = "errors")]
#[non_exhaustive]
pub enum DecodeError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("{} data-quality violation(s)", .0.len())]
    Invalid(Vec<Violation>),
}

impl DecodeError {
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural(_))
    }

    /// All data-quality violations, empty for structural errors.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Invalid(violations) => violations,
            Self::Structural(_) => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
