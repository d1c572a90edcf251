use std::num::ParseIntError;

use thiserror::Error;

use crate::CpuIndex;

/// Errors that can occur when parsing processor lists or working with affinity masks.
///
/// Use [`Error::kind()`] to distinguish the broad category of the problem without matching on
/// every individual variant.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller provided a supposed processor list but it did not match the expected format.
    #[error("invalid processor list syntax: '{invalid_value}' is invalid: {problem}")]
    InvalidSyntax {
        /// The specific value that was invalid. This may either be the entire input string
        /// or a specific part of it, depending on the problem.
        invalid_value: String,

        /// A human-readable description of the problem.
        problem: String,

        /// The integer parsing failure behind the problem, if there was one.
        #[source]
        source: Option<ParseIntError>,
    },

    /// A processor index does not fit within the processor count the operation was bounded by.
    #[error("processor {cpu} is out of range for {cpu_count} processors")]
    CpuOutOfRange {
        /// The offending processor index.
        cpu: CpuIndex,

        /// The number of processors the index was checked against. Valid indexes are
        /// `0..cpu_count`.
        cpu_count: u32,
    },

    /// A processor index does not fit within the groups of a mask that carries no processor
    /// count, such as a mask decoded from hexadecimal.
    #[error("processor {cpu} does not fit in a mask with room for {capacity} processors")]
    BeyondMaskCapacity {
        /// The offending processor index.
        cpu: CpuIndex,

        /// The number of bits in the mask (4 per group).
        capacity: usize,
    },

    /// A range in a processor list had its start after its end (e.g. `7-3`).
    #[error("processor range {start}-{end} has its start after its end")]
    InvertedRange {
        /// The first value of the range, as written.
        start: CpuIndex,

        /// The last value of the range, as written.
        end: CpuIndex,
    },

    /// A hexadecimal mask has more significant digits than the declared number of groups can
    /// hold. The value is never truncated to fit.
    #[error(
        "hex mask has {significant_digits} significant digits but only {groups} groups were declared"
    )]
    HexTooLong {
        /// Number of digits after leading zeros and separators were removed.
        significant_digits: usize,

        /// Number of 4-bit groups the caller declared.
        groups: usize,
    },

    /// A hexadecimal mask contained a character that is neither a hex digit nor a separator.
    #[error("hex mask '{invalid_value}' contains invalid character '{character}'")]
    InvalidHexDigit {
        /// The entire hex mask string that was being decoded.
        invalid_value: String,

        /// The first character that could not be decoded.
        character: char,
    },
}

/// The broad category of an [`Error`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Some part of a processor list could not be converted to an integer.
    Parse,

    /// A processor index fell outside the allowed bounds, or a range was inverted.
    Range,

    /// A hexadecimal mask could not be decoded into the declared number of groups.
    Decode,
}

impl Error {
    pub(crate) fn syntax(invalid_value: impl Into<String>, problem: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            invalid_value: invalid_value.into(),
            problem: problem.into(),
            source: None,
        }
    }

    pub(crate) fn syntax_caused_by(
        invalid_value: impl Into<String>,
        problem: impl Into<String>,
        inner: ParseIntError,
    ) -> Self {
        Self::InvalidSyntax {
            invalid_value: invalid_value.into(),
            problem: problem.into(),
            source: Some(inner),
        }
    }

    /// Returns the broad category this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSyntax { .. } => ErrorKind::Parse,
            Self::CpuOutOfRange { .. }
            | Self::BeyondMaskCapacity { .. }
            | Self::InvertedRange { .. } => ErrorKind::Range,
            Self::HexTooLong { .. } | Self::InvalidHexDigit { .. } => ErrorKind::Decode,
        }
    }
}

/// A specialized `Result` type for this crate, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
