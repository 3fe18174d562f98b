//! Errors of the realignment.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// No alignment can be found for this hit. Not fatal: the caller may skip the hit
    /// or retry with relaxed parameters.
    #[error("no alignment found: {reason}")]
    NoAlignment { reason: &'static str },
    /// A profile is longer than the buffers of the decoder.
    #[error("{which} length {length} exceeds the decoder capacity {capacity}")]
    CapacityExceeded {
        which: &'static str,
        length: usize,
        capacity: usize,
    },
    /// A matrix is not sized to the query/template pair.
    #[error("{which} is {rows}x{cols}, but the profiles are {q_len}x{t_len}")]
    DimensionMismatch {
        which: &'static str,
        rows: usize,
        cols: usize,
        q_len: usize,
        t_len: usize,
    },
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

impl DecodeError {
    pub fn no_alignment(reason: &'static str) -> Self {
        DecodeError::NoAlignment { reason }
    }
    /// True if this error only means "no alignment for this hit".
    pub fn is_no_alignment(&self) -> bool {
        matches!(self, DecodeError::NoAlignment { .. })
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
