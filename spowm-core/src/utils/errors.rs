use core::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpowmError {
    #[error("Empty request: at least one base/exponent pair is required")]
    EmptyInput,
    #[error("Invalid input length, expected length {0} but got {1}")]
    InvalidInputLength(usize, usize),
    #[error("Non-uniform {array} widths: entry {index} has {actual} bytes, expected {expected}")]
    NonUniformWidth {
        array: &'static str,
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Modulus must be positive")]
    ZeroModulus,
    #[error("Invalid window width {width}, expected a value in 1..={max}")]
    InvalidWindowWidth { width: usize, max: usize },
    #[error("Invalid configuration value for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },
    #[error("Encoding overflow: value needs {needed} bytes but only {width} are available")]
    EncodingOverflow { needed: usize, width: usize },
    #[error("Failed to allocate storage for {count} {what}")]
    AllocationFailure { what: &'static str, count: usize },
}

/// Coarse classification of [`SpowmError`], one bucket per failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller contract violation, reported before any table is built.
    InvalidInput,
    /// A result did not fit the requested output width.
    EncodingOverflow,
    /// Table or accumulator storage could not be obtained.
    AllocationFailure,
}

impl SpowmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SpowmError::EmptyInput
            | SpowmError::InvalidInputLength(..)
            | SpowmError::NonUniformWidth { .. }
            | SpowmError::ZeroModulus
            | SpowmError::InvalidWindowWidth { .. }
            | SpowmError::InvalidConfig { .. } => ErrorKind::InvalidInput,
            SpowmError::EncodingOverflow { .. } => ErrorKind::EncodingOverflow,
            SpowmError::AllocationFailure { .. } => ErrorKind::AllocationFailure,
        }
    }
}
