//! Error type shared by the simulator, optimizer and report layers.

use thiserror::Error;

/// Errors raised by the CHSH simulator.
#[derive(Debug, Error)]
pub enum ChshError {
    /// A numeric input is outside its valid domain.
    #[error("invalid {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// A batch with no games was requested or analyzed.
    #[error("degenerate batch: at least one game is required")]
    DegenerateBatch,
    /// Report text did not match the line-oriented format.
    #[error("malformed report at line {line}: {reason}")]
    ReportFormat { line: usize, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChshError>;

impl ChshError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        ChshError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}
