use thiserror::Error;

pub type VeResult<T> = Result<T, VeError>;

/// Failures surfaced by the upscaling core and its collaborators.
///
/// None of these are transient: every one of them is either a permanently
/// unsupported query or a malformed input, so callers should not retry.
#[derive(Error, Debug)]
pub enum VeError {
    /// The queried operation has no upscaled counterpart
    #[error("{0} is not implemented for the upscaled model")]
    NotImplemented(&'static str),

    #[error("invalid column topology: {reason}")]
    InvalidTopology { reason: String },

    #[error("size mismatch for {what}: expected {expected}, got {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl VeError {
    pub(crate) fn topology(reason: impl Into<String>) -> Self {
        VeError::InvalidTopology {
            reason: reason.into(),
        }
    }

    pub(crate) fn size(what: &'static str, expected: usize, actual: usize) -> Self {
        VeError::SizeMismatch {
            what,
            expected,
            actual,
        }
    }
}
