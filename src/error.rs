use thiserror::Error;

/// Error returned by the middle-segment fitter.
///
/// These are detected at the point of computation and never retried: the fit
/// is deterministic, so the same inputs always fail the same way.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// Inputs rejected before any computation (length mismatch, empty input,
    /// `eps` out of range, non-finite samples).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Too few samples survived the middle-band filter to regress on.
    #[error("Insufficient data: {selected} sample(s) in the middle band, need at least {required}")]
    InsufficientData { selected: usize, required: usize },

    /// The fitted line cannot be back-solved for time.
    #[error("Degenerate fit: {0}")]
    DegenerateFit(String),
}

impl FitError {
    /// Process exit code used when this error ends a run.
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::InvalidArgument(_) => 2,
            FitError::InsufficientData { .. } => 3,
            FitError::DegenerateFit(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
