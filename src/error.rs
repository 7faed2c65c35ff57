use thiserror::Error;

/// Process-level failure carrying the exit code `main` should return.
///
/// Exit codes:
/// - `2` usage, input file, or schema problems
/// - `3` no usable rows after ingest
/// - `4` runtime failures (terminal, exports)
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

/// Validation failure raised by the runtime normalizer in strict mode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeParseError {
    #[error("unexpected token '{token}' at position {position}")]
    UnexpectedToken { token: String, position: usize },
    #[error("number '{token}' at position {position} is too large")]
    Overflow { token: String, position: usize },
}

impl From<RuntimeParseError> for AppError {
    fn from(err: RuntimeParseError) -> Self {
        AppError::new(2, format!("Invalid runtime: {err}"))
    }
}
