use thiserror::Error;

/// Result type alias using TriggerError
pub type Result<T> = std::result::Result<T, TriggerError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing and log assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Discovery
    /// Discovery was requested before the tracker ran any comparison
    InvalidSequencing,
    /// The recursive strategy ran more iterations than `max_recursion` allows
    RecursionExceeded,

    // Dispatch
    TriggerFailed,

    // Configuration
    Io,
    Serialization,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidSequencing => "ERR_INVALID_SEQUENCING",
            ExErrorKind::RecursionExceeded => "ERR_RECURSION_EXCEEDED",
            ExErrorKind::TriggerFailed => "ERR_TRIGGER_FAILED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus the
/// discovery context (strategy name, iteration) that produced it.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    strategy: Option<String>,
    iteration: Option<usize>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            strategy: None,
            iteration: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add discovery strategy name
    pub fn with_strategy(mut self, name: impl Into<String>) -> Self {
        self.strategy = Some(name.into());
        self
    }

    /// Add iteration context
    pub fn with_iteration(mut self, iteration: usize) -> Self {
        self.iteration = Some(iteration);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the strategy name, if any
    pub fn strategy(&self) -> Option<&str> {
        self.strategy.as_deref()
    }

    /// Get the iteration, if any
    pub fn iteration(&self) -> Option<usize> {
        self.iteration
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(strategy) = &self.strategy {
            write!(f, " (strategy: {})", strategy)?;
        }
        if let Some(iteration) = self.iteration {
            write!(f, " (iteration: {})", iteration)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Errors raised by change discovery, trigger dispatch and configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TriggerError {
    // ===== Discovery Errors =====
    /// No comparison has run against the tracker yet
    #[error("Trigger discovery process has not yet started. Call discover_changes() or raise_before_save_triggers() first")]
    DiscoveryNotStarted,

    /// Triggers kept producing changes past the recursion cap
    #[error("MaxRecursion was reached: {name} exceeded {max_recursion} at iteration {iteration}")]
    MaxRecursionReached {
        name: String,
        max_recursion: usize,
        iteration: usize,
    },

    // ===== Dispatch Errors =====
    /// A trigger reaction failed
    #[error("Trigger failed: {reason}")]
    Dispatch { reason: String },

    // ===== Configuration Errors =====
    /// Configuration file could not be read
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Configuration could not be parsed
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<TriggerError> for ExError {
    fn from(err: TriggerError) -> Self {
        let message = err.to_string();
        match err {
            TriggerError::DiscoveryNotStarted => {
                ExError::new(ExErrorKind::InvalidSequencing).with_message(message)
            }

            TriggerError::MaxRecursionReached {
                name, iteration, ..
            } => ExError::new(ExErrorKind::RecursionExceeded)
                .with_strategy(name)
                .with_iteration(iteration)
                .with_message(message),

            TriggerError::Dispatch { .. } => {
                ExError::new(ExErrorKind::TriggerFailed).with_message(message)
            }

            TriggerError::Io { .. } => ExError::new(ExErrorKind::Io)
                .with_op("load_settings")
                .with_message(message),

            TriggerError::Serialization { .. } => ExError::new(ExErrorKind::Serialization)
                .with_op("load_settings")
                .with_message(message),
        }
    }
}

impl From<std::io::Error> for TriggerError {
    fn from(err: std::io::Error) -> Self {
        TriggerError::Io {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TriggerError {
    fn from(err: toml::de::Error) -> Self {
        TriggerError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_error_kind_codes() {
        let cases = [
            (ExErrorKind::InvalidSequencing, "ERR_INVALID_SEQUENCING"),
            (ExErrorKind::RecursionExceeded, "ERR_RECURSION_EXCEEDED"),
            (ExErrorKind::TriggerFailed, "ERR_TRIGGER_FAILED"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_display_includes_context() {
        let err = ExError::new(ExErrorKind::RecursionExceeded)
            .with_op("raise_before_save_triggers")
            .with_strategy("BeforeSave")
            .with_iteration(4)
            .with_message("cap hit");

        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_RECURSION_EXCEEDED]"));
        assert!(rendered.contains("raise_before_save_triggers"));
        assert!(rendered.contains("strategy: BeforeSave"));
        assert!(rendered.contains("iteration: 4"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.toml");
        let err: TriggerError = io.into();
        assert!(matches!(err, TriggerError::Io { .. }));
    }
}
