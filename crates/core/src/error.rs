use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid recurrence '{input}': {reason}")]
    Recurrence { input: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Shorthand for a recurrence parse failure.
    pub fn recurrence(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Recurrence {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
