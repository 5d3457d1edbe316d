use thiserror::Error;

pub type Result<T> = std::result::Result<T, PayError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayError {
    /// Missing or invalid static configuration: keys, algorithms, certificate material, empty gateway replies.
    #[error("Configuration error. {0}")]
    ConfigurationError(String),
    /// A request field violates the gateway's contract. The message always names the offending field.
    #[error("Validation error. {0}")]
    ValidationError(String),
    /// The remote party sent a document we could not parse.
    #[error("Could not parse protocol message. {0}")]
    ProtocolParseError(String),
}

impl PayError {
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::ConfigurationError(msg.into())
    }

    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn protocol<S: Into<String>>(msg: S) -> Self {
        Self::ProtocolParseError(msg.into())
    }

    /// Prefix a protocol parse error with the document it came from. Other variants pass through untouched.
    pub fn with_context(self, context: &str) -> Self {
        match self {
            Self::ProtocolParseError(msg) => Self::ProtocolParseError(format!("{context}: {msg}")),
            other => other,
        }
    }
}
