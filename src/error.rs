use std::io;
use std::time::Duration;

use thiserror::Error;

/// Boxed cause attached to decode failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Generic error type
#[derive(Error, Debug)]
pub enum Error {
    /// A required request field is missing or zero
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Missing or malformed backend configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A value the backend cannot represent
    #[error("Unsupported value: {0}")]
    Unsupported(String),

    /// Malformed PEM, certificate or extension encoding
    #[error("Decode error: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Certificate does not carry a recognizable correlation extension
    #[error("Missing correlation: {0}")]
    MissingCorrelation(String),

    /// The remote call failed
    #[error("{context}")]
    Remote {
        context: String,
        #[source]
        source: ClientError,
    },

    /// The remote call succeeded but returned no certificates
    #[error("{0}: certificate chain is empty")]
    EmptyChain(String),

    /// A call or long-running operation did not complete within its deadline
    #[error("{operation} did not complete within {deadline:?}")]
    OperationTimeout { operation: String, deadline: Duration },

    /// No backend registered under the requested name
    #[error("Unknown certificate authority backend '{0}'")]
    UnknownBackend(String),

    /// Local signing failure
    #[error("Signing error: {0}")]
    Signing(#[from] rcgen::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Error taxonomy shared by every backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Config,
    Unsupported,
    Decode,
    MissingCorrelation,
    Remote,
    OperationTimeout,
    UnknownBackend,
    Signing,
    Io,
}

impl Error {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Config(_) => ErrorKind::Config,
            Error::Unsupported(_) => ErrorKind::Unsupported,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::MissingCorrelation(_) => ErrorKind::MissingCorrelation,
            Error::Remote { .. } | Error::EmptyChain(_) => ErrorKind::Remote,
            Error::OperationTimeout { .. } => ErrorKind::OperationTimeout,
            Error::UnknownBackend(_) => ErrorKind::UnknownBackend,
            Error::Signing(_) => ErrorKind::Signing,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Decode error without an underlying cause
    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode {
            message: message.into(),
            source: None,
        }
    }

    /// Decode error wrapping the parser failure
    pub fn decode_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Decode {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Remote error with the name of the failed call
    pub fn remote(context: impl Into<String>, source: ClientError) -> Self {
        Error::Remote {
            context: context.into(),
            source,
        }
    }
}

/// Failure reported by a remote CA client
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP transport error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("remote API returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// A long-running operation finished with an error
    #[error("operation {operation} failed with code {code}: {message}")]
    Operation {
        operation: String,
        code: i32,
        message: String,
    },

    /// The response could not be interpreted
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(format!("YAML error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_chain_is_remote_kind() {
        let err = Error::EmptyChain("get certificate authority".into());
        assert_eq!(err.kind(), ErrorKind::Remote);
    }

    #[test]
    fn test_remote_error_preserves_cause() {
        use std::error::Error as _;

        let err = Error::remote(
            "create certificate",
            ClientError::Status {
                status: 503,
                message: "unavailable".into(),
            },
        );
        let source = err.source().expect("cause is kept");
        assert!(source.to_string().contains("503"));
        assert_eq!(err.to_string(), "create certificate");
    }
}
