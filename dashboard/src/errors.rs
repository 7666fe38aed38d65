use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure or a non-success status without a more specific meaning
    #[error("Network error: {0}")]
    Network(String),

    /// No session, expired session, or the API rejected the credential
    #[error("Authentication error: {0}")]
    Auth(String),

    /// API answered with an unexpected status
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Response body was not the JSON document we expected
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Malformed rekognition labels: {0}")]
    MalformedLabels(String),

    #[error("Unparseable timestamp: {0}")]
    TimestampParse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Poll loop has stopped")]
    PollerStopped,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::Decode(err.to_string())
        } else {
            Error::Network(err.to_string())
        }
    }
}
