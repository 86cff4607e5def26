//! Our error types for the Sorensen PSU client.

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error type for Sorensen PSU communications.
#[derive(Error, Debug)]
pub enum Error {
    /// Opening the TCP connection to the PSU failed.
    #[error("Failed to connect to {addr}, check the device IP: {source}")]
    ConnectionFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Connection does not exist, reconnect with a valid device address")]
    NotConnected,
    /// No terminator arrived before the read timed out. Whatever was received is kept.
    #[error("Communication timeout, partial reply {partial:?}")]
    Timeout { partial: String },
    #[error("Link error: {0:?}")]
    Link(embedded_io::ErrorKind),
    #[error("Reply exceeded the line buffer")]
    BufferOverflow,
    #[error("Malformed reply {reply:?} to command {command:?}")]
    MalformedReply { command: String, reply: String },
    #[error("Invalid channel state {0} reported")]
    InvalidChannelState(i64),
    #[error("HTTP request failed with status {0}")]
    HttpStatus(u16),
    #[error("HTTP transport error: {0}")]
    HttpTransport(String),
    #[error("Reply marker missing from the control page")]
    MissingReply,
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl Error {
    /// Map a link error through its [`embedded_io::ErrorKind`].
    pub(crate) fn from_link<E: embedded_io::Error>(err: E) -> Self {
        Error::Link(err.kind())
    }
}

impl From<serde_yml::Error> for Error {
    fn from(err: serde_yml::Error) -> Self {
        Error::InvalidConfiguration(err.to_string())
    }
}

impl From<strum::ParseError> for Error {
    fn from(err: strum::ParseError) -> Self {
        Error::InvalidConfiguration(err.to_string())
    }
}
