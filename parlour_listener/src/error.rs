use thiserror::Error;
use serde::{Serialize, Deserialize};
use tokio::sync::mpsc::error::SendError;

/// An error that might occur on a single connection.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionError
{
    #[error("Connection closed")]
    Closed,
    #[error("I/O Error: {0}")]
    IoError(String),
    #[error("ReadQ exceeded")]
    ReadQueueExceeded,
    #[error("SendQ exceeded")]
    SendQueueExceeded,
    #[error("TLS error: {0}")]
    TlsError(String),
    #[error("Internal error")]
    InternalError,
}

/// An error that might occur when configuring a listener.
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum ListenerError
{
    #[error("TLS requested with no TLS config")]
    NoTlsConfig,
    #[error("Invalid TLS configuration: {0}")]
    BadTlsConfig(String),
    #[error("I/O Error: {0}")]
    IoError(String),
    #[error("Error communicating with server")]
    CommunicationError,
}

impl From<std::io::Error> for ListenerError
{
    fn from(e: std::io::Error) -> Self
    {
        Self::IoError(e.to_string())
    }
}

impl From<rustls::Error> for ListenerError
{
    fn from(e: rustls::Error) -> Self
    {
        Self::BadTlsConfig(e.to_string())
    }
}

impl<T> From<SendError<T>> for ListenerError
{
    fn from(_: SendError<T>) -> Self { Self::CommunicationError }
}

impl From<std::io::Error> for ConnectionError
{
    fn from(e: std::io::Error) -> Self
    {
        Self::IoError(e.to_string())
    }
}

impl From<rustls::Error> for ConnectionError
{
    fn from(e: rustls::Error) -> Self
    {
        Self::TlsError(e.to_string())
    }
}

impl<T> From<SendError<T>> for ConnectionError
{
    fn from(_: SendError<T>) -> Self { Self::Closed }
}
