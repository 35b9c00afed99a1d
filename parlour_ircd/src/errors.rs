use parlour_listener::{ConnectionError, ListenerError};
use parlour_network::prelude::*;

use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

/// An error that could occur while handling a connection or state event
#[derive(Debug, Error)]
pub enum HandlerError
{
    #[error("Internal error: {0}")]
    InternalError(String),
    #[error("Connection error: {0}")]
    ConnectionError(#[from] ConnectionError),
    #[error("Object lookup failed: {0}")]
    LookupError(#[from] LookupError),
    #[error("Invalid name: {0}")]
    InvalidName(#[from] InvalidNameError),
}

impl From<&str> for HandlerError
{
    fn from(msg: &str) -> Self { Self::InternalError(msg.to_string()) }
}

pub type HandleResult = Result<(), HandlerError>;

/// An error that prevents the server from starting
#[derive(Debug, Error)]
pub enum ServerError
{
    #[error("Listener error: {0}")]
    Listener(#[from] ListenerError),
    #[error("Failed to create DNS resolver: {0}")]
    Resolver(#[from] ResolveError),
}
