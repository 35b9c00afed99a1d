//! Defines errors returned by the other modules

use crate::prelude::*;
use thiserror::Error;

/// Types of error that can occur while looking up network objects
#[derive(Error, Debug, Clone)]
pub enum LookupError
{
    #[error("No such client id {0}")]
    NoSuchClient(ClientId),
    #[error("No such channel id {0}")]
    NoSuchChannel(ChannelId),
    #[error("No such nickname {0}")]
    NoSuchNick(String),
    #[error("No such channel name {0}")]
    NoSuchChannelName(String),
    #[error("{0} is not a member of {1}")]
    NotAMember(ClientId, ChannelName),
}

/// Convenience definition of a Result type used to look up network objects.
pub type LookupResult<T> = std::result::Result<T, LookupError>;

/// Errors that can occur when a requested state change is inconsistent with
/// the current state
#[derive(Error, Debug, Clone)]
pub enum ValidationError
{
    #[error("Nickname {0} is already in use")]
    NickInUse(Nickname),
    #[error("{0}")]
    ObjectNotFound(#[from] LookupError),
    #[error("{0}")]
    InvalidName(#[from] InvalidNameError),
}
