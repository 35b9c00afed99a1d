use super::*;

use thiserror::Error;

/// A channel-related permission error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPermissionError
{
    /// The user isn't in a channel, and needs to be in order to be allowed the operation
    NotOnChannel,
    /// The target of the operation isn't in the channel
    UserNotOnChannel,
    /// The target of an invitation is already in the channel
    UserOnChannel,
    /// Channel operator privileges are required
    UserNotOp,
    /// The user holds some status, but not enough to act on the target
    InsufficientRank,
    /// The user may not grant or remove that member mode
    CannotGrantMode,
    /// User is banned from the channel
    UserIsBanned,
    /// Channel is invite-only
    InviteOnlyChannel,
    /// User hasn't provided the right channel key
    BadChannelKey,
    /// Channel member limit has been reached
    ChannelIsFull,
    /// Channel is restricted to IRC operators
    OperOnlyChannel,
    /// User is already in the maximum number of channels
    TooManyChannels,
    /// User cannot send for some other reason
    CannotSendToChannel,
}

impl ChannelPermissionError
{
    /// The numeric reply code reporting this error
    pub fn code(&self) -> u16
    {
        use ChannelPermissionError::*;
        match self {
            NotOnChannel => 442,
            UserNotOnChannel => 441,
            UserOnChannel => 443,
            UserNotOp | InsufficientRank | CannotGrantMode => 482,
            UserIsBanned => 474,
            InviteOnlyChannel => 473,
            BadChannelKey => 475,
            ChannelIsFull => 471,
            OperOnlyChannel => 520,
            TooManyChannels => 405,
            CannotSendToChannel => 404,
        }
    }

    /// Human-readable reply text
    pub fn text(&self) -> &'static str
    {
        use ChannelPermissionError::*;
        match self {
            NotOnChannel => "You're not on that channel",
            UserNotOnChannel => "They aren't on that channel",
            UserOnChannel => "is already on channel",
            UserNotOp => "You're not a channel operator",
            InsufficientRank => "Your channel status is too low to do that",
            CannotGrantMode => "You may not change that member status",
            UserIsBanned => "Cannot join channel (+b) - you are banned",
            InviteOnlyChannel => "Cannot join channel (+i) - you must be invited",
            BadChannelKey => "Cannot join channel (+k) - bad key",
            ChannelIsFull => "Cannot join channel (+l) - channel is full",
            OperOnlyChannel => "Cannot join channel (+O) - you are not an IRC operator",
            TooManyChannels => "You have joined too many channels",
            CannotSendToChannel => "Cannot send to channel",
        }
    }
}

/// A user-related permission error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserPermissionError
{
    /// User is not an oper
    NotOper,
    /// User is an oper, but lacks the privilege required
    NoPrivilege,
    /// That user mode can't be set directly
    ReadOnlyUmode,
    /// Users may only change their own modes
    UsersDontMatch,
}

impl UserPermissionError
{
    pub fn code(&self) -> u16
    {
        match self {
            Self::NotOper | Self::NoPrivilege => 481,
            Self::ReadOnlyUmode => 501,
            Self::UsersDontMatch => 502,
        }
    }

    pub fn text(&self) -> &'static str
    {
        match self {
            Self::NotOper => "Permission Denied - You're not an IRC operator",
            Self::NoPrivilege => "Permission Denied - You do not have the correct IRC operator privileges",
            Self::ReadOnlyUmode => "That user mode cannot be set directly",
            Self::UsersDontMatch => "Can't change mode for other users",
        }
    }
}

#[derive(Debug, Error)]
pub enum PermissionError
{
    #[error("{}: {}", .0, .1.text())]
    Channel(ChannelName, ChannelPermissionError),
    #[error("{}", .0.text())]
    User(UserPermissionError),
    #[error("Internal error: {0}")]
    InternalError(#[from] LookupError),
}

impl PermissionError
{
    /// The numeric reply code reporting this error, if it is one users should see
    pub fn code(&self) -> Option<u16>
    {
        match self {
            Self::Channel(_, e) => Some(e.code()),
            Self::User(e) => Some(e.code()),
            Self::InternalError(_) => None,
        }
    }
}
