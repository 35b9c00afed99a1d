use crate::messages::{numeric, UntargetedNumeric};

use parlour_network::policy::PermissionError;
use parlour_network::prelude::*;

/// An error that may occur during command processing.
///
/// Every variant except `UnderlyingError` is reported to the client as a
/// numeric reply and processing continues. `UnderlyingError` is reserved for
/// failures the connection cannot recover from; the connection is closed.
#[derive(Debug)]
pub enum CommandError
{
    /// Something returned an `Error` that we don't know how to handle
    UnderlyingError(anyhow::Error),
    /// The command wasn't recognised
    CommandNotFound(String),
    /// Not enough arguments were provided to the named command
    NotEnoughParameters(String),
    /// The command may only be used after registration
    NotRegistered,
    /// The command may only be used before registration
    AlreadyRegistered,
    /// A required object wasn't found in the network state
    LookupError(LookupError),
    /// A nickname parameter wasn't a valid nick
    InvalidNick(String),
    /// A channel name parameter wasn't a valid channel name
    InvalidChannelName(String),
    /// A permission error was encountered
    Permission(PermissionError),
    /// The command couldn't be processed successfully; the provided
    /// numeric will be sent to the client to notify them
    Numeric(UntargetedNumeric),
}

/// The result of a command handler
pub type CommandResult = Result<(), CommandError>;

impl CommandError
{
    pub fn unknown(desc: impl std::fmt::Display) -> Self
    {
        Self::UnderlyingError(anyhow::anyhow!("{}", desc))
    }

    /// Build the permission error reported when a member mode, kick or
    /// invite names a target whose membership is wrong, so the reply can
    /// carry the target's nickname
    pub fn membership(target: &Nickname, channel: &ChannelName, on_channel: bool) -> Self
    {
        if on_channel
        {
            numeric::UserOnChannel::new(target, channel).into()
        }
        else
        {
            numeric::UserNotOnChannel::new(target, channel).into()
        }
    }

    /// Should the connection be closed after reporting this error?
    pub fn is_fatal(&self) -> bool
    {
        matches!(self, Self::UnderlyingError(_))
    }

    /// The numeric reply to send to the client, if any
    pub fn to_numeric(&self) -> Option<UntargetedNumeric>
    {
        match self {
            Self::UnderlyingError(_) => None,
            Self::CommandNotFound(cmd) => Some(numeric::UnknownCommand::new(cmd)),
            Self::NotEnoughParameters(cmd) => Some(numeric::NotEnoughParameters::new(cmd)),
            Self::NotRegistered => Some(numeric::NotRegistered::new()),
            Self::AlreadyRegistered => Some(numeric::AlreadyRegistered::new()),
            Self::LookupError(e) => match e {
                LookupError::NoSuchNick(n) => Some(numeric::NoSuchTarget::new(n)),
                LookupError::NoSuchChannelName(n) => Some(numeric::NoSuchChannel::new(n)),
                LookupError::NotAMember(_, chan) => Some(numeric::permission_denied(
                    442,
                    chan.as_str(),
                    "You're not on that channel",
                )),
                LookupError::NoSuchClient(_) | LookupError::NoSuchChannel(_) => None,
            },
            Self::InvalidNick(n) => Some(numeric::ErroneousNickname::new(n)),
            Self::InvalidChannelName(n) => Some(numeric::InvalidChannelName::new(n)),
            Self::Permission(e) => match e {
                PermissionError::Channel(chan, err) => Some(numeric::permission_denied(err.code(), chan.as_str(), err.text())),
                PermissionError::User(err) => Some(numeric::permission_denied(err.code(), "", err.text())),
                PermissionError::InternalError(_) => None,
            },
            Self::Numeric(n) => Some(n.clone()),
        }
    }
}

impl std::fmt::Display for CommandError
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result
    {
        match self {
            Self::UnderlyingError(e) => write!(f, "{}", e),
            Self::CommandNotFound(c) => write!(f, "Unknown command {}", c),
            Self::NotEnoughParameters(c) => write!(f, "Not enough parameters for {}", c),
            Self::NotRegistered => f.write_str("Not registered"),
            Self::AlreadyRegistered => f.write_str("Already registered"),
            Self::LookupError(e) => write!(f, "{}", e),
            Self::InvalidNick(n) => write!(f, "Invalid nickname {}", n),
            Self::InvalidChannelName(n) => write!(f, "Invalid channel name {}", n),
            Self::Permission(e) => write!(f, "{}", e),
            Self::Numeric(n) => f.write_str(&n.debug_format()),
        }
    }
}

impl From<ValidationError> for CommandError
{
    fn from(e: ValidationError) -> Self
    {
        match e {
            ValidationError::NickInUse(n) => numeric::NicknameInUse::new(&n).into(),
            ValidationError::ObjectNotFound(le) => le.into(),
            ValidationError::InvalidName(e) if e.kind == "Nickname" => Self::InvalidNick(e.value),
            ValidationError::InvalidName(e) if e.kind == "ChannelName" => Self::InvalidChannelName(e.value),
            ValidationError::InvalidName(e) => Self::unknown(e),
        }
    }
}

impl From<PermissionError> for CommandError
{
    fn from(e: PermissionError) -> Self
    {
        Self::Permission(e)
    }
}

impl From<LookupError> for CommandError
{
    fn from(e: LookupError) -> Self
    {
        Self::LookupError(e)
    }
}

impl From<UntargetedNumeric> for CommandError
{
    fn from(n: UntargetedNumeric) -> Self
    {
        Self::Numeric(n)
    }
}

impl From<anyhow::Error> for CommandError
{
    fn from(e: anyhow::Error) -> Self
    {
        Self::UnderlyingError(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlour_network::policy::{ChannelPermissionError, UserPermissionError};
    use std::str::FromStr;

    fn code(e: CommandError) -> Option<String> {
        e.to_numeric().map(|n| n.code().to_string())
    }

    #[test]
    fn numerics_for_errors() {
        let chan = ChannelName::from_str("#test").unwrap();

        assert_eq!(code(CommandError::CommandNotFound("FOO".into())).as_deref(), Some("421"));
        assert_eq!(code(CommandError::NotEnoughParameters("JOIN".into())).as_deref(), Some("461"));
        assert_eq!(code(CommandError::NotRegistered).as_deref(), Some("451"));
        assert_eq!(code(CommandError::AlreadyRegistered).as_deref(), Some("462"));
        assert_eq!(code(LookupError::NoSuchNick("bob".into()).into()).as_deref(), Some("401"));
        assert_eq!(code(LookupError::NoSuchChannelName("#x".into()).into()).as_deref(), Some("403"));
        assert_eq!(
            code(PermissionError::Channel(chan, ChannelPermissionError::BadChannelKey).into()).as_deref(),
            Some("475")
        );
        assert_eq!(code(PermissionError::User(UserPermissionError::NotOper).into()).as_deref(), Some("481"));
    }

    #[test]
    fn underlying_errors_are_fatal() {
        let e = CommandError::unknown("broken");
        assert!(e.is_fatal());
        assert!(e.to_numeric().is_none());
        assert!(!CommandError::NotRegistered.is_fatal());
    }

    #[test]
    fn membership_errors_name_target() {
        let server = ServerName::from_str("irc.example").unwrap();
        let me = Nickname::from_str("alice").unwrap();
        let target = Nickname::from_str("bob").unwrap();
        let chan = ChannelName::from_str("#test").unwrap();

        let n = CommandError::membership(&target, &chan, false).to_numeric().unwrap();
        assert_eq!(n.format_for(&server, &me).as_str(), ":irc.example 441 alice bob #test :They aren't on that channel");

        let n = CommandError::membership(&target, &chan, true).to_numeric().unwrap();
        assert_eq!(n.code(), "443");
    }
}
