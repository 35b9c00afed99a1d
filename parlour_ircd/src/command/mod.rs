//! Client command processing.
//!
//! Each inbound message becomes a [`ClientCommand`], which the
//! [`CommandDispatcher`] routes to the handler registered for its verb.

use crate::client::ClientConnection;
use crate::client_message::ClientMessage;
use crate::messages::{MessageSink, OutboundClientMessage, UntargetedNumeric};
use crate::server::Server;

use parlour_network::prelude::*;

use std::sync::Arc;

mod error;
pub use error::*;

mod dispatcher;
pub use dispatcher::*;

mod handlers
{
    // These are here so the handler modules can import everything easily
    use super::*;
    use crate::client::RegistrationFlags;
    use crate::messages::{message, numeric};
    use parlour_network::policy::*;
    use parlour_network::utils::OrLog;

    mod nick;
    mod user;
    mod ping;
    mod quit;
    mod join;
    mod part;
    mod message_handlers;
    mod topic;
    mod mode;
    mod kick;
    mod invite;
    mod names;
    mod away;
    mod info;
    mod oper;
    mod kill;
    mod server_control;

    /// Register every built-in command
    pub(super) fn register_all(dispatcher: &CommandDispatcher)
    {
        use RegistrationPhase::*;

        let core: [(&str, usize, RegistrationPhase, CommandHandler); 19] = [
            ("NICK", 0, Any, nick::handle_nick),
            ("USER", 4, PreRegistration, user::handle_user),
            ("PING", 1, Any, ping::handle_ping),
            ("PONG", 0, Any, ping::handle_pong),
            ("QUIT", 0, Any, quit::handle_quit),
            ("JOIN", 1, Registered, join::handle_join),
            ("PART", 1, Registered, part::handle_part),
            ("PRIVMSG", 0, Registered, message_handlers::handle_privmsg),
            ("NOTICE", 0, Registered, message_handlers::handle_notice),
            ("TOPIC", 1, Registered, topic::handle_topic),
            ("MODE", 1, Registered, mode::handle_mode),
            ("KICK", 2, Registered, kick::handle_kick),
            ("INVITE", 2, Registered, invite::handle_invite),
            ("NAMES", 0, Registered, names::handle_names),
            ("AWAY", 0, Registered, away::handle_away),
            ("MOTD", 0, Registered, info::handle_motd),
            ("VERSION", 0, Registered, info::handle_version),
            ("ISUPPORT", 0, Registered, info::handle_isupport),
            ("OPER", 2, Registered, oper::handle_oper),
        ];
        for (command, min_params, phase, handler) in core
        {
            dispatcher.register("core", command, min_params, phase, handler).or_log("registering core commands");
        }

        let oper: [(&str, usize, RegistrationPhase, CommandHandler); 3] = [
            ("KILL", 1, Registered, kill::handle_kill),
            ("DIE", 0, Registered, server_control::handle_die),
            ("RESTART", 0, Registered, server_control::handle_restart),
        ];
        for (command, min_params, phase, handler) in oper
        {
            dispatcher.register("oper", command, min_params, phase, handler).or_log("registering operator commands");
        }
    }

    /// The registered client issuing a command
    fn source_client<'a>(network: &'a Network, cmd: &ClientCommand) -> Result<&'a state::Client, CommandError>
    {
        Ok(network.client(cmd.client_id()?)?)
    }

    /// Report a failure for one target of a multi-target command without
    /// abandoning the remaining targets
    fn report(cmd: &ClientCommand, result: CommandResult) -> CommandResult
    {
        match result {
            Err(e) if !e.is_fatal() => {
                if let Some(numeric) = e.to_numeric()
                {
                    cmd.numeric(numeric);
                }
                Ok(())
            }
            other => other,
        }
    }

    /// Attach the target's nickname to membership denials about a target
    fn target_error(e: PermissionError, target: &Nickname) -> CommandError
    {
        match e {
            PermissionError::Channel(chan, ChannelPermissionError::UserNotOnChannel) => CommandError::membership(target, &chan, false),
            PermissionError::Channel(chan, ChannelPermissionError::UserOnChannel) => CommandError::membership(target, &chan, true),
            other => other.into(),
        }
    }

    /// Shorten free text to at most `max` bytes without splitting a character
    pub(super) fn truncate(text: &str, max: usize) -> &str
    {
        if text.len() <= max
        {
            return text;
        }
        let mut end = max;
        while !text.is_char_boundary(end)
        {
            end -= 1;
        }
        &text[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::handlers::truncate;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello world", 5), "hello");
        // 'é' is two bytes; cutting inside it backs off to the character before
        assert_eq!(truncate("café", 4), "caf");
        assert_eq!(truncate("", 0), "");
    }
}

/// A client command to be handled
pub struct ClientCommand<'a>
{
    /// The server receiving the command
    pub server: &'a Server,
    /// The connection from which it was received
    pub connection: &'a Arc<ClientConnection>,
    /// The message as received
    pub message: &'a ClientMessage,
    /// The command verb, in upper case
    command: String,
}

impl<'a> ClientCommand<'a>
{
    pub fn new(server: &'a Server, connection: &'a Arc<ClientConnection>, message: &'a ClientMessage) -> Self
    {
        Self {
            server,
            connection,
            message,
            command: message.command.to_ascii_uppercase(),
        }
    }

    /// The command verb, in upper case
    pub fn command(&self) -> &str
    {
        &self.command
    }

    pub fn args(&self) -> &[String]
    {
        &self.message.args
    }

    /// The argument at `index`, if present
    pub fn arg(&self, index: usize) -> Option<&str>
    {
        self.message.args.get(index).map(String::as_str)
    }

    /// The argument at `index`, which the dispatcher's parameter count
    /// check should already have guaranteed
    pub fn required_arg(&self, index: usize) -> Result<&str, CommandError>
    {
        self.arg(index).ok_or_else(|| CommandError::NotEnoughParameters(self.command.clone()))
    }

    /// The client ID of the source, which must be registered
    pub fn client_id(&self) -> Result<ClientId, CommandError>
    {
        self.connection.client_id().ok_or(CommandError::NotRegistered)
    }

    /// Send a numeric reply to the source
    pub fn numeric(&self, numeric: UntargetedNumeric)
    {
        self.connection.numeric(numeric);
    }

    /// Send a message to the source
    pub fn send(&self, msg: OutboundClientMessage)
    {
        self.connection.send(msg);
    }
}

/// Parse a nickname argument
pub(crate) fn parse_nick(arg: &str) -> Result<Nickname, CommandError>
{
    arg.parse::<Nickname>().map_err(|_| CommandError::InvalidNick(arg.to_string()))
}

/// Parse a channel name argument
pub(crate) fn parse_channel_name(arg: &str) -> Result<ChannelName, CommandError>
{
    arg.parse::<ChannelName>().map_err(|_| CommandError::InvalidChannelName(arg.to_string()))
}

/// Does this argument name a channel rather than a user?
pub(crate) fn is_channel_name(arg: &str) -> bool
{
    arg.starts_with('#') || arg.starts_with('&')
}
