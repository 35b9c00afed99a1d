use super::*;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// A command handler function
pub type CommandHandler = fn(&ClientCommand) -> CommandResult;

/// When a command may be used, relative to registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationPhase
{
    /// Only before registration completes; afterwards the reply is 462
    PreRegistration,
    /// Only after registration completes; beforehand the reply is 451
    Registered,
    /// At any time
    Any,
}

/// A command handler registration
pub struct CommandRegistration
{
    pub handler: CommandHandler,
    pub min_params: usize,
    pub phase: RegistrationPhase,
    /// Name of the module that registered the command, for bulk removal
    pub module: &'static str,
    invocations: AtomicU64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError
{
    #[error("Command {0} is already registered")]
    Duplicate(String),
}

/// A command dispatcher. Collects registered command handlers and allows
/// lookup by command name.
#[derive(Default)]
pub struct CommandDispatcher
{
    handlers: RwLock<HashMap<String, CommandRegistration>>,
}

impl CommandDispatcher
{
    /// Construct an empty `CommandDispatcher`
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Construct a `CommandDispatcher` with every built-in command registered
    pub fn standard() -> Self
    {
        let ret = Self::new();
        handlers::register_all(&ret);
        ret
    }

    /// Register a handler for a command verb. Verbs are case-insensitive.
    pub fn register(&self,
                    module: &'static str,
                    command: &str,
                    min_params: usize,
                    phase: RegistrationPhase,
                    handler: CommandHandler) -> Result<(), DispatchError>
    {
        let verb = command.to_ascii_uppercase();
        let mut handlers = self.handlers.write();
        if handlers.contains_key(&verb)
        {
            return Err(DispatchError::Duplicate(verb));
        }

        tracing::trace!(%verb, module, "Registering command");
        handlers.insert(verb, CommandRegistration {
            handler,
            min_params,
            phase,
            module,
            invocations: AtomicU64::new(0),
        });
        Ok(())
    }

    /// Remove every command registered by the named module. Returns the
    /// number of commands removed.
    pub fn unregister_module(&self, module: &str) -> usize
    {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|_, reg| reg.module != module);
        before - handlers.len()
    }

    /// Is a handler registered for this verb?
    pub fn is_registered(&self, command: &str) -> bool
    {
        self.handlers.read().contains_key(&command.to_ascii_uppercase())
    }

    /// How many times the command's handler has been invoked
    pub fn invocation_count(&self, command: &str) -> Option<u64>
    {
        self.handlers
            .read()
            .get(&command.to_ascii_uppercase())
            .map(|reg| reg.invocations.load(Ordering::Relaxed))
    }

    /// Look up and execute the handler function for a given command.
    ///
    /// The registration phase and parameter count are checked before the
    /// handler runs; a handler that is refused is not counted as invoked.
    pub fn dispatch(&self, cmd: &ClientCommand) -> CommandResult
    {
        let handler = {
            let handlers = self.handlers.read();
            let reg = handlers
                .get(cmd.command())
                .ok_or_else(|| CommandError::CommandNotFound(cmd.command().to_string()))?;

            let registered = cmd.connection.is_registered();
            match reg.phase {
                RegistrationPhase::PreRegistration if registered => return Err(CommandError::AlreadyRegistered),
                RegistrationPhase::Registered if !registered => return Err(CommandError::NotRegistered),
                _ => (),
            }

            if cmd.args().len() < reg.min_params
            {
                return Err(CommandError::NotEnoughParameters(cmd.command().to_string()));
            }

            reg.invocations.fetch_add(1, Ordering::Relaxed);
            reg.handler
        };

        handler(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &ClientCommand) -> CommandResult {
        Ok(())
    }

    #[test]
    fn verbs_are_case_insensitive() {
        let dispatcher = CommandDispatcher::new();
        dispatcher.register("test", "frob", 0, RegistrationPhase::Any, noop).unwrap();

        assert!(dispatcher.is_registered("FROB"));
        assert!(dispatcher.is_registered("Frob"));
        assert_eq!(dispatcher.invocation_count("frob"), Some(0));
        assert_eq!(dispatcher.invocation_count("other"), None);
    }

    #[test]
    fn duplicate_registration_fails() {
        let dispatcher = CommandDispatcher::new();
        dispatcher.register("one", "FROB", 0, RegistrationPhase::Any, noop).unwrap();

        let result = dispatcher.register("two", "frob", 1, RegistrationPhase::Registered, noop);
        assert_eq!(result, Err(DispatchError::Duplicate("FROB".to_string())));
    }

    #[test]
    fn unregister_removes_whole_module() {
        let dispatcher = CommandDispatcher::new();
        dispatcher.register("extra", "FROB", 0, RegistrationPhase::Any, noop).unwrap();
        dispatcher.register("extra", "TWIDDLE", 0, RegistrationPhase::Any, noop).unwrap();
        dispatcher.register("keep", "POKE", 0, RegistrationPhase::Any, noop).unwrap();

        assert_eq!(dispatcher.unregister_module("extra"), 2);
        assert!(!dispatcher.is_registered("FROB"));
        assert!(!dispatcher.is_registered("TWIDDLE"));
        assert!(dispatcher.is_registered("POKE"));

        assert_eq!(dispatcher.unregister_module("extra"), 0);
        dispatcher.register("again", "FROB", 0, RegistrationPhase::Any, noop).unwrap();
    }

    #[test]
    fn standard_commands() {
        let dispatcher = CommandDispatcher::standard();

        for verb in ["NICK", "USER", "PING", "PONG", "QUIT", "JOIN", "PART", "PRIVMSG", "NOTICE", "TOPIC",
                     "MODE", "KICK", "INVITE", "NAMES", "AWAY", "MOTD", "VERSION", "ISUPPORT", "OPER",
                     "KILL", "DIE", "RESTART"]
        {
            assert!(dispatcher.is_registered(verb), "{} not registered", verb);
        }

        assert_eq!(dispatcher.unregister_module("oper"), 3);
        assert!(!dispatcher.is_registered("KILL"));
        assert!(dispatcher.is_registered("OPER"));
    }
}
