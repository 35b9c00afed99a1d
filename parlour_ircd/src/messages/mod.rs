use parlour_network::prelude::*;

#[macro_use]
mod define;

pub mod message;
pub mod numeric;

/// A numeric reply whose target nickname is not yet known
#[derive(Debug, Clone)]
pub struct UntargetedNumeric
{
    numeric_code: String,
    args: String,
}

impl UntargetedNumeric
{
    /// Create a new message
    pub fn new(numeric_code: impl ToString, args: String) -> Self
    {
        Self { numeric_code: numeric_code.to_string(), args }
    }

    /// The three-digit reply code
    pub fn code(&self) -> &str
    {
        &self.numeric_code
    }

    /// Provide the source and target information required to convert this to an [`OutboundClientMessage`]
    pub fn format_for(&self, source: &impl MessageSource, target: &impl MessageTarget) -> OutboundClientMessage
    {
        OutboundClientMessage::new(format!(":{} {} {} {}", source.format(), self.numeric_code, target.format(), self.args))
    }

    /// Provide the raw content in a situation where it can't be properly formatted
    pub fn debug_format(&self) -> String
    {
        format!("* {} * {}", self.numeric_code, self.args)
    }
}

/// A server-to-client protocol line, without its terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundClientMessage
{
    content: String,
}

impl OutboundClientMessage
{
    pub fn new(content: String) -> Self
    {
        Self { content }
    }

    pub fn as_str(&self) -> &str
    {
        &self.content
    }
}

impl std::fmt::Display for OutboundClientMessage
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result
    {
        f.write_str(&self.content)
    }
}

/// Trait describing an object to which a client protocol message can be sent
pub trait MessageSink
{
    /// Send a protocol message to this sink
    fn send(&self, msg: OutboundClientMessage);
}

/// Trait describing an object that can be the source of a client protocol message
pub trait MessageSource
{
    fn format(&self) -> String;
}

/// Trait describing an object that can be the target of a client protocol message
pub trait MessageTarget
{
    fn format(&self) -> String;
}

/// Placeholder target for a connection that has not chosen a nickname
pub struct UnknownTarget;

impl MessageSource for ServerName
{
    fn format(&self) -> String { self.to_string() }
}

impl MessageSource for Mask
{
    fn format(&self) -> String { self.to_string() }
}

impl MessageSource for state::Client
{
    fn format(&self) -> String { self.mask().to_string() }
}

impl MessageTarget for state::Client
{
    fn format(&self) -> String { self.nick.to_string() }
}

impl MessageTarget for state::Channel
{
    fn format(&self) -> String { self.name.to_string() }
}

impl MessageTarget for Nickname
{
    fn format(&self) -> String { self.to_string() }
}

impl MessageTarget for ChannelName
{
    fn format(&self) -> String { self.to_string() }
}

impl MessageTarget for UnknownTarget
{
    fn format(&self) -> String { "*".to_string() }
}

impl MessageTarget for String
{
    fn format(&self) -> String { self.clone() }
}

impl<T: MessageTarget> MessageTarget for Option<T>
{
    fn format(&self) -> String
    {
        match self {
            Some(t) => t.format(),
            None => UnknownTarget.format(),
        }
    }
}
