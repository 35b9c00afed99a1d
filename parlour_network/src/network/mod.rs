//! The shared client and channel state container

use crate::prelude::*;
use crate::config::ServerLimits;

use std::collections::HashMap;
use std::sync::Arc;

pub mod errors;
pub mod state;

mod accessors;

mod client_state;
pub use client_state::*;

mod channel_state;
pub use channel_state::*;

mod audit;
pub use audit::*;

/// Stores all registered clients and all channels.
///
/// A `Network` holds no locks of its own; the server wraps it in a single
/// reader/writer lock, so every mutating method here is applied atomically
/// with respect to readers. Every method that changes channel membership
/// updates both the client's channel set and the channel's member map before
/// returning.
#[derive(Debug)]
pub struct Network
{
    clients: HashMap<ClientId, state::Client>,
    nick_index: HashMap<Nickname, ClientId>,
    channels: HashMap<ChannelId, state::Channel>,
    channel_index: HashMap<ChannelName, ChannelId>,

    ids: ObjectIdGenerator,
    catalog: Arc<ModeCatalog>,
    limits: ServerLimits,
}

impl Network
{
    /// Create an empty network using the given (frozen) mode catalog
    pub fn new(catalog: Arc<ModeCatalog>, limits: ServerLimits) -> Self
    {
        Self {
            clients: HashMap::new(),
            nick_index: HashMap::new(),
            channels: HashMap::new(),
            channel_index: HashMap::new(),
            ids: ObjectIdGenerator::new(),
            catalog,
            limits,
        }
    }
}
