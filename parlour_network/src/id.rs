//! Object identifiers for network state.
//!
//! State objects refer to each other by ID rather than by reference, so that
//! the [`Network`](crate::network::Network) can be mutated through a single
//! lock without tangling borrows between clients and channels.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

macro_rules! object_ids {
    ($($name:ident => $generator:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            pub struct $name(i64);

            impl $name
            {
                pub fn new(id: i64) -> Self
                {
                    Self(id)
                }

                pub fn local(&self) -> i64
                {
                    self.0
                }
            }

            impl std::fmt::Display for $name
            {
                fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result
                {
                    write!(f, "{}:{}", stringify!($name), self.0)
                }
            }

            /// Sequential generator for
            #[doc = concat!("[`", stringify!($name), "`]")]
            /// values
            #[derive(Debug)]
            pub struct $generator(AtomicI64);

            impl $generator
            {
                pub fn new(start: i64) -> Self
                {
                    Self(AtomicI64::new(start))
                }

                pub fn next(&self) -> $name
                {
                    $name(self.0.fetch_add(1, Ordering::Relaxed))
                }
            }
        )*
    };
}

object_ids! {
    ClientId => ClientIdGenerator,
    ChannelId => ChannelIdGenerator,
}

/// Generates IDs for all the object types held in the network state
#[derive(Debug)]
pub struct ObjectIdGenerator
{
    clients: ClientIdGenerator,
    channels: ChannelIdGenerator,
}

impl ObjectIdGenerator
{
    pub fn new() -> Self
    {
        Self {
            clients: ClientIdGenerator::new(1),
            channels: ChannelIdGenerator::new(1),
        }
    }

    pub fn next_client(&self) -> ClientId
    {
        self.clients.next()
    }

    pub fn next_channel(&self) -> ChannelId
    {
        self.channels.next()
    }
}

impl Default for ObjectIdGenerator
{
    fn default() -> Self
    {
        Self::new()
    }
}
