//! Identifiers for listeners and the connections they accept

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(ListenerId, i64);

impl ListenerId
{
    pub fn new(id: i64) -> Self
    {
        Self(id)
    }
}

impl ConnectionId
{
    pub fn new(listener: ListenerId, local: i64) -> Self
    {
        Self(listener, local)
    }

    /// The listener that accepted this connection
    pub fn listener(&self) -> ListenerId
    {
        self.0
    }
}

impl std::fmt::Display for ListenerId
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result
    {
        write!(f, "listener:{}", self.0)
    }
}

impl std::fmt::Display for ConnectionId
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result
    {
        write!(f, "conn:{}/{}", (self.0).0, self.1)
    }
}

pub struct ListenerIdGenerator(AtomicI64);

impl ListenerIdGenerator
{
    pub fn new(start: i64) -> Self
    {
        Self(AtomicI64::new(start))
    }

    pub fn next(&self) -> ListenerId
    {
        ListenerId(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

/// Generates connection IDs scoped to one listener
pub struct ConnectionIdGenerator(ListenerId, AtomicI64);

impl ConnectionIdGenerator
{
    pub fn new(listener: ListenerId, start: i64) -> Self
    {
        Self(listener, AtomicI64::new(start))
    }

    pub fn next(&self) -> ConnectionId
    {
        ConnectionId(self.0, self.1.fetch_add(1, Ordering::Relaxed))
    }
}
