//! Client connection handling for the parlour server.
//!
//! This crate owns every accepted TCP socket. Each connection is driven by
//! its own task, which performs non-blocking reads and writes as the socket
//! becomes ready, unwraps and wraps TLS records where the listener requires
//! it, and enforces the per-connection send and receive queue caps. The
//! server sees only [`ConnectionEvent`]s carrying raw received bytes, and
//! talks back through the [`Connection`] handle.

pub mod id;
pub use id::*;

pub mod error;
pub use error::*;

mod protocols;
pub use protocols::*;

mod connection;
pub use connection::*;

mod listener_collection;
pub use listener_collection::*;

pub mod tls;

mod internal
{
    pub mod protocols;
    pub use protocols::*;
    pub mod connection_task;
    pub use connection_task::*;
    pub mod listener;
    pub use listener::*;
}
