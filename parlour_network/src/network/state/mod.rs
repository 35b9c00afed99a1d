//! Raw state objects stored by the [`Network`](super::Network)

mod client;
pub use client::*;

mod channel;
pub use channel::*;

mod connection_class;
pub use connection_class::*;
