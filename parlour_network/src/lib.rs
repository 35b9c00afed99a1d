//! Shared chat state for the parlour server.
//!
//! This crate holds everything that describes *who* is connected and *where*
//! they are: validated names, identity masks, the mode catalog, client and
//! channel records, and the [`Network`](network::Network) container that keeps
//! the two sides of every channel membership in step. The policy services in
//! [`policy`] decide whether a requested action is permitted against that
//! state.

pub mod prelude;

pub mod id;
pub mod validated;
pub mod modes;

pub mod config;

pub mod network;

pub mod policy;

pub mod types
{
    mod pattern;
    pub use pattern::*;

    mod mask;
    pub use mask::*;
}

pub mod utils;
