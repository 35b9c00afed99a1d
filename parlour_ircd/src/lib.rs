#![allow(rustdoc::private_intra_doc_links)]

//! IRC client server logic.
//!
//! This crate primarily exists to support the [`Server`](server::Server) type,
//! which accepts client connections from `parlour_listener`, turns their bytes
//! into protocol messages and applies them to a `parlour_network::Network`.
//!
//! # Command Handling
//!
//! Basic parsing of client lines is in the [`client_message`] module, with
//! framing of the byte stream in [`codec`].
//!
//! Command handlers are registered at startup with the [`CommandDispatcher`](command::CommandDispatcher),
//! grouped by module so that a group can be removed again as a unit. To add a
//! new command, create a module under `command/handlers` and register it in
//! `register_all`; see one of the existing handlers for examples.
//!
//! Handlers run synchronously on the server's event loop. A handler that
//! changes network state takes the network write lock, makes the change and
//! notifies the affected clients while still holding it, so that every client
//! sees changes in the order they were applied.
//!
//! # Connection lifecycle
//!
//! New connections are admitted into a connection class, sent a spoof-check
//! cookie if configured, and have their hostname looked up. Once the nickname,
//! username, hostname and cookie steps are complete the client is added to the
//! network and welcomed. Closing a connection only queues it; teardown happens
//! at the end of each pass of the event loop, so handlers never observe a
//! half-removed client.

mod client_message;
mod codec;
mod flood;
mod messages;
mod isupport;
mod dns;

mod client;
mod close_queue;
mod connection_collection;

pub mod command;
pub mod errors;
pub mod server;
pub mod tracing_config;
pub mod run;
