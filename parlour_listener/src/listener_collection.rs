use crate::*;
use crate::internal::*;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::mpsc::Sender;

pub use crate::internal::QueueLimits;

/// The set of listening sockets, and the connections they accept.
///
/// All events for all listeners and connections are delivered to the single
/// channel supplied at construction.
pub struct ListenerCollection
{
    listener_id_generator: ListenerIdGenerator,
    event_channel: Sender<ConnectionEvent>,
    listeners: HashMap<ListenerId, Listener>,
    tls_config: Option<Arc<rustls::ServerConfig>>,
    default_limits: QueueLimits,
}

impl ListenerCollection
{
    pub fn new(event_channel: Sender<ConnectionEvent>) -> Self
    {
        Self {
            listener_id_generator: ListenerIdGenerator::new(1),
            event_channel,
            listeners: HashMap::new(),
            tls_config: None,
            default_limits: QueueLimits { sendq: 64 * 1024, recvq: 8 * 1024 },
        }
    }

    /// Set the queue caps given to newly accepted connections
    pub fn set_default_limits(&mut self, limits: QueueLimits)
    {
        self.default_limits = limits;
    }

    /// Install the certificate and key used by TLS listeners. Listeners
    /// already running keep the configuration they started with.
    pub fn load_tls_settings(&mut self, settings: &TlsSettings) -> Result<(), ListenerError>
    {
        self.tls_config = Some(settings.server_config()?);
        Ok(())
    }

    /// Bind a new listening socket and start accepting connections on it.
    ///
    /// Must be called from within a Tokio runtime. Returns the new listener's
    /// ID and the address actually bound, which differs from `address` when
    /// binding to port zero.
    pub fn add_listener(&mut self, address: SocketAddr, conn_type: ConnectionType) -> Result<(ListenerId, SocketAddr), ListenerError>
    {
        let internal_type = match conn_type {
            ConnectionType::Clear => InternalConnectionType::Clear,
            ConnectionType::Tls => InternalConnectionType::Tls(
                self.tls_config.clone().ok_or(ListenerError::NoTlsConfig)?
            ),
        };

        let std_listener = std::net::TcpListener::bind(address)?;
        std_listener.set_nonblocking(true)?;
        let bound = std_listener.local_addr()?;
        let listener = tokio::net::TcpListener::from_std(std_listener)?;

        let id = self.listener_id_generator.next();
        tracing::info!(%id, %bound, ?conn_type, "Listening");

        self.listeners.insert(id, Listener::new(id, listener, internal_type, self.default_limits, self.event_channel.clone()));
        Ok((id, bound))
    }

    /// Stop accepting connections on one listener. Connections it already
    /// accepted are unaffected.
    pub fn close_listener(&mut self, id: ListenerId)
    {
        self.listeners.remove(&id);
    }

    /// Stop accepting connections on every listener
    pub fn shutdown(&mut self)
    {
        self.listeners.clear();
    }
}
