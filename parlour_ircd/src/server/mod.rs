//! The client protocol server and its event loop

use crate::client::*;
use crate::close_queue::CloseQueue;
use crate::command::{ClientCommand, CommandDispatcher};
use crate::connection_collection::ConnectionCollection;
use crate::dns::{HostLookupResult, HostResolver};
use crate::errors::*;
use crate::flood::FloodGovernor;
use crate::isupport::ISupportBuilder;
use crate::messages::*;

use parlour_listener::*;
use parlour_network::config::NetworkConfig;
use parlour_network::policy::PolicyService;
use parlour_network::prelude::*;
use parlour_network::network::state::ConnectionClassSet;
use parlour_network::utils;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc::{channel, unbounded_channel, Receiver, UnboundedReceiver};
use tokio::{select, time};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub mod config;
use config::ServerInfo;

mod connection_events;
mod housekeeping;
mod registration;
mod send_helpers;

/// Capacity of the channel carrying events from the listeners
const EVENT_QUEUE_SIZE: usize = 1024;
/// How often timeouts, keepalives and the membership audit run
const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(1);

/// What the process should do once the server loop exits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownAction
{
    Shutdown,
    Restart,
}

/// Last parameters of the RPL_MYINFO (004) numeric
struct MyInfo
{
    user_modes: String,
    chan_modes: String,
    chan_modes_with_a_parameter: String,
}

/// A client protocol server.
///
/// Owns the shared network state and every client connection. All protocol
/// processing happens on the task running [`run`](Self::run); the listener
/// and resolver tasks only feed it events.
pub struct Server
{
    info: ServerInfo,
    version: String,
    created: String,
    myinfo: MyInfo,
    pub(crate) isupport: ISupportBuilder,
    pub(crate) config: NetworkConfig,

    pub(crate) network: RwLock<Network>,
    pub(crate) policy: PolicyService,
    pub(crate) classes: ConnectionClassSet,

    pub(crate) connections: RwLock<ConnectionCollection>,
    close_queue: Arc<CloseQueue>,
    command_dispatcher: CommandDispatcher,
    pub(crate) flood: FloodGovernor,
    resolver: Option<HostResolver>,
    listeners: Mutex<ListenerCollection>,

    // These must be tokio Mutexes so that they can be held across await points
    connection_events: tokio::sync::Mutex<Receiver<ConnectionEvent>>,
    host_results: tokio::sync::Mutex<UnboundedReceiver<HostLookupResult>>,

    shutdown: Mutex<Option<ShutdownAction>>,
}

impl Server
{
    /// Construct a server. Must be called from within a Tokio runtime when
    /// hostname resolution is enabled.
    pub fn new(info: ServerInfo, config: NetworkConfig) -> Result<Self, ServerError>
    {
        let (event_send, event_recv) = channel(EVENT_QUEUE_SIZE);
        let (host_send, host_recv) = unbounded_channel();

        let catalog = Arc::new(ModeCatalog::standard());
        let classes = ConnectionClassSet::new(&config.classes, &config.default_class);
        let default_class = classes.default_class();

        let mut listeners = ListenerCollection::new(event_send);
        listeners.set_default_limits(QueueLimits { sendq: default_class.sendq, recvq: default_class.recvq });

        let resolver = if info.resolve_hostnames
        {
            Some(HostResolver::new(host_send, info.dns_workers, config.timeouts.dns)?)
        }
        else
        {
            None
        };

        let myinfo = MyInfo {
            user_modes: catalog.user_mode_letters(),
            chan_modes: catalog.channel_mode_letters(),
            chan_modes_with_a_parameter: catalog.channel_param_letters(),
        };

        Ok(Self {
            version: format!("parlour-{}", env!("CARGO_PKG_VERSION")),
            created: utils::format_timestamp(utils::now()),
            myinfo,
            isupport: ISupportBuilder::standard(&info.network_name, &catalog, &config.limits),
            network: RwLock::new(Network::new(catalog, config.limits.clone())),
            policy: PolicyService::standard(&config),
            classes,
            connections: RwLock::new(ConnectionCollection::new()),
            close_queue: Arc::new(CloseQueue::new()),
            command_dispatcher: CommandDispatcher::standard(),
            flood: FloodGovernor::new(config.flood),
            resolver,
            listeners: Mutex::new(listeners),
            connection_events: tokio::sync::Mutex::new(event_recv),
            host_results: tokio::sync::Mutex::new(host_recv),
            shutdown: Mutex::new(None),
            info,
            config,
        })
    }

    /// This server's name
    pub fn name(&self) -> &ServerName
    {
        &self.info.name
    }

    pub fn network_name(&self) -> &str
    {
        &self.info.network_name
    }

    pub fn version(&self) -> &str
    {
        &self.version
    }

    /// The command dispatcher, through which modules add or remove commands
    pub fn dispatcher(&self) -> &CommandDispatcher
    {
        &self.command_dispatcher
    }

    /// Read access to the network state
    pub fn network(&self) -> parking_lot::RwLockReadGuard<'_, Network>
    {
        self.network.read()
    }

    /// Install the certificate used by TLS listeners
    pub fn load_tls_settings(&self, settings: &TlsSettings) -> Result<(), ServerError>
    {
        Ok(self.listeners.lock().load_tls_settings(settings)?)
    }

    /// Start listening on an address. Returns the address actually bound.
    pub fn add_listener(&self, address: SocketAddr, conn_type: ConnectionType) -> Result<SocketAddr, ServerError>
    {
        let (_, bound) = self.listeners.lock().add_listener(address, conn_type)?;
        Ok(bound)
    }

    /// Find a client connection
    pub fn find_connection(&self, id: ConnectionId) -> Option<Arc<ClientConnection>>
    {
        self.connections.read().get(id)
    }

    /// Ask the event loop to stop at the end of its current iteration
    pub fn request_shutdown(&self, action: ShutdownAction)
    {
        tracing::info!(?action, "Shutdown requested");
        let mut shutdown = self.shutdown.lock();
        if shutdown.is_none()
        {
            *shutdown = Some(action);
        }
    }

    /// Run the server until a shutdown or restart is requested
    #[tracing::instrument(skip_all, fields(server = %self.info.name))]
    pub async fn run(&self) -> ShutdownAction
    {
        let mut connection_events = self.connection_events.lock().await;
        let mut host_results = self.host_results.lock().await;

        let mut flood_sweep = time::interval(self.config.flood.sweep_interval);
        let mut housekeeping = time::interval(HOUSEKEEPING_INTERVAL);

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut interrupted = false;

        tracing::info!("Server running");

        let action = loop {
            select! {
                Some(event) = connection_events.recv() => self.process_connection_event(event),
                Some(result) = host_results.recv() => self.process_host_result(result),
                _ = flood_sweep.tick() => self.release_deferred(),
                _ = housekeeping.tick() => {
                    self.check_timeouts();
                    self.audit_network();
                }
                _ = &mut ctrl_c, if !interrupted => {
                    interrupted = true;
                    self.request_shutdown(ShutdownAction::Shutdown);
                }
            }

            self.drain_closes();

            if let Some(action) = self.shutdown.lock().take()
            {
                break action;
            }
        };

        self.shut_down(action);
        action
    }

    /// Stop listening and close every connection
    fn shut_down(&self, action: ShutdownAction)
    {
        self.listeners.lock().shutdown();

        let reason = match action {
            ShutdownAction::Shutdown => "Server shutting down",
            ShutdownAction::Restart => "Server restarting",
        };
        let connections: Vec<_> = self.connections.read().iter().cloned().collect();
        for conn in connections
        {
            conn.close(reason);
        }
        self.drain_closes();
    }

    /// Parse and dispatch whatever complete messages a connection has
    /// buffered, until it runs out or the flood governor defers it
    pub(crate) fn process_connection(&self, conn: &Arc<ClientConnection>)
    {
        loop {
            if conn.is_closing()
            {
                conn.discard_received();
                break;
            }

            let message = match conn.next_message() {
                Ok(Some(message)) => message,
                Ok(None) => break,
                Err(crate::codec::CodecError::LineTooLong) => {
                    conn.numeric(numeric::InputTooLong::new());
                    continue;
                }
                Err(e) => {
                    conn.close(e);
                    break;
                }
            };

            let unthrottled = self.is_unthrottled(conn);
            if self.flood.check(conn.id(), &conn.flood, unthrottled) == crate::flood::FloodDecision::Defer
            {
                tracing::trace!(conn = %conn.id(), "Deferring flooding connection");
                conn.hold(message);
                break;
            }

            self.dispatch(conn, &message);
        }
    }

    fn is_unthrottled(&self, conn: &ClientConnection) -> bool
    {
        match conn.client_id() {
            Some(id) => self
                .network
                .read()
                .client(id)
                .map(|c| c.has_privilege(Privileges::UNTHROTTLED))
                .unwrap_or(false),
            None => false,
        }
    }

    fn dispatch(&self, conn: &Arc<ClientConnection>, message: &crate::client_message::ClientMessage)
    {
        let command = ClientCommand::new(self, conn, message);

        if let Err(e) = self.command_dispatcher.dispatch(&command)
        {
            if e.is_fatal()
            {
                tracing::error!(conn = %conn.id(), command = command.command(), "Command failed: {}", e);
                conn.close("Internal error");
            }
            else if let Some(numeric) = e.to_numeric()
            {
                conn.numeric(numeric);
            }
            else
            {
                tracing::warn!(conn = %conn.id(), command = command.command(), "Unreported command error: {}", e);
            }
        }
    }

    /// Hand every connection released by the flood sweep back to the loop
    fn release_deferred(&self)
    {
        for id in self.flood.sweep()
        {
            if let Some(conn) = self.find_connection(id)
            {
                self.process_connection(&conn);
            }
        }
    }

    /// Tear down every connection whose close was requested since the last pass
    pub(crate) fn drain_closes(&self)
    {
        // Tearing down may itself request closes, e.g. when a QUIT overflows
        // a peer's send queue
        while !self.close_queue.is_empty()
        {
            for id in self.close_queue.drain()
            {
                self.tear_down(id);
            }
        }
    }

    fn tear_down(&self, id: ConnectionId)
    {
        let removed = self.connections.write().remove(id);
        let conn = match removed {
            Some(conn) => conn,
            None => return,
        };

        let reason = conn.close_reason().unwrap_or("Connection closed").to_string();

        if let Some(client_id) = conn.client_id()
        {
            let mut network = self.network.write();
            match network.remove_client(client_id) {
                Ok(removed) => {
                    let quit = message::Quit::new(&removed.client.mask(), &reason);
                    self.send_to_clients(removed.peers.iter().copied(), &quit);
                }
                Err(e) => tracing::error!(conn = %id, "Failed to remove client: {}", e),
            }
        }

        let host = conn
            .hostname()
            .map(|h| h.to_string())
            .unwrap_or_else(|| conn.remote_addr().to_string());
        conn.send(message::Error::new(&format!("Closing Link: {} ({})", host, reason)));
        conn.advance_state(ClientState::Closed);
        conn.connection.close();
        conn.class().detach();
        self.flood.forget(id);

        tracing::info!(conn = %id, %reason, "Connection closed");
    }

    /// Send the registration welcome sequence
    fn send_welcome(&self, conn: &ClientConnection, nick: &Nickname)
    {
        conn.numeric(numeric::Welcome::new(&self.info.network_name, nick));
        conn.numeric(numeric::YourHostIs::new(&self.info.name, &self.version));
        conn.numeric(numeric::Created::new(&self.created));
        conn.numeric(numeric::MyInfo::new(
            &self.info.name,
            &self.version,
            &self.myinfo.user_modes,
            &self.myinfo.chan_modes,
            &self.myinfo.chan_modes_with_a_parameter,
        ));
        self.send_isupport(conn);
        self.send_motd(conn);
    }

    pub(crate) fn send_isupport(&self, conn: &ClientConnection)
    {
        for line in self.isupport.data()
        {
            conn.numeric(numeric::ISupport::new(line));
        }
    }

    pub(crate) fn send_motd(&self, conn: &ClientConnection)
    {
        if self.config.motd.is_empty()
        {
            conn.numeric(numeric::NoMotd::new());
            return;
        }

        conn.numeric(numeric::MotdStart::new(&self.info.name));
        for line in &self.config.motd
        {
            conn.numeric(numeric::Motd::new(line));
        }
        conn.numeric(numeric::EndOfMotd::new());
    }
}
