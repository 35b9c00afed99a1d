use crate::client_message::ClientMessage;
use crate::close_queue::CloseQueue;
use crate::codec::{encode_line, CodecError, LineCodec};
use crate::flood::FloodCursor;
use crate::messages::{MessageSink, OutboundClientMessage, UntargetedNumeric};

use parlour_listener::*;
use parlour_network::network::state::ConnectionClass;
use parlour_network::prelude::*;

use bitflags::bitflags;
use bytes::BytesMut;
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use tokio_util::codec::Decoder;

use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

bitflags! {
    /// Registration steps completed so far. A connection registers the
    /// moment all of them are set.
    pub struct RegistrationFlags: u8
    {
        const NICK   = 0x01;
        const USER   = 0x02;
        const HOST   = 0x04;
        /// Server-specific check, such as the PING cookie reply
        const CUSTOM = 0x08;
    }
}

/// Lifecycle of a client connection. States only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
#[repr(u8)]
pub enum ClientState
{
    Connecting = 0,
    Registering = 1,
    Registered = 2,
    Closing = 3,
    Closed = 4,
}

impl ClientState
{
    fn from_u8(v: u8) -> Self
    {
        match v {
            0 => Self::Connecting,
            1 => Self::Registering,
            2 => Self::Registered,
            3 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// Information received from a client connection that has not yet completed registration
#[derive(Debug, Default)]
pub struct PreClient
{
    pub user: OnceCell<Username>,
    pub realname: OnceCell<String>,
    /// Written once, either by the resolver or by the fallback to the address
    pub hostname: OnceCell<Hostname>,
}

/// What the idle check decided for one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleStatus
{
    Active,
    SendPing,
    TimedOut(u64),
}

struct ReceiveBuffer
{
    codec: LineCodec,
    data: BytesMut,
    /// A decoded message the flood governor did not admit yet
    held: Option<ClientMessage>,
}

/// A client protocol connection
pub struct ClientConnection
{
    /// The underlying network connection
    pub connection: Connection,
    /// Registration details received so far
    pub pre_client: PreClient,
    /// Flood governor position
    pub flood: FloodCursor,

    server_name: ServerName,
    client_id: OnceCell<ClientId>,
    nick: Mutex<Option<Nickname>>,
    registration: AtomicU8,
    state: AtomicU8,
    class: RwLock<Arc<ConnectionClass>>,
    receive: Mutex<ReceiveBuffer>,

    connected_at: Instant,
    last_activity: Mutex<Instant>,
    ping_sent: AtomicBool,
    spoof_cookie: Option<String>,

    close_reason: OnceCell<String>,
    close_queue: Arc<CloseQueue>,
}

impl ClientConnection
{
    /// Construct a `ClientConnection` from an underlying [`Connection`]
    pub fn new(conn: Connection,
               server_name: ServerName,
               class: Arc<ConnectionClass>,
               spoof_cookie: Option<String>,
               close_queue: Arc<CloseQueue>) -> Self
    {
        let now = Instant::now();
        let initial_flags = if spoof_cookie.is_some() { RegistrationFlags::empty() } else { RegistrationFlags::CUSTOM };

        Self {
            connection: conn,
            pre_client: PreClient::default(),
            flood: FloodCursor::new(),
            server_name,
            client_id: OnceCell::new(),
            nick: Mutex::new(None),
            registration: AtomicU8::new(initial_flags.bits()),
            state: AtomicU8::new(ClientState::Connecting as u8),
            class: RwLock::new(class),
            receive: Mutex::new(ReceiveBuffer {
                codec: LineCodec::new(),
                data: BytesMut::new(),
                held: None,
            }),
            connected_at: now,
            last_activity: Mutex::new(now),
            ping_sent: AtomicBool::new(false),
            spoof_cookie,
            close_reason: OnceCell::new(),
            close_queue,
        }
    }

    /// The connection ID
    pub fn id(&self) -> ConnectionId
    {
        self.connection.id
    }

    /// The remote IP address from which this client connected
    pub fn remote_addr(&self) -> IpAddr
    {
        self.connection.remote_addr
    }

    /// The network client ID, once registration has completed
    pub fn client_id(&self) -> Option<ClientId>
    {
        self.client_id.get().copied()
    }

    pub(crate) fn set_client_id(&self, id: ClientId)
    {
        if self.client_id.set(id).is_err()
        {
            tracing::error!(conn = %self.id(), "Client ID assigned twice");
        }
    }

    /// The nickname replies are addressed to
    pub fn nick(&self) -> Option<Nickname>
    {
        *self.nick.lock()
    }

    pub fn set_nick(&self, nick: Nickname)
    {
        *self.nick.lock() = Some(nick);
    }

    pub fn state(&self) -> ClientState
    {
        ClientState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move to a later lifecycle state. Returns false if the connection was
    /// already at or beyond `to`.
    pub fn advance_state(&self, to: ClientState) -> bool
    {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if current < to as u8 { Some(to as u8) } else { None }
            })
            .is_ok()
    }

    pub fn is_registered(&self) -> bool
    {
        self.state() == ClientState::Registered
    }

    pub fn is_closing(&self) -> bool
    {
        self.state() >= ClientState::Closing
    }

    pub fn registration_flags(&self) -> RegistrationFlags
    {
        RegistrationFlags::from_bits_truncate(self.registration.load(Ordering::Acquire))
    }

    /// Record a completed registration step. Returns true exactly when this
    /// call completed the set.
    pub fn set_registration_flag(&self, flag: RegistrationFlags) -> bool
    {
        let previous = RegistrationFlags::from_bits_truncate(self.registration.fetch_or(flag.bits(), Ordering::AcqRel));
        !previous.is_all() && (previous | flag).is_all()
    }

    /// Undo a registration step, e.g. when the chosen nickname was taken
    /// before registration could complete
    pub fn clear_registration_flag(&self, flag: RegistrationFlags)
    {
        self.registration.fetch_and(!flag.bits(), Ordering::AcqRel);
    }

    /// Publish the resolved hostname. Only the first call has any effect.
    pub fn set_hostname(&self, host: Hostname) -> bool
    {
        self.pre_client.hostname.set(host).is_ok()
    }

    pub fn hostname(&self) -> Option<Hostname>
    {
        self.pre_client.hostname.get().copied()
    }

    pub fn spoof_cookie(&self) -> Option<&str>
    {
        self.spoof_cookie.as_deref()
    }

    pub fn class(&self) -> Arc<ConnectionClass>
    {
        Arc::clone(&self.class.read())
    }

    /// Move to another connection class, applying its queue limits
    pub fn set_class(&self, class: Arc<ConnectionClass>)
    {
        self.connection.set_limits(class.sendq, class.recvq);
        *self.class.write() = class;
    }

    /// Add received bytes to the receive buffer
    pub fn append_received(&self, data: &[u8])
    {
        self.receive.lock().data.extend_from_slice(data);
        *self.last_activity.lock() = Instant::now();
        self.ping_sent.store(false, Ordering::Release);
        self.advance_state(ClientState::Registering);
    }

    /// Take the next complete message from the receive buffer, if there is one
    pub fn next_message(&self) -> Result<Option<ClientMessage>, CodecError>
    {
        let mut receive = self.receive.lock();
        if let Some(held) = receive.held.take()
        {
            return Ok(Some(held));
        }

        let ReceiveBuffer { codec, data, .. } = &mut *receive;
        let before = data.len();
        let result = codec.decode(data);
        let consumed = before - data.len();
        drop(receive);

        self.connection.release_received(consumed);
        result
    }

    /// Return a message the flood governor deferred, to be taken again first
    pub fn hold(&self, message: ClientMessage)
    {
        self.receive.lock().held = Some(message);
    }

    /// Drop anything buffered but not yet processed
    pub fn discard_received(&self)
    {
        let mut receive = self.receive.lock();
        let len = receive.data.len();
        receive.data.clear();
        receive.held = None;
        drop(receive);
        self.connection.release_received(len);
    }

    /// How long since the connection was accepted
    pub fn age(&self) -> Duration
    {
        self.connected_at.elapsed()
    }

    /// Decide whether this connection needs a keepalive ping, or has
    /// failed to answer one
    pub fn check_idle(&self, ping_frequency: Duration) -> IdleStatus
    {
        let idle = self.last_activity.lock().elapsed();
        if idle < ping_frequency
        {
            return IdleStatus::Active;
        }

        if !self.ping_sent.load(Ordering::Acquire)
        {
            self.ping_sent.store(true, Ordering::Release);
            IdleStatus::SendPing
        }
        else if idle >= ping_frequency * 2
        {
            IdleStatus::TimedOut(idle.as_secs())
        }
        else
        {
            IdleStatus::Active
        }
    }

    /// Request that this connection be closed. Processing stops at once;
    /// teardown happens when the server next drains its close queue. Only
    /// the first reason given is kept.
    pub fn close(&self, reason: impl ToString)
    {
        if self.close_reason.set(reason.to_string()).is_ok()
        {
            tracing::debug!(conn = %self.id(), reason = ?self.close_reason.get(), "Closing connection");
            self.advance_state(ClientState::Closing);
            self.close_queue.push(self.id());
        }
    }

    pub fn close_reason(&self) -> Option<&str>
    {
        self.close_reason.get().map(String::as_str)
    }

    /// Send a numeric reply, addressed to this connection's nickname or `*`
    pub fn numeric(&self, numeric: UntargetedNumeric)
    {
        self.send(numeric.format_for(&self.server_name, &self.nick()));
    }
}

impl MessageSink for ClientConnection
{
    fn send(&self, msg: OutboundClientMessage)
    {
        if self.state() == ClientState::Closed
        {
            return;
        }
        match self.connection.send(encode_line(msg.as_str())) {
            Ok(()) => (),
            Err(ConnectionError::SendQueueExceeded) => self.close("SendQ exceeded"),
            Err(e) => self.close(e),
        }
    }
}

impl std::fmt::Debug for ClientConnection
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result
    {
        f.debug_struct("ClientConnection")
            .field("id", &self.id())
            .field("state", &self.state())
            .field("client_id", &self.client_id.get())
            .finish()
    }
}
