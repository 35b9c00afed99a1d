//! A non-blocking TLS session, independent of any socket.
//!
//! [`TlsAdapter`] is fed ciphertext as it arrives and yields plaintext; any
//! records it needs to send (handshake messages, encrypted application data,
//! alerts) are collected with [`TlsAdapter::take_output`] and written by the
//! caller in whatever way suits its I/O model. This keeps the record layer
//! testable by pumping bytes between two in-memory endpoints.

use crate::ConnectionError;

use bytes::{Bytes, BytesMut};
use rustls::{ServerConfig, ServerConnection};
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsState
{
    Handshaking,
    Established,
    /// close_notify has been queued; no more plaintext is accepted
    Closing,
    Closed,
}

/// What the session needs next, as reported by [`TlsAdapter::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsStatus
{
    /// Nothing can progress until more ciphertext arrives
    NeedInput,
    /// Records are waiting to be written; call `take_output`
    NeedOutput,
    /// The handshake is complete and no output is pending
    Established,
    /// The session has shut down
    Closed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TlsError
{
    #[error("TLS protocol error: {0}")]
    Protocol(String),
    /// Decrypted plaintext would not fit in the receive queue
    #[error("receive queue exceeded")]
    ReceiveQueueExceeded,
    #[error("TLS session closed")]
    Closed,
}

impl From<rustls::Error> for TlsError
{
    fn from(e: rustls::Error) -> Self
    {
        Self::Protocol(e.to_string())
    }
}

impl From<std::io::Error> for TlsError
{
    fn from(e: std::io::Error) -> Self
    {
        Self::Protocol(e.to_string())
    }
}

impl From<TlsError> for ConnectionError
{
    fn from(e: TlsError) -> Self
    {
        match e {
            TlsError::ReceiveQueueExceeded => ConnectionError::ReadQueueExceeded,
            TlsError::Closed => ConnectionError::Closed,
            TlsError::Protocol(msg) => ConnectionError::TlsError(msg),
        }
    }
}

/// Server side of one TLS session
pub struct TlsAdapter
{
    conn: ServerConnection,
    state: TlsState,
    /// Plaintext written before the handshake finished, in order
    pending_plaintext: VecDeque<Bytes>,
}

impl TlsAdapter
{
    pub fn new(config: Arc<ServerConfig>) -> Result<Self, TlsError>
    {
        let mut conn = ServerConnection::new(config)?;
        // Send queue limits are enforced above this layer
        conn.set_buffer_limit(None);

        Ok(Self {
            conn,
            state: TlsState::Handshaking,
            pending_plaintext: VecDeque::new(),
        })
    }

    pub fn state(&self) -> TlsState
    {
        self.state
    }

    pub fn is_established(&self) -> bool
    {
        self.state == TlsState::Established
    }

    /// Feed received ciphertext into the session and return any plaintext it
    /// yields.
    ///
    /// If the plaintext would exceed `headroom` bytes, nothing is returned and
    /// the error is [`TlsError::ReceiveQueueExceeded`].
    pub fn receive(&mut self, mut ciphertext: &[u8], headroom: usize) -> Result<BytesMut, TlsError>
    {
        if self.state == TlsState::Closed
        {
            return Err(TlsError::Closed);
        }

        let mut plaintext = BytesMut::new();

        while !ciphertext.is_empty()
        {
            if self.conn.read_tls(&mut ciphertext)? == 0
            {
                break;
            }
            let io_state = self.conn.process_new_packets()?;

            let available = io_state.plaintext_bytes_to_read();
            if available > 0
            {
                if plaintext.len() + available > headroom
                {
                    return Err(TlsError::ReceiveQueueExceeded);
                }
                let start = plaintext.len();
                plaintext.resize(start + available, 0);
                self.conn.reader().read_exact(&mut plaintext[start..])?;
            }

            if io_state.peer_has_closed() && self.state != TlsState::Closed
            {
                tracing::trace!("Peer sent close_notify");
                self.close();
            }
        }

        self.step();
        Ok(plaintext)
    }

    /// Encrypt plaintext for sending. While the handshake is in progress the
    /// data is held back, and released in order once it completes.
    pub fn write(&mut self, plaintext: Bytes) -> Result<(), TlsError>
    {
        match self.state {
            TlsState::Handshaking => {
                self.pending_plaintext.push_back(plaintext);
                Ok(())
            }
            TlsState::Established => {
                self.conn.writer().write_all(&plaintext)?;
                Ok(())
            }
            TlsState::Closing | TlsState::Closed => Err(TlsError::Closed),
        }
    }

    /// Advance the state machine and report what it needs next
    pub fn step(&mut self) -> TlsStatus
    {
        if self.state == TlsState::Handshaking && !self.conn.is_handshaking()
        {
            tracing::trace!("TLS handshake complete");
            self.state = TlsState::Established;
            while let Some(data) = self.pending_plaintext.pop_front()
            {
                if let Err(e) = self.conn.writer().write_all(&data)
                {
                    tracing::error!("Error flushing queued plaintext: {}", e);
                }
            }
        }

        if self.conn.wants_write()
        {
            return TlsStatus::NeedOutput;
        }

        match self.state {
            TlsState::Handshaking => TlsStatus::NeedInput,
            TlsState::Established => TlsStatus::Established,
            TlsState::Closing => {
                self.state = TlsState::Closed;
                TlsStatus::Closed
            }
            TlsState::Closed => TlsStatus::Closed,
        }
    }

    /// Are there records waiting to be written?
    pub fn wants_write(&self) -> bool
    {
        self.conn.wants_write()
    }

    /// Is plaintext being held until the handshake completes?
    pub fn has_pending_plaintext(&self) -> bool
    {
        !self.pending_plaintext.is_empty()
    }

    /// Move every pending outbound record into `out`, returning the number of
    /// bytes added
    pub fn take_output(&mut self, out: &mut BytesMut) -> Result<usize, TlsError>
    {
        let mut buf = Vec::new();
        while self.conn.wants_write()
        {
            self.conn.write_tls(&mut buf)?;
        }
        out.extend_from_slice(&buf);
        Ok(buf.len())
    }

    /// Begin an orderly shutdown by queueing close_notify. Plaintext not yet
    /// released from the handshake queue is discarded.
    pub fn close(&mut self)
    {
        if matches!(self.state, TlsState::Handshaking | TlsState::Established)
        {
            self.pending_plaintext.clear();
            self.conn.send_close_notify();
            self.state = TlsState::Closing;
        }
    }
}

impl std::fmt::Debug for TlsAdapter
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result
    {
        f.debug_struct("TlsAdapter").field("state", &self.state).finish()
    }
}
