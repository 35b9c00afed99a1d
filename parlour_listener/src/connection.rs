use crate::*;
use internal::*;

use bytes::Bytes;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

/// Queue accounting shared between a [`Connection`] handle and the task
/// driving its socket.
#[derive(Debug)]
pub(crate) struct QueueState
{
    /// Plaintext bytes accepted by `send` but not yet written to the socket
    pub sendq: AtomicUsize,
    pub sendq_max: AtomicUsize,
    /// Received bytes forwarded to the server but not yet consumed by it
    pub recvq: AtomicUsize,
    pub recvq_max: AtomicUsize,
    pub tls_established: AtomicBool,
}

impl QueueState
{
    pub fn new(sendq_max: usize, recvq_max: usize) -> Self
    {
        Self {
            sendq: AtomicUsize::new(0),
            sendq_max: AtomicUsize::new(sendq_max),
            recvq: AtomicUsize::new(0),
            recvq_max: AtomicUsize::new(recvq_max),
            tls_established: AtomicBool::new(false),
        }
    }

    /// Space left in the receive queue
    pub fn recv_headroom(&self) -> usize
    {
        self.recvq_max
            .load(Ordering::Acquire)
            .saturating_sub(self.recvq.load(Ordering::Acquire))
    }

    /// Count `len` more received bytes, unless that would exceed the cap
    pub fn try_receive(&self, len: usize) -> Result<(), ConnectionError>
    {
        let max = self.recvq_max.load(Ordering::Acquire);
        self.recvq
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(len).filter(|total| *total <= max)
            })
            .map(|_| ())
            .map_err(|_| ConnectionError::ReadQueueExceeded)
    }

    pub fn release_sent(&self, len: usize)
    {
        let _ = self.sendq.fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| Some(used.saturating_sub(len)));
    }
}

/// A client connection, as seen by the server.
///
/// Dropping the handle does not close the connection; call
/// [`close`](Self::close).
pub struct Connection
{
    pub id: ConnectionId,
    pub conn_type: ConnectionType,
    pub remote_addr: IpAddr,
    pub local_addr: SocketAddr,
    control_channel: UnboundedSender<ConnectionControlDetail>,
    queues: Arc<QueueState>,
}

impl Connection
{
    pub(crate) fn new(id: ConnectionId,
                      conn_type: ConnectionType,
                      remote_addr: IpAddr,
                      local_addr: SocketAddr,
                      control_channel: UnboundedSender<ConnectionControlDetail>,
                      queues: Arc<QueueState>) -> Self
    {
        Self {
            id,
            conn_type,
            remote_addr,
            local_addr,
            control_channel,
            queues,
        }
    }

    /// Is this a TLS connection?
    pub fn is_tls(&self) -> bool
    {
        self.conn_type == ConnectionType::Tls
    }

    /// Has the TLS handshake completed? Always false for plain connections.
    pub fn tls_established(&self) -> bool
    {
        self.queues.tls_established.load(Ordering::Acquire)
    }

    /// Queue data to be written to the connection.
    ///
    /// Fails with [`ConnectionError::SendQueueExceeded`] if the bytes already
    /// queued plus these would exceed the send queue cap, in which case
    /// nothing is queued.
    pub fn send(&self, data: impl Into<Bytes>) -> Result<(), ConnectionError>
    {
        let data = data.into();
        let len = data.len();
        let max = self.queues.sendq_max.load(Ordering::Acquire);

        self.queues
            .sendq
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(len).filter(|total| *total <= max)
            })
            .map_err(|_| ConnectionError::SendQueueExceeded)?;

        if self.control_channel.send(ConnectionControlDetail::Send(data)).is_err()
        {
            self.queues.release_sent(len);
            return Err(ConnectionError::Closed);
        }
        Ok(())
    }

    /// Close the connection, after flushing whatever has already been queued.
    pub fn close(&self)
    {
        if let Err(e) = self.control_channel.send(ConnectionControlDetail::Close)
        {
            tracing::debug!(id = %self.id, "Closing already-closed connection: {}", e);
        }
    }

    /// Mark `len` bytes delivered in [`ConnectionEventDetail::Data`] events as
    /// consumed, making room in the receive queue.
    pub fn release_received(&self, len: usize)
    {
        let _ = self.queues.recvq.fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
            Some(used.saturating_sub(len))
        });
    }

    /// Change the queue caps, e.g. after the connection moves to another class
    pub fn set_limits(&self, sendq: usize, recvq: usize)
    {
        self.queues.sendq_max.store(sendq, Ordering::Release);
        self.queues.recvq_max.store(recvq, Ordering::Release);
    }

    /// Bytes queued for sending but not yet written
    pub fn send_queue_len(&self) -> usize
    {
        self.queues.sendq.load(Ordering::Acquire)
    }

    /// Bytes received but not yet consumed
    pub fn recv_queue_len(&self) -> usize
    {
        self.queues.recvq.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Connection
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result
    {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("conn_type", &self.conn_type)
            .field("remote_addr", &self.remote_addr)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    fn connection(sendq: usize, recvq: usize) -> (Connection, tokio::sync::mpsc::UnboundedReceiver<ConnectionControlDetail>) {
        let (send, recv) = unbounded_channel();
        let id = ConnectionIdGenerator::new(ListenerId::new(1), 1).next();
        let conn = Connection::new(
            id,
            ConnectionType::Clear,
            "127.0.0.1".parse().unwrap(),
            "127.0.0.1:6667".parse().unwrap(),
            send,
            Arc::new(QueueState::new(sendq, recvq)),
        );
        (conn, recv)
    }

    #[test]
    fn send_queue_cap() {
        let (conn, mut recv) = connection(10, 10);
        conn.send("12345").unwrap();
        conn.send("67890").unwrap();
        assert_eq!(conn.send("x"), Err(ConnectionError::SendQueueExceeded));
        assert_eq!(conn.send_queue_len(), 10);

        assert!(matches!(recv.try_recv(), Ok(ConnectionControlDetail::Send(b)) if b == "12345"));
        conn.queues.release_sent(5);
        conn.send("x").unwrap();
        assert_eq!(conn.send_queue_len(), 6);
    }

    #[test]
    fn receive_queue_cap() {
        let (conn, _recv) = connection(10, 8);
        conn.queues.try_receive(6).unwrap();
        assert_eq!(conn.queues.recv_headroom(), 2);
        assert_eq!(conn.queues.try_receive(3), Err(ConnectionError::ReadQueueExceeded));
        assert_eq!(conn.recv_queue_len(), 6);

        conn.release_received(6);
        conn.queues.try_receive(8).unwrap();
    }

    #[test]
    fn limits_can_change() {
        let (conn, _recv) = connection(4, 4);
        assert!(conn.send("123456").is_err());
        conn.set_limits(8, 8);
        conn.send("123456").unwrap();
    }
}
