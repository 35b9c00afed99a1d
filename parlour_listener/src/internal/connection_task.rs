use crate::*;
use crate::connection::QueueState;
use crate::internal::*;
use crate::tls::*;

use bytes::{Buf, Bytes, BytesMut};
use std::io::ErrorKind;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::{
    io::Interest,
    net::TcpStream,
    select,
    sync::mpsc::{
        Sender,
        UnboundedReceiver
    },
};

/// Size of the scratch buffer used for each socket read
const READ_CHUNK: usize = 4096;

/// How the task turns plaintext into bytes on the wire
enum Transport
{
    Clear,
    Tls(Box<TlsAdapter>),
}

/// Drives one socket: reads when readable, writes when there is output and
/// the socket is writable, and never blocks on either.
pub struct ConnectionTask
{
    id: ConnectionId,
    stream: TcpStream,
    transport: Transport,
    control_channel: UnboundedReceiver<ConnectionControlDetail>,
    event_channel: Sender<ConnectionEvent>,
    queues: Arc<QueueState>,
    /// Bytes ready for the socket
    outbuf: BytesMut,
    /// Plaintext bytes accepted from the handle and not yet released from the send queue
    unflushed: usize,
    closing: bool,
}

impl ConnectionTask
{
    pub(crate) fn new(id: ConnectionId,
                      stream: TcpStream,
                      conn_type: &InternalConnectionType,
                      control: UnboundedReceiver<ConnectionControlDetail>,
                      events: Sender<ConnectionEvent>,
                      queues: Arc<QueueState>) -> Result<Self, ConnectionError>
    {
        let transport = match conn_type {
            InternalConnectionType::Clear => Transport::Clear,
            InternalConnectionType::Tls(config) => Transport::Tls(Box::new(TlsAdapter::new(Arc::clone(config))?)),
        };

        Ok(Self {
            id,
            stream,
            transport,
            control_channel: control,
            event_channel: events,
            queues,
            outbuf: BytesMut::new(),
            unflushed: 0,
            closing: false,
        })
    }

    pub async fn run(mut self)
    {
        let error = match self.run_loop().await {
            Ok(()) => ConnectionError::Closed,
            Err(e) => {
                // The peer may still be reading; give any queued alert a chance
                self.collect_tls_output();
                let _ = self.try_flush();
                e
            }
        };

        tracing::debug!(id = %self.id, "Connection task exiting: {}", error);
        if self.event_channel.send(ConnectionEvent::error(self.id, error)).await.is_err()
        {
            tracing::error!("Error notifying connection closed on {}", self.id);
        }
    }

    async fn run_loop(&mut self) -> Result<(), ConnectionError>
    {
        let mut scratch = [0u8; READ_CHUNK];

        loop
        {
            self.collect_tls_output();
            if self.closing && self.outbuf.is_empty()
            {
                return Ok(());
            }

            let interest = if self.closing {
                Interest::WRITABLE
            } else if self.outbuf.is_empty() {
                Interest::READABLE
            } else {
                Interest::READABLE | Interest::WRITABLE
            };

            select! {
                ready = self.stream.ready(interest) => {
                    let ready = ready?;
                    if ready.is_readable() && !self.closing
                    {
                        self.do_read(&mut scratch).await?;
                    }
                    if ready.is_writable()
                    {
                        self.try_flush()?;
                    }
                },
                control = self.control_channel.recv(), if !self.closing => {
                    match control {
                        None | Some(ConnectionControlDetail::Close) => self.begin_close(),
                        Some(ConnectionControlDetail::Send(data)) => self.queue_plaintext(data)?,
                    }
                }
            }
        }
    }

    async fn do_read(&mut self, scratch: &mut [u8]) -> Result<(), ConnectionError>
    {
        let len = match self.stream.try_read(scratch) {
            Ok(0) => return Err(ConnectionError::Closed),
            Ok(len) => len,
            Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let received = match &mut self.transport {
            Transport::Clear => Bytes::copy_from_slice(&scratch[..len]),
            Transport::Tls(tls) => {
                let headroom = self.queues.recv_headroom();
                let plaintext = tls.receive(&scratch[..len], headroom)?;
                if tls.is_established()
                {
                    self.queues.tls_established.store(true, Ordering::Release);
                }
                if tls.state() == TlsState::Closed || tls.state() == TlsState::Closing
                {
                    self.closing = true;
                }
                plaintext.freeze()
            }
        };

        if received.is_empty()
        {
            return Ok(());
        }

        // Over-limit data is never forwarded, so no partial line from it can be processed
        self.queues.try_receive(received.len())?;
        self.event_channel.send(ConnectionEvent::data(self.id, received)).await?;
        Ok(())
    }

    fn queue_plaintext(&mut self, data: Bytes) -> Result<(), ConnectionError>
    {
        self.unflushed += data.len();
        match &mut self.transport {
            Transport::Clear => self.outbuf.extend_from_slice(&data),
            Transport::Tls(tls) => tls.write(data)?,
        }
        Ok(())
    }

    fn begin_close(&mut self)
    {
        self.closing = true;
        if let Transport::Tls(tls) = &mut self.transport
        {
            tls.close();
        }
    }

    /// Move any records the TLS session wants to send into the output buffer
    fn collect_tls_output(&mut self)
    {
        if let Transport::Tls(tls) = &mut self.transport
        {
            if let Err(e) = tls.take_output(&mut self.outbuf)
            {
                tracing::debug!(id = %self.id, "Error collecting TLS output: {}", e);
            }
            tls.step();
        }
    }

    /// Write as much of the output buffer as the socket accepts right now
    fn try_flush(&mut self) -> Result<(), ConnectionError>
    {
        while !self.outbuf.is_empty()
        {
            match self.stream.try_write(&self.outbuf) {
                Ok(0) => return Err(ConnectionError::Closed),
                Ok(n) => self.outbuf.advance(n),
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }

        let held = match &self.transport {
            Transport::Clear => false,
            Transport::Tls(tls) => tls.has_pending_plaintext() || tls.wants_write(),
        };
        if !held && self.unflushed > 0
        {
            self.queues.release_sent(self.unflushed);
            self.unflushed = 0;
        }
        Ok(())
    }
}
