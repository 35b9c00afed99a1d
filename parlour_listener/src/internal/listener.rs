use crate::*;
use crate::connection::QueueState;
use crate::internal::*;

use tokio::{
    net::TcpListener,
    sync::mpsc::{
        Sender,
        Receiver,
        channel,
        unbounded_channel,
    },
    select
};

use std::sync::Arc;

/// Initial queue caps for accepted connections, until the server assigns a class
#[derive(Debug, Clone, Copy)]
pub struct QueueLimits
{
    pub sendq: usize,
    pub recvq: usize,
}

pub(crate) struct Listener
{
    pub id: ListenerId,
    pub control_channel: Sender<ListenerControlDetail>,
}

impl Listener
{
    pub fn new(listener_id: ListenerId,
               listener: TcpListener,
               connection_type: InternalConnectionType,
               limits: QueueLimits,
               event_channel: Sender<ConnectionEvent>,
            ) -> Self
    {
        let (control_send, control_receive) = channel(8);

        tokio::spawn(Self::listen_and_log(event_channel,
                                          control_receive,
                                          listener,
                                          connection_type,
                                          limits,
                                          listener_id,
                                        ));

        Self {
            id: listener_id,
            control_channel: control_send,
        }
    }

    async fn listen_and_log(
        event_channel: Sender<ConnectionEvent>,
        control_channel: Receiver<ListenerControlDetail>,
        listener: TcpListener,
        connection_type: InternalConnectionType,
        limits: QueueLimits,
        listener_id: ListenerId,
    )
    {
        if let Err(e) = Self::listen_loop(event_channel, control_channel, listener, connection_type, limits, listener_id).await
        {
            tracing::error!(%listener_id, "Error in listener loop: {}", e);
        }
    }

    async fn listen_loop(
        event_channel: Sender<ConnectionEvent>,
        mut control_channel: Receiver<ListenerControlDetail>,
        listener: TcpListener,
        connection_type: InternalConnectionType,
        limits: QueueLimits,
        listener_id: ListenerId,
    ) -> Result<(), ListenerError>
    {
        let id_gen = ConnectionIdGenerator::new(listener_id, 1);
        let local_addr = listener.local_addr()?;

        loop
        {
            select! {
                res = listener.accept() => {
                    let (stream, remote) = match res {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            // Usually fd exhaustion or a connection reset before accept; keep listening
                            tracing::warn!(%listener_id, "Error accepting connection: {}", e);
                            continue;
                        }
                    };

                    let id = id_gen.next();
                    let (control_send, control_recv) = unbounded_channel();
                    let queues = Arc::new(QueueState::new(limits.sendq, limits.recvq));

                    let task = match ConnectionTask::new(id, stream, &connection_type, control_recv, event_channel.clone(), Arc::clone(&queues)) {
                        Ok(task) => task,
                        Err(e) => {
                            tracing::error!(%id, "Couldn't set up connection: {}", e);
                            continue;
                        }
                    };

                    tracing::debug!(%id, %remote, "Accepted connection");
                    let conn = Connection::new(id, connection_type.to_pub(), remote.ip(), local_addr, control_send, queues);

                    // The server must learn of the connection before any of its data arrives
                    event_channel.send(ConnectionEvent::new(id, conn)).await?;
                    tokio::spawn(task.run());
                },
                control = control_channel.recv() => {
                    match control {
                        None | Some(ListenerControlDetail::Close) => break,
                    }
                }
            }
        }

        tracing::debug!(%listener_id, "Listener closed");
        Ok(())
    }
}

impl Drop for Listener
{
    fn drop(&mut self)
    {
        if let Err(e) = self.control_channel.try_send(ListenerControlDetail::Close)
        {
            tracing::debug!(listener_id = %self.id, "Error closing dropped listener: {}", e);
        }
    }
}
