use parlour_listener::ConnectionId;

use parking_lot::Mutex;

/// Connections waiting to be torn down.
///
/// Anything may request a close at any time, including while a handler holds
/// the network lock. The server drains the queue once per event-loop pass,
/// when no handler is running, so teardown never races a handler that still
/// refers to the connection.
#[derive(Debug, Default)]
pub struct CloseQueue
{
    pending: Mutex<Vec<ConnectionId>>,
}

impl CloseQueue
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn push(&self, id: ConnectionId)
    {
        self.pending.lock().push(id);
    }

    /// Take every pending close, in the order requested
    pub fn drain(&self) -> Vec<ConnectionId>
    {
        std::mem::take(&mut *self.pending.lock())
    }

    pub fn is_empty(&self) -> bool
    {
        self.pending.lock().is_empty()
    }
}
