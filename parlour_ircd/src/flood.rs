//! Per-connection message rate limiting.
//!
//! Each connection carries a penalty cursor: the earliest time at which its
//! next message may be processed. Processing a message moves the cursor
//! forward by a fixed penalty. A connection whose cursor has run ahead of the
//! clock is deferred, and is only looked at again once the periodic sweep
//! releases it.

use parlour_listener::ConnectionId;
use parlour_network::config::FloodSettings;

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

/// Per-connection governor state
#[derive(Debug, Default)]
pub struct FloodCursor(AtomicI64);

impl FloodCursor
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Current cursor position, in milliseconds since the governor's epoch
    pub fn position(&self) -> i64
    {
        self.0.load(Ordering::Relaxed)
    }
}

/// Decision for one inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloodDecision
{
    Admit,
    Defer,
}

/// The governor shared by every connection on a server
#[derive(Debug)]
pub struct FloodGovernor
{
    epoch: Instant,
    penalty_ms: i64,
    allowance_ms: i64,
    deferred: Mutex<HashSet<ConnectionId>>,
}

impl FloodGovernor
{
    pub fn new(settings: FloodSettings) -> Self
    {
        let penalty_ms = settings.penalty.as_millis() as i64;
        Self {
            epoch: Instant::now(),
            penalty_ms,
            allowance_ms: penalty_ms * i64::from(settings.burst),
            deferred: Mutex::new(HashSet::new()),
        }
    }

    /// Milliseconds since this governor was created
    pub fn now(&self) -> i64
    {
        self.epoch.elapsed().as_millis() as i64
    }

    /// Decide whether a connection may process one more message now
    pub fn check(&self, conn: ConnectionId, cursor: &FloodCursor, unthrottled: bool) -> FloodDecision
    {
        self.check_at(conn, cursor, unthrottled, self.now())
    }

    /// [`check`](Self::check) against an explicit clock reading
    pub fn check_at(&self, conn: ConnectionId, cursor: &FloodCursor, unthrottled: bool, now: i64) -> FloodDecision
    {
        if unthrottled
        {
            return FloodDecision::Admit;
        }

        let admitted = cursor.0.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
            if current <= now + self.allowance_ms
            {
                Some(current.max(now) + self.penalty_ms)
            }
            else
            {
                None
            }
        });

        match admitted {
            Ok(_) => FloodDecision::Admit,
            Err(_) => {
                self.deferred.lock().insert(conn);
                FloodDecision::Defer
            }
        }
    }

    /// Is this connection waiting for the next sweep?
    pub fn is_deferred(&self, conn: ConnectionId) -> bool
    {
        self.deferred.lock().contains(&conn)
    }

    /// Release every deferred connection, returning them for reprocessing
    pub fn sweep(&self) -> Vec<ConnectionId>
    {
        let mut deferred = self.deferred.lock();
        if !deferred.is_empty()
        {
            tracing::trace!(count = deferred.len(), "Releasing deferred connections");
        }
        deferred.drain().collect()
    }

    /// Stop tracking a closed connection
    pub fn forget(&self, conn: ConnectionId)
    {
        self.deferred.lock().remove(&conn);
    }
}
