//! Reverse DNS lookups for connecting clients

use parlour_listener::ConnectionId;
use parlour_network::prelude::*;

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Semaphore;
use tokio::task;
use trust_dns_resolver::error::ResolveError;
use trust_dns_resolver::TokioAsyncResolver;

/// The outcome of one hostname lookup
#[derive(Debug, Clone)]
pub struct HostLookupResult
{
    pub conn: ConnectionId,
    /// The verified hostname, or `None` if the address has no usable name
    pub hostname: Option<Hostname>,
}

/// Runs reverse lookups on a bounded number of concurrent tasks, reporting
/// each result over a channel as it completes
pub struct HostResolver
{
    event_channel: UnboundedSender<HostLookupResult>,
    resolver: TokioAsyncResolver,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl HostResolver
{
    /// Construct a `HostResolver` from the system resolver configuration.
    /// At most `max_concurrent` lookups run at once; each gives up after
    /// `timeout`.
    pub fn new(event_channel: UnboundedSender<HostLookupResult>,
               max_concurrent: usize,
               timeout: Duration) -> Result<Self, ResolveError>
    {
        Ok(Self {
            event_channel,
            resolver: TokioAsyncResolver::tokio_from_system_conf()?,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            timeout,
        })
    }

    /// Begin a lookup.
    ///
    /// `conn_id` is not used internally, but is attached to the result so it
    /// can be matched with the connection that asked.
    pub fn start_lookup(&self, conn_id: ConnectionId, addr: IpAddr)
    {
        let chan = self.event_channel.clone();
        let resolver = self.resolver.clone();
        let permits = Arc::clone(&self.permits);
        let timeout = self.timeout;

        task::spawn(async move {
            let hostname = match permits.acquire_owned().await {
                Ok(_permit) => {
                    match tokio::time::timeout(timeout, Self::lookup(&resolver, addr)).await {
                        Ok(name) => name,
                        Err(_) => {
                            tracing::debug!(%conn_id, %addr, "Hostname lookup timed out");
                            None
                        }
                    }
                }
                Err(_) => None,
            };
            let _res = chan.send(HostLookupResult { conn: conn_id, hostname });
        });
    }

    async fn lookup(resolver: &TokioAsyncResolver, addr: IpAddr) -> Option<Hostname>
    {
        let lookup = resolver.reverse_lookup(addr).await.ok()?;
        let name = lookup.iter().next()?;
        if !Self::verify_forward_matches(resolver, name, addr).await
        {
            return None;
        }
        Hostname::convert(name.to_ascii().trim_end_matches('.')).ok()
    }

    async fn verify_forward_matches(resolver: &TokioAsyncResolver, name: &trust_dns_resolver::Name, addr: IpAddr) -> bool
    {
        match resolver.lookup_ip(name.clone()).await {
            Ok(lookup) => lookup.iter().any(|ip| ip == addr),
            Err(_) => false,
        }
    }
}
