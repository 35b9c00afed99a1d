use crate::client::ClientConnection;

use parlour_listener::ConnectionId;
use parlour_network::prelude::*;

use std::collections::HashMap;
use std::sync::Arc;

/// Stores the client connections handled by a [`Server`](crate::server::Server),
/// and allows lookup by either connection ID or client ID
#[derive(Debug, Default)]
pub struct ConnectionCollection
{
    client_connections: HashMap<ConnectionId, Arc<ClientConnection>>,
    client_to_connid: HashMap<ClientId, ConnectionId>,
}

impl ConnectionCollection
{
    /// Construct an empty collection
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Insert a new connection, with no associated client ID
    pub fn add(&mut self, conn: Arc<ClientConnection>)
    {
        self.client_connections.insert(conn.id(), conn);
    }

    /// Associate a client ID with an existing connection ID
    pub fn add_client(&mut self, client: ClientId, to: ConnectionId)
    {
        self.client_to_connid.insert(client, to);
    }

    /// Remove a connection, by connection ID
    pub fn remove(&mut self, id: ConnectionId) -> Option<Arc<ClientConnection>>
    {
        let conn = self.client_connections.remove(&id)?;
        tracing::trace!(%id, "Removing connection");
        if let Some(client) = conn.client_id()
        {
            self.client_to_connid.remove(&client);
        }
        Some(conn)
    }

    /// Look up a connection by ID
    pub fn get(&self, id: ConnectionId) -> Option<Arc<ClientConnection>>
    {
        self.client_connections.get(&id).cloned()
    }

    /// Look up a connection by client ID
    pub fn get_client(&self, id: ClientId) -> Option<Arc<ClientConnection>>
    {
        self.client_to_connid.get(&id).and_then(|connid| self.get(*connid))
    }

    /// Iterate over every connection
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ClientConnection>> + '_
    {
        self.client_connections.values()
    }
}
