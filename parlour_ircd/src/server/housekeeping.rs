use super::*;

impl Server
{
    /// Enforce the handshake and registration deadlines, and ping idle
    /// registered clients
    pub(super) fn check_timeouts(&self)
    {
        let timeouts = self.config.timeouts;
        let connections: Vec<_> = self.connections.read().iter().cloned().collect();

        for conn in connections
        {
            if conn.is_closing()
            {
                continue;
            }

            if conn.connection.is_tls() && !conn.connection.tls_established()
            {
                if conn.age() >= timeouts.tls_handshake
                {
                    conn.close("TLS handshake timed out");
                }
                continue;
            }

            if !conn.is_registered()
            {
                if conn.age() >= timeouts.registration
                {
                    conn.close("Registration timed out");
                }
                continue;
            }

            match conn.check_idle(conn.class().ping_frequency) {
                IdleStatus::Active => (),
                IdleStatus::SendPing => conn.send(message::Ping::new(self.info.name.as_str())),
                IdleStatus::TimedOut(secs) => conn.close(format!("Ping timeout: {} seconds", secs)),
            }
        }
    }

    /// Check that both sides of every membership agree, and that every
    /// registered connection still has its client
    pub(super) fn audit_network(&self)
    {
        let network = self.network.read();

        let violations = network.verify_membership_symmetry();
        for violation in &violations
        {
            tracing::error!("Membership audit: {}", violation);
        }

        for conn in self.connections.read().iter()
        {
            if let Some(id) = conn.client_id()
            {
                if network.client(id).is_err() && !conn.is_closing()
                {
                    tracing::error!(conn = %conn.id(), client = ?id, "Registered connection has no client");
                }
            }
        }

        tracing::trace!(clients = network.client_count(), channels = network.channel_count(), "Audit complete");
    }
}
