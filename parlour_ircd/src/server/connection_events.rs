use super::*;

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the cookie a client must echo back before registering
const SPOOF_COOKIE_LEN: usize = 16;

impl Server
{
    pub(super) fn process_connection_event(&self, event: ConnectionEvent)
    {
        match event.detail {
            ConnectionEventDetail::NewConnection(conn) => self.accept(conn),
            ConnectionEventDetail::Data(data) => {
                let conn = match self.find_connection(event.source) {
                    Some(conn) => conn,
                    None => {
                        tracing::trace!(conn = %event.source, "Data for unknown connection");
                        return;
                    }
                };

                conn.append_received(&data);

                if conn.is_closing()
                {
                    conn.discard_received();
                }
                else if !self.flood.is_deferred(conn.id())
                {
                    self.process_connection(&conn);
                }
            }
            ConnectionEventDetail::Error(error) => {
                if let Some(conn) = self.find_connection(event.source)
                {
                    match error {
                        ConnectionError::Closed => conn.close("Remote host closed the connection"),
                        e => conn.close(e),
                    }
                }
            }
        }
    }

    /// Admit a newly accepted connection, or turn it away
    fn accept(&self, conn: Connection)
    {
        tracing::debug!(conn = %conn.id, addr = %conn.remote_addr, "New connection");

        if let Some(ban) = self.policy.registration.address_ban(&conn.remote_addr)
        {
            tracing::info!(conn = %conn.id, addr = %conn.remote_addr, "Refusing banned address");
            let reply = numeric::YoureBanned::new(&ban.reason).format_for(&self.info.name, &UnknownTarget);
            Self::refuse(&conn, &reply, &format!("Banned: {}", ban.reason));
            return;
        }

        let class = self
            .classes
            .find_for_address(&conn.remote_addr)
            .unwrap_or_else(|| self.classes.default_class());

        if !class.try_attach()
        {
            tracing::info!(conn = %conn.id, class = %class.name, "Connection class is full");
            let reply = message::Error::new("Closing Link: Too many connections in class");
            Self::refuse(&conn, &reply, "Too many connections in class");
            return;
        }

        conn.set_limits(class.sendq, class.recvq);

        let cookie = if self.config.require_spoof_check
        {
            Some(rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(SPOOF_COOKIE_LEN)
                .map(char::from)
                .collect::<String>())
        }
        else
        {
            None
        };

        let client = Arc::new(ClientConnection::new(
            conn,
            self.info.name,
            class,
            cookie,
            Arc::clone(&self.close_queue),
        ));
        self.connections.write().add(Arc::clone(&client));

        if let Some(cookie) = client.spoof_cookie()
        {
            client.send(message::Ping::new(cookie));
        }

        client.send(message::Notice::new(self.info.name.as_str(), "*", "*** Looking up your hostname..."));

        match &self.resolver {
            Some(resolver) => resolver.start_lookup(client.id(), client.remote_addr()),
            None => self.hostname_decided(&client, None),
        }
    }

    /// Send a final line to a connection that was never admitted and close it
    fn refuse(conn: &Connection, line: &OutboundClientMessage, reason: &str)
    {
        if let Err(e) = conn.send(crate::codec::encode_line(line.as_str()))
        {
            tracing::debug!(conn = %conn.id, %reason, "Failed to send refusal: {}", e);
        }
        conn.close();
    }

    pub(super) fn process_host_result(&self, result: HostLookupResult)
    {
        let conn = match self.find_connection(result.conn) {
            Some(conn) => conn,
            None => return,
        };

        let notice = if result.hostname.is_some()
        {
            "*** Found your hostname"
        }
        else
        {
            "*** Couldn't look up your hostname"
        };
        conn.send(message::Notice::new(self.info.name.as_str(), "*", notice));

        self.hostname_decided(&conn, result.hostname);
    }

    /// Record the connection's hostname, falling back to its address when
    /// no name was found
    fn hostname_decided(&self, conn: &Arc<ClientConnection>, host: Option<Hostname>)
    {
        let host = match host.map_or_else(|| Hostname::from_ip(conn.remote_addr()), Ok) {
            Ok(host) => host,
            Err(e) => {
                tracing::error!(conn = %conn.id(), "Unusable client address: {}", e);
                conn.close("Internal error");
                return;
            }
        };

        if !conn.set_hostname(host)
        {
            return;
        }
        if conn.set_registration_flag(RegistrationFlags::HOST)
        {
            self.register_client(conn);
        }
    }
}
