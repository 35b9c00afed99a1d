use super::*;

impl Server
{
    /// Introduce a connection whose registration steps are all complete to
    /// the network, and welcome it
    pub(crate) fn register_client(&self, conn: &Arc<ClientConnection>)
    {
        if let Err(e) = self.try_register(conn)
        {
            tracing::error!(conn = %conn.id(), "Registration failed: {}", e);
            conn.close("Internal error");
        }
    }

    fn try_register(&self, conn: &Arc<ClientConnection>) -> HandleResult
    {
        if conn.is_closing()
        {
            return Ok(());
        }

        let nick = conn.nick().ok_or("registering without a nickname")?;
        let user = *conn.pre_client.user.get().ok_or("registering without a username")?;
        let host = conn.hostname().ok_or("registering without a hostname")?;
        let realname = conn.pre_client.realname.get().cloned().unwrap_or_default();
        let ip = conn.remote_addr();

        if let Some(ban) = self.policy.registration.connection_ban(&user, &host, &ip)
        {
            tracing::info!(conn = %conn.id(), %user, %host, "Refusing banned client");
            conn.numeric(numeric::YoureBanned::new(&ban.reason));
            conn.close(format!("Banned: {}", ban.reason));
            return Ok(());
        }

        let details = state::NewClient {
            nick,
            user,
            host,
            realname,
            ip,
            class: conn.class().name.clone(),
        };

        let result = self.network.write().add_client(details);
        let client_id = match result {
            Ok(id) => id,
            Err(ValidationError::NickInUse(nick)) => {
                // Someone registered the nickname while this client waited for
                // its other steps; it must choose again
                conn.clear_registration_flag(RegistrationFlags::NICK);
                conn.numeric(numeric::NicknameInUse::new(&nick));
                return Ok(());
            }
            Err(ValidationError::ObjectNotFound(e)) => return Err(e.into()),
            Err(ValidationError::InvalidName(e)) => return Err(e.into()),
        };

        conn.set_client_id(client_id);
        self.connections.write().add_client(client_id, conn.id());
        conn.advance_state(ClientState::Registered);

        tracing::info!(conn = %conn.id(), client = ?client_id, %nick, %user, %host, "Client registered");

        self.send_welcome(conn, &nick);
        Ok(())
    }
}
