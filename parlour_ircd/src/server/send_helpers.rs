use super::*;

/// Longest run of names put in one RPL_NAMREPLY, leaving room for the prefix
const NAMES_CHUNK_LEN: usize = 400;

impl Server
{
    /// Send a message to the connection of a registered client, if it has one
    pub(crate) fn send_to_client(&self, client: ClientId, msg: &OutboundClientMessage)
    {
        if let Some(conn) = self.connections.read().get_client(client)
        {
            conn.send(msg.clone());
        }
    }

    /// Send a message to each of a set of clients
    pub(crate) fn send_to_clients(&self, clients: impl IntoIterator<Item = ClientId>, msg: &OutboundClientMessage)
    {
        let connections = self.connections.read();
        for client in clients
        {
            if let Some(conn) = connections.get_client(client)
            {
                conn.send(msg.clone());
            }
        }
    }

    /// Send a message to every member of a channel, optionally skipping one.
    ///
    /// The caller holds the network lock, so the membership seen here is the
    /// one the change was made against.
    pub(crate) fn send_to_channel(&self, channel: &state::Channel, msg: &OutboundClientMessage, except: Option<ClientId>)
    {
        let members = channel.members.keys().copied().filter(|id| Some(*id) != except);
        self.send_to_clients(members, msg);
    }

    /// Send a channel's member list to a client
    pub(crate) fn send_names(&self, network: &Network, conn: &ClientConnection, channel: &state::Channel)
    {
        let kind = if channel.has_mode(letters::SECRET)
        {
            '@'
        }
        else if channel.has_mode(letters::PRIVATE)
        {
            '*'
        }
        else
        {
            '='
        };

        let members = match network.channel_members(channel.id) {
            Ok(members) => members,
            Err(e) => {
                tracing::error!(channel = %channel.name, "Failed to list members: {}", e);
                return;
            }
        };

        let mut line = String::new();
        for (client, flags) in members
        {
            let entry = format!("{}{}", flags.to_prefixes(), client.nick);
            if !line.is_empty() && line.len() + entry.len() + 1 > NAMES_CHUNK_LEN
            {
                conn.numeric(numeric::NamesReply::new(kind, &channel.name, &line));
                line.clear();
            }
            if !line.is_empty()
            {
                line.push(' ');
            }
            line.push_str(&entry);
        }
        if !line.is_empty()
        {
            conn.numeric(numeric::NamesReply::new(kind, &channel.name, &line));
        }

        conn.numeric(numeric::EndOfNames::new(channel.name.as_str()));
    }

    /// Send a channel's topic, or the reply saying it has none
    pub(crate) fn send_topic(&self, conn: &ClientConnection, channel: &state::Channel)
    {
        match &channel.topic {
            Some(topic) => {
                conn.numeric(numeric::TopicIs::new(&channel.name, &topic.text));
                conn.numeric(numeric::TopicSetBy::new(&channel.name, &topic.setter, topic.timestamp));
            }
            None => conn.numeric(numeric::NoTopic::new(&channel.name)),
        }
    }
}
