use super::*;
use crate::utils;

use std::collections::HashSet;

/// The result of removing a client from the network
#[derive(Debug)]
pub struct RemovedClient
{
    pub client: state::Client,
    /// Clients who shared a channel with the removed client, captured before removal
    pub peers: HashSet<ClientId>,
    /// Channels destroyed because the removed client was their last member
    pub destroyed_channels: Vec<ChannelName>,
}

impl Network
{
    /// Introduce a newly registered client
    pub fn add_client(&mut self, details: state::NewClient) -> Result<ClientId, ValidationError>
    {
        if self.nick_in_use(&details.nick)
        {
            return Err(ValidationError::NickInUse(details.nick));
        }

        let id = self.ids.next_client();
        let client = state::Client {
            id,
            nick: details.nick,
            user: details.user,
            host: details.host,
            realname: details.realname,
            ip: details.ip,
            mode: ModeSet::new(),
            privileges: Privileges::empty(),
            oper_name: None,
            away: None,
            channels: HashSet::new(),
            class: details.class,
            signon: utils::now(),
        };

        tracing::debug!(?id, nick = %client.nick, "Client added");
        self.nick_index.insert(client.nick, id);
        self.clients.insert(id, client);
        Ok(id)
    }

    /// Change a client's nickname, returning the identity it had beforehand.
    ///
    /// A change that differs only in case is permitted even though the new
    /// nickname compares equal to the one already held.
    pub fn change_nick(&mut self, id: ClientId, new_nick: Nickname) -> Result<Mask, ValidationError>
    {
        if let Some(owner) = self.nick_index.get(&new_nick)
        {
            if *owner != id
            {
                return Err(ValidationError::NickInUse(new_nick));
            }
        }

        let client = self.clients.get_mut(&id).ok_or(LookupError::NoSuchClient(id))?;
        let old_mask = client.mask();
        self.nick_index.remove(&client.nick);
        client.nick = new_nick;
        self.nick_index.insert(new_nick, id);
        Ok(old_mask)
    }

    /// Remove a client from the network and from every channel it had joined
    pub fn remove_client(&mut self, id: ClientId) -> LookupResult<RemovedClient>
    {
        let peers = self.peers_of(id)?;
        let channels: Vec<ChannelId> = self.client(id)?.channels.iter().copied().collect();

        let mut destroyed_channels = Vec::new();
        for channel in channels
        {
            if let Some(name) = self.remove_membership(channel, id)?
            {
                destroyed_channels.push(name);
            }
        }

        // Invitations outlive the membership they grant, so they are not
        // reached through the client's channel set
        for channel in self.channels.values_mut()
        {
            channel.invites.remove(&id);
        }

        let client = self.clients.remove(&id).ok_or(LookupError::NoSuchClient(id))?;
        self.nick_index.remove(&client.nick);
        tracing::debug!(?id, nick = %client.nick, "Client removed");

        Ok(RemovedClient { client, peers, destroyed_channels })
    }

    pub fn set_away(&mut self, id: ClientId, reason: Option<String>) -> LookupResult<()>
    {
        self.client_mut(id)?.away = reason;
        Ok(())
    }

    /// Set or clear one user mode letter. Returns whether anything changed.
    ///
    /// Clearing the operator mode also revokes any privileges granted with it.
    pub fn set_user_mode(&mut self, id: ClientId, letter: char, adding: bool) -> LookupResult<bool>
    {
        let client = self.client_mut(id)?;
        if adding
        {
            Ok(client.mode.set(letter))
        }
        else
        {
            let changed = client.mode.clear(letter);
            if changed && letter == letters::OPER
            {
                client.privileges = Privileges::empty();
                client.oper_name = None;
            }
            Ok(changed)
        }
    }

    /// Record a successful operator authentication
    pub fn grant_oper(&mut self, id: ClientId, oper_name: &str, privileges: Privileges) -> LookupResult<()>
    {
        let client = self.client_mut(id)?;
        client.mode.set(letters::OPER);
        client.privileges = privileges;
        client.oper_name = Some(oper_name.to_string());
        Ok(())
    }

    pub fn set_client_class(&mut self, id: ClientId, class: &str) -> LookupResult<()>
    {
        self.client_mut(id)?.class = class.to_string();
        Ok(())
    }

    fn client_mut(&mut self, id: ClientId) -> LookupResult<&mut state::Client>
    {
        self.clients.get_mut(&id).ok_or(LookupError::NoSuchClient(id))
    }
}
