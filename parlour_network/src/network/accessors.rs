use super::*;

use std::collections::HashSet;
use std::str::FromStr;

impl Network
{
    /// Look up a client by ID
    pub fn client(&self, id: ClientId) -> LookupResult<&state::Client>
    {
        self.clients.get(&id).ok_or(LookupError::NoSuchClient(id))
    }

    /// Look up a client by current nickname
    pub fn client_by_nick(&self, nick: &Nickname) -> LookupResult<&state::Client>
    {
        self.nick_index
            .get(nick)
            .and_then(|id| self.clients.get(id))
            .ok_or_else(|| LookupError::NoSuchNick(nick.to_string()))
    }

    /// Look up a client by a nickname string that has not yet been validated
    pub fn client_by_nick_str(&self, nick: &str) -> LookupResult<&state::Client>
    {
        let nick = Nickname::from_str(nick).map_err(|_| LookupError::NoSuchNick(nick.to_string()))?;
        self.client_by_nick(&nick)
    }

    pub fn nick_in_use(&self, nick: &Nickname) -> bool
    {
        self.nick_index.contains_key(nick)
    }

    pub fn clients(&self) -> impl Iterator<Item = &state::Client> + '_
    {
        self.clients.values()
    }

    pub fn client_count(&self) -> usize
    {
        self.clients.len()
    }

    /// Look up a channel by ID
    pub fn channel(&self, id: ChannelId) -> LookupResult<&state::Channel>
    {
        self.channels.get(&id).ok_or(LookupError::NoSuchChannel(id))
    }

    /// Look up a channel by name
    pub fn channel_by_name(&self, name: &ChannelName) -> LookupResult<&state::Channel>
    {
        self.channel_index
            .get(name)
            .and_then(|id| self.channels.get(id))
            .ok_or_else(|| LookupError::NoSuchChannelName(name.to_string()))
    }

    pub fn channels(&self) -> impl Iterator<Item = &state::Channel>
    {
        self.channels.values()
    }

    pub fn channel_count(&self) -> usize
    {
        self.channels.len()
    }

    /// Iterate over the members of a channel along with their role flags
    pub fn channel_members(&self, id: ChannelId) -> LookupResult<impl Iterator<Item = (&state::Client, MembershipFlagSet)> + '_>
    {
        let channel = self.channel(id)?;
        Ok(channel
            .members
            .iter()
            .filter_map(move |(client, flags)| self.clients.get(client).map(|c| (c, *flags))))
    }

    /// Every client sharing at least one channel with the given client, not
    /// including the client itself
    pub fn peers_of(&self, id: ClientId) -> LookupResult<HashSet<ClientId>>
    {
        let client = self.client(id)?;
        Ok(client
            .channels
            .iter()
            .filter_map(|chan| self.channels.get(chan))
            .flat_map(|chan| chan.members.keys().copied())
            .filter(|member| *member != id)
            .collect())
    }

    /// Every client holding operator status
    pub fn opers(&self) -> impl Iterator<Item = &state::Client>
    {
        self.clients.values().filter(|c| c.is_oper())
    }

    pub fn catalog(&self) -> &ModeCatalog
    {
        &self.catalog
    }

    pub fn limits(&self) -> &ServerLimits
    {
        &self.limits
    }
}
