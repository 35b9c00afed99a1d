use super::*;

use thiserror::Error;

/// A broken cross-reference found by [`Network::verify_membership_symmetry`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymmetryViolation
{
    #[error("client {0} lists channel {1} but is not in its member map")]
    ClientNotInChannel(ClientId, ChannelId),
    #[error("channel {0} lists member {1} who does not list the channel")]
    ChannelNotInClient(ChannelId, ClientId),
    #[error("client {0} lists nonexistent channel {1}")]
    DanglingChannel(ClientId, ChannelId),
    #[error("channel {0} lists nonexistent member {1}")]
    DanglingMember(ChannelId, ClientId),
    #[error("channel {0} holds an invitation for nonexistent client {1}")]
    DanglingInvite(ChannelId, ClientId),
    #[error("channel {0} has no members")]
    EmptyChannel(ChannelId),
    #[error("name index entry {0} is stale")]
    StaleIndex(String),
}

impl Network
{
    /// Check that every client-channel relation is recorded on both sides and
    /// that the name indexes agree with the objects they point at.
    pub fn verify_membership_symmetry(&self) -> Vec<SymmetryViolation>
    {
        let mut violations = Vec::new();

        for client in self.clients.values()
        {
            for chan_id in &client.channels
            {
                match self.channels.get(chan_id) {
                    None => violations.push(SymmetryViolation::DanglingChannel(client.id, *chan_id)),
                    Some(chan) if !chan.members.contains_key(&client.id) => {
                        violations.push(SymmetryViolation::ClientNotInChannel(client.id, *chan_id))
                    }
                    Some(_) => (),
                }
            }
        }

        for channel in self.channels.values()
        {
            if channel.members.is_empty()
            {
                violations.push(SymmetryViolation::EmptyChannel(channel.id));
            }
            for member in channel.members.keys()
            {
                match self.clients.get(member) {
                    None => violations.push(SymmetryViolation::DanglingMember(channel.id, *member)),
                    Some(client) if !client.channels.contains(&channel.id) => {
                        violations.push(SymmetryViolation::ChannelNotInClient(channel.id, *member))
                    }
                    Some(_) => (),
                }
            }
            for invitee in &channel.invites
            {
                if !self.clients.contains_key(invitee)
                {
                    violations.push(SymmetryViolation::DanglingInvite(channel.id, *invitee));
                }
            }
        }

        for (nick, id) in &self.nick_index
        {
            if self.clients.get(id).map(|c| &c.nick) != Some(nick)
            {
                violations.push(SymmetryViolation::StaleIndex(nick.to_string()));
            }
        }
        for (name, id) in &self.channel_index
        {
            if self.channels.get(id).map(|c| &c.name) != Some(name)
            {
                violations.push(SymmetryViolation::StaleIndex(name.to_string()));
            }
        }

        violations
    }
}
