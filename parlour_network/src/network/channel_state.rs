use super::*;
use crate::utils;

/// The outcome of a successful join
#[derive(Debug, Clone, Copy)]
pub struct JoinResult
{
    pub channel: ChannelId,
    /// Whether the join created the channel
    pub created: bool,
    pub flags: MembershipFlagSet,
}

/// A mode change that named a member who could not be found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberModeError
{
    NoSuchNick(String),
    NotOnChannel(Nickname),
}

/// The changes actually made by [`Network::apply_channel_modes`]
#[derive(Debug, Default)]
pub struct AppliedModes
{
    pub applied: Vec<ModeChange>,
    pub errors: Vec<MemberModeError>,
}

/// Role flags given to whoever creates a channel
pub const FOUNDER_FLAGS: MembershipFlagSet = MembershipFlagSet::from_bits_truncate(
    MembershipFlagSet::MEMBER.bits() | MembershipFlagSet::OP.bits(),
);

impl Network
{
    /// Add a client to a channel, creating the channel if it does not exist.
    ///
    /// No permission checks happen here; callers consult the channel policy
    /// first. Joining a channel the client is already in changes nothing.
    /// Any outstanding invitation for the client is consumed.
    pub fn join_channel(&mut self, client_id: ClientId, name: &ChannelName) -> LookupResult<JoinResult>
    {
        if !self.clients.contains_key(&client_id)
        {
            return Err(LookupError::NoSuchClient(client_id));
        }

        let (channel_id, created) = match self.channel_index.get(name) {
            Some(id) => (*id, false),
            None => {
                let id = self.ids.next_channel();
                self.channels.insert(id, state::Channel::new(id, *name, utils::now()));
                self.channel_index.insert(*name, id);
                tracing::debug!(?id, %name, "Channel created");
                (id, true)
            }
        };

        let channel = self.channels.get_mut(&channel_id).ok_or(LookupError::NoSuchChannel(channel_id))?;
        channel.invites.remove(&client_id);

        let flags = match channel.members.get(&client_id) {
            Some(existing) => *existing,
            None => {
                let flags = if created { FOUNDER_FLAGS } else { MembershipFlagSet::MEMBER };
                channel.members.insert(client_id, flags);
                flags
            }
        };

        if let Some(client) = self.clients.get_mut(&client_id)
        {
            client.channels.insert(channel_id);
        }

        Ok(JoinResult { channel: channel_id, created, flags })
    }

    /// Remove a client from a channel by its own request. Returns whether the
    /// channel was destroyed as a result.
    pub fn part_channel(&mut self, client: ClientId, channel: ChannelId) -> LookupResult<bool>
    {
        Ok(self.remove_membership(channel, client)?.is_some())
    }

    /// Remove a member from a channel at another's request. Returns whether the
    /// channel was destroyed as a result.
    pub fn kick_member(&mut self, channel: ChannelId, target: ClientId) -> LookupResult<bool>
    {
        Ok(self.remove_membership(channel, target)?.is_some())
    }

    /// Remove both sides of a membership, destroying the channel if it is left
    /// empty. Returns the destroyed channel's name, if any.
    pub(super) fn remove_membership(&mut self, channel_id: ChannelId, client_id: ClientId) -> LookupResult<Option<ChannelName>>
    {
        let channel = self.channels.get_mut(&channel_id).ok_or(LookupError::NoSuchChannel(channel_id))?;
        if channel.members.remove(&client_id).is_none()
        {
            return Err(LookupError::NotAMember(client_id, channel.name));
        }
        let empty = channel.members.is_empty();
        let name = channel.name;

        if let Some(client) = self.clients.get_mut(&client_id)
        {
            client.channels.remove(&channel_id);
        }

        if empty
        {
            self.channels.remove(&channel_id);
            self.channel_index.remove(&name);
            tracing::debug!(id = ?channel_id, %name, "Channel destroyed");
            Ok(Some(name))
        }
        else
        {
            Ok(None)
        }
    }

    pub fn set_topic(&mut self, channel: ChannelId, text: String, setter: &Mask) -> LookupResult<()>
    {
        self.channel_mut(channel)?.topic = Some(state::ChannelTopic {
            text,
            setter: setter.to_string(),
            timestamp: utils::now(),
        });
        Ok(())
    }

    /// Record a one-time invitation, consumed by the invited client's next join
    pub fn add_invite(&mut self, channel: ChannelId, client: ClientId) -> LookupResult<()>
    {
        self.client(client)?;
        self.channel_mut(channel)?.invites.insert(client);
        Ok(())
    }

    /// Apply a parsed sequence of mode changes to a channel.
    ///
    /// Changes that would not alter the channel (setting a mode already set,
    /// adding a duplicate list entry, removing something absent) are dropped,
    /// as are list additions beyond the configured list capacity. Member mode
    /// parameters are normalised to the target's current nickname.
    pub fn apply_channel_modes(&mut self, channel_id: ChannelId, changes: &[ModeChange], setter: &Mask) -> LookupResult<AppliedModes>
    {
        let max_list = self.limits.max_list_entries;
        let mut result = AppliedModes::default();

        for change in changes
        {
            let mut change = change.clone();
            let applied = match change.kind {
                ModeKind::OnOff => {
                    let channel = self.channel_mut(channel_id)?;
                    if change.adding { channel.mode.set(change.letter) } else { channel.mode.clear(change.letter) }
                }
                ModeKind::Param => {
                    let channel = self.channel_mut(channel_id)?;
                    if change.adding
                    {
                        match normalise_param(change.letter, change.param.as_deref()) {
                            Some(value) if channel.params.get(&change.letter) != Some(&value) => {
                                channel.params.insert(change.letter, value.clone());
                                change.param = Some(value);
                                true
                            }
                            _ => false,
                        }
                    }
                    else
                    {
                        channel.params.remove(&change.letter).is_some()
                    }
                }
                ModeKind::List => {
                    let channel = self.channel_mut(channel_id)?;
                    let pattern = match &change.param {
                        Some(p) => Pattern::new(complete_mask(p)),
                        None => continue,
                    };
                    let list = channel.lists.entry(change.letter).or_default();
                    let existing = list.iter().position(|e| e.pattern.eq_ignore_ascii_case(&pattern));
                    change.param = Some(pattern.to_string());

                    match (change.adding, existing) {
                        (true, None) if list.len() < max_list => {
                            list.push(state::ListModeEntry {
                                pattern,
                                setter: setter.to_string(),
                                timestamp: utils::now(),
                            });
                            true
                        }
                        (false, Some(index)) => {
                            list.remove(index);
                            true
                        }
                        _ => false,
                    }
                }
                ModeKind::MemberList => {
                    let flag = match MembershipFlagSet::for_mode_char(change.letter) {
                        Some(f) => f,
                        None => continue,
                    };
                    let nick = change.param.clone().unwrap_or_default();
                    let target = match self.client_by_nick_str(&nick) {
                        Ok(c) => (c.id, c.nick),
                        Err(_) => {
                            result.errors.push(MemberModeError::NoSuchNick(nick));
                            continue;
                        }
                    };
                    let channel = self.channel_mut(channel_id)?;
                    match channel.members.get_mut(&target.0) {
                        Some(flags) => {
                            change.param = Some(target.1.to_string());
                            let before = *flags;
                            flags.set(flag, change.adding);
                            *flags != before
                        }
                        None => {
                            result.errors.push(MemberModeError::NotOnChannel(target.1));
                            continue;
                        }
                    }
                }
            };

            if applied
            {
                result.applied.push(change);
            }
        }

        Ok(result)
    }

    fn channel_mut(&mut self, id: ChannelId) -> LookupResult<&mut state::Channel>
    {
        self.channels.get_mut(&id).ok_or(LookupError::NoSuchChannel(id))
    }
}

/// Validate the value of a parameter mode, returning the form to store
fn normalise_param(letter: char, param: Option<&str>) -> Option<String>
{
    let param = param?;
    match letter {
        letters::KEY => ChannelKey::new_coerce(param).ok().map(|k| k.to_string()),
        letters::LIMIT => param.parse::<usize>().ok().filter(|l| *l > 0).map(|l| l.to_string()),
        _ if param.is_empty() => None,
        _ => Some(param.to_string()),
    }
}
