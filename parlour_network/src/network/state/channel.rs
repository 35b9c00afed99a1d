use crate::prelude::*;

use itertools::Itertools;

use std::collections::{BTreeMap, HashMap, HashSet};

/// A channel
#[derive(Debug, Clone)]
pub struct Channel
{
    pub id: ChannelId,
    pub name: ChannelName,
    /// On/off modes only; parameter and list modes are held separately
    pub mode: ModeSet,
    pub params: BTreeMap<char, String>,
    pub lists: BTreeMap<char, Vec<ListModeEntry>>,
    pub members: HashMap<ClientId, MembershipFlagSet>,
    pub topic: Option<ChannelTopic>,
    /// Clients holding a one-time invitation
    pub invites: HashSet<ClientId>,
    pub created: i64,
}

/// An entry in a list mode
#[derive(Debug, Clone)]
pub struct ListModeEntry
{
    pub pattern: Pattern,
    /// Mask of whoever set the entry; reported as the entry's reason
    pub setter: String,
    pub timestamp: i64,
}

/// A channel topic
#[derive(Debug, Clone)]
pub struct ChannelTopic
{
    pub text: String,
    pub setter: String,
    pub timestamp: i64,
}

impl Channel
{
    pub fn new(id: ChannelId, name: ChannelName, created: i64) -> Self
    {
        Self {
            id,
            name,
            mode: ModeSet::new(),
            params: BTreeMap::new(),
            lists: BTreeMap::new(),
            members: HashMap::new(),
            topic: None,
            invites: HashSet::new(),
            created,
        }
    }

    pub fn has_mode(&self, letter: char) -> bool
    {
        self.mode.is_set(letter)
    }

    pub fn key(&self) -> Option<&str>
    {
        self.params.get(&letters::KEY).map(String::as_str)
    }

    pub fn limit(&self) -> Option<usize>
    {
        self.params.get(&letters::LIMIT).and_then(|l| l.parse().ok())
    }

    pub fn list(&self, letter: char) -> &[ListModeEntry]
    {
        self.lists.get(&letter).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Does the given identity match any entry in the given list?
    pub fn list_matches(&self, letter: char, mask: &Mask) -> bool
    {
        self.list(letter).iter().any(|e| mask.matches(&e.pattern))
    }

    pub fn membership(&self, client: ClientId) -> Option<MembershipFlagSet>
    {
        self.members.get(&client).copied()
    }

    pub fn is_secret(&self) -> bool
    {
        self.has_mode(letters::SECRET) || self.has_mode(letters::PRIVATE)
    }

    /// Mode string for RPL_CHANNELMODEIS; parameter values are shown only to members
    pub fn mode_string(&self, show_params: bool) -> String
    {
        let mut modes = format!("+{}", self.mode.to_chars());
        let mut params = Vec::new();
        for (letter, value) in &self.params {
            modes.push(*letter);
            if show_params {
                params.push(value.as_str());
            }
        }
        std::iter::once(modes.as_str()).chain(params).join(" ")
    }
}
