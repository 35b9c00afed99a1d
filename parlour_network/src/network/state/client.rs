use crate::prelude::*;

use std::collections::HashSet;
use std::net::IpAddr;

/// A registered client
#[derive(Debug, Clone)]
pub struct Client
{
    pub id: ClientId,
    pub nick: Nickname,
    pub user: Username,
    pub host: Hostname,
    pub realname: String,
    pub ip: IpAddr,
    pub mode: ModeSet,
    pub privileges: Privileges,
    pub oper_name: Option<String>,
    pub away: Option<String>,
    pub channels: HashSet<ChannelId>,
    /// Name of the connection class this client is attached to
    pub class: String,
    pub signon: i64,
}

/// Details required to introduce a client to the network
#[derive(Debug, Clone)]
pub struct NewClient
{
    pub nick: Nickname,
    pub user: Username,
    pub host: Hostname,
    pub realname: String,
    pub ip: IpAddr,
    pub class: String,
}

impl Client
{
    pub fn mask(&self) -> Mask
    {
        Mask::new(self.nick, self.user, self.host)
    }

    pub fn has_privilege(&self, privilege: Privileges) -> bool
    {
        self.privileges.contains(privilege)
    }

    pub fn is_oper(&self) -> bool
    {
        self.mode.is_set(letters::OPER)
    }

    /// `+modes` string for RPL_UMODEIS
    pub fn mode_string(&self) -> String
    {
        format!("+{}", self.mode.to_chars())
    }
}
