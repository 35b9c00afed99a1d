use super::*;
use crate::config::{BanConfig, BanEntry};

use std::net::IpAddr;

/// Decides whether a connecting client is refused by a configured ban
pub trait RegistrationPolicyService
{
    /// Find a ban matching a requested nickname
    fn nick_ban(&self, nick: &Nickname) -> Option<&BanEntry>;

    /// Find a ban matching a newly accepted connection's address
    fn address_ban(&self, ip: &IpAddr) -> Option<&BanEntry>;

    /// Find a ban matching a connection's address, username or hostname
    fn connection_ban(&self, user: &Username, host: &Hostname, ip: &IpAddr) -> Option<&BanEntry>;
}

/// Standard implementation of [`RegistrationPolicyService`]
pub struct StandardRegistrationPolicy
{
    bans: BanConfig,
}

impl StandardRegistrationPolicy
{
    pub fn new(bans: BanConfig) -> Self
    {
        Self { bans }
    }
}

impl RegistrationPolicyService for StandardRegistrationPolicy
{
    fn nick_ban(&self, nick: &Nickname) -> Option<&BanEntry>
    {
        self.bans.nicks.iter().find(|b| b.pattern.matches(nick.as_str()))
    }

    fn address_ban(&self, ip: &IpAddr) -> Option<&BanEntry>
    {
        let ip = ip.to_string();
        self.bans.ips.iter().find(|b| b.pattern.matches(&ip))
    }

    fn connection_ban(&self, user: &Username, host: &Hostname, ip: &IpAddr) -> Option<&BanEntry>
    {
        if let Some(ban) = self.address_ban(ip)
        {
            return Some(ban);
        }

        let ip = ip.to_string();

        let by_host = format!("{}@{}", user, host);
        let by_ip = format!("{}@{}", user, ip);
        self.bans
            .user_hosts
            .iter()
            .find(|b| b.pattern.matches(&by_host) || b.pattern.matches(&by_ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn ban(pattern: &str) -> BanEntry {
        BanEntry { pattern: Pattern::new(pattern.to_string()), reason: "no".to_string() }
    }

    #[test]
    fn matches_each_list() {
        let policy = StandardRegistrationPolicy::new(BanConfig {
            nicks: vec![ban("bad*")],
            ips: vec![ban("192.0.2.*")],
            user_hosts: vec![ban("evil@*.example")],
        });

        assert!(policy.nick_ban(&Nickname::from_str("BadNick").unwrap()).is_some());
        assert!(policy.nick_ban(&Nickname::from_str("good").unwrap()).is_none());

        let user = Username::from_str("evil").unwrap();
        let host = Hostname::from_str("box.example").unwrap();
        let other_host = Hostname::from_str("box.test").unwrap();
        let ip: IpAddr = "198.51.100.1".parse().unwrap();
        let banned_ip: IpAddr = "192.0.2.7".parse().unwrap();

        assert!(policy.connection_ban(&user, &host, &ip).is_some());
        assert!(policy.connection_ban(&user, &other_host, &ip).is_none());
        assert!(policy.connection_ban(&Username::from_str("fine").unwrap(), &other_host, &banned_ip).is_some());
        assert!(policy.address_ban(&banned_ip).is_some());
        assert!(policy.address_ban(&ip).is_none());
    }
}
