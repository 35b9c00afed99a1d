use super::Pattern;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;
use std::hash::{Hash, Hasher};

/// The `nick!user@host` identity of a client.
///
/// Equality, ordering and hashing ignore ASCII case and consider the host
/// first, then the user, then the nick. A `Mask` is a snapshot: copying one
/// out of a client record (e.g. as a topic setter) does not track later
/// nick changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mask
{
    pub nick: String,
    pub user: String,
    pub host: String,
}

impl Mask
{
    pub fn new(nick: impl ToString, user: impl ToString, host: impl ToString) -> Self
    {
        Self {
            nick: nick.to_string(),
            user: user.to_string(),
            host: host.to_string(),
        }
    }

    /// Split a `nick!user@host` string. Missing segments are left empty.
    pub fn parse(s: &str) -> Self
    {
        let (nick, rest) = s.split_once('!').unwrap_or((s, ""));
        let (user, host) = rest.split_once('@').unwrap_or((rest, ""));
        Self::new(nick, user, host)
    }

    /// Test this identity against a (possibly partial) wildcard mask
    pub fn matches(&self, pattern: &str) -> bool
    {
        wildcard_compare(&self.to_string(), &complete_mask(pattern))
    }

    /// The `user@host` portion
    pub fn user_host(&self) -> String
    {
        format!("{}@{}", self.user, self.host)
    }

    fn folded(&self) -> [String; 3]
    {
        [
            self.host.to_ascii_lowercase(),
            self.user.to_ascii_lowercase(),
            self.nick.to_ascii_lowercase(),
        ]
    }
}

impl Display for Mask
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result
    {
        write!(f, "{}!{}@{}", self.nick, self.user, self.host)
    }
}

impl PartialEq for Mask
{
    fn eq(&self, other: &Self) -> bool
    {
        self.host.eq_ignore_ascii_case(&other.host)
            && self.user.eq_ignore_ascii_case(&other.user)
            && self.nick.eq_ignore_ascii_case(&other.nick)
    }
}

impl Eq for Mask {}

impl PartialOrd for Mask
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering>
    {
        Some(self.cmp(other))
    }
}

impl Ord for Mask
{
    fn cmp(&self, other: &Self) -> Ordering
    {
        self.folded().cmp(&other.folded())
    }
}

impl Hash for Mask
{
    fn hash<H: Hasher>(&self, state: &mut H)
    {
        self.folded().hash(state)
    }
}

/// Case-insensitive glob comparison of `text` against `pattern`
pub fn wildcard_compare(text: &str, pattern: &str) -> bool
{
    Pattern::new(pattern.to_string()).matches(text)
}

/// Fill in the missing `nick!` and `user@` segments of a partial mask.
///
/// A bare word containing `.` or `:` is taken as a host, anything else as a nick.
pub fn complete_mask(s: &str) -> String
{
    match (s.contains('!'), s.contains('@')) {
        (true, true) => s.to_string(),
        (false, true) => format!("*!{}", s),
        (true, false) => format!("{}@*", s),
        (false, false) => {
            if s.contains('.') || s.contains(':') {
                format!("*!*@{}", s)
            } else {
                format!("{}!*@*", s)
            }
        }
    }
}
