//! Defines mode flag sets and the catalog of recognised mode letters

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

mod catalog;
pub use catalog::*;

mod parse;
pub use parse::*;

/// Well-known mode letters referred to by policy code
pub mod letters
{
    pub const INVITE_ONLY: char = 'i';
    pub const MODERATED: char = 'm';
    pub const NO_EXTERNAL: char = 'n';
    pub const SECRET: char = 's';
    pub const PRIVATE: char = 'p';
    pub const TOPIC_LOCK: char = 't';
    pub const OPER_ONLY: char = 'O';

    pub const KEY: char = 'k';
    pub const LIMIT: char = 'l';

    pub const BAN: char = 'b';
    pub const EXCEPT: char = 'e';
    pub const INVEX: char = 'I';

    pub const INVISIBLE: char = 'i';
    pub const WALLOPS: char = 'w';
    pub const OPER: char = 'o';
}

/// A set of mode letters, one bit per ASCII letter.
///
/// `a`-`z` occupy the low 32 bits and `A`-`Z` the high 32.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModeSet(u64);

impl ModeSet
{
    pub fn new() -> Self
    {
        Self(0)
    }

    fn bit_for(letter: char) -> Option<u64>
    {
        match letter {
            'a'..='z' => Some(1u64 << (letter as u32 - 'a' as u32)),
            'A'..='Z' => Some(1u64 << (32 + (letter as u32 - 'A' as u32))),
            _ => None,
        }
    }

    pub fn is_set(&self, letter: char) -> bool
    {
        match Self::bit_for(letter) {
            Some(bit) => self.0 & bit != 0,
            None => false,
        }
    }

    /// Set a letter. Returns `true` if the set changed.
    pub fn set(&mut self, letter: char) -> bool
    {
        match Self::bit_for(letter) {
            Some(bit) if self.0 & bit == 0 => {
                self.0 |= bit;
                true
            }
            _ => false,
        }
    }

    /// Clear a letter. Returns `true` if the set changed.
    pub fn clear(&mut self, letter: char) -> bool
    {
        match Self::bit_for(letter) {
            Some(bit) if self.0 & bit != 0 => {
                self.0 &= !bit;
                true
            }
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool
    {
        self.0 == 0
    }

    /// The set letters, in ASCII order
    pub fn iter(&self) -> impl Iterator<Item = char> + '_
    {
        ('A'..='Z').chain('a'..='z').filter(move |c| self.is_set(*c))
    }

    /// Canonical string form, e.g. `"Oint"`
    pub fn to_chars(&self) -> String
    {
        self.iter().collect()
    }
}

impl FromIterator<char> for ModeSet
{
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self
    {
        let mut ret = Self::new();
        for c in iter {
            ret.set(c);
        }
        ret
    }
}

/// How much authority a channel member holds, derived from their role bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
pub enum MemberRank
{
    Member,
    Voice,
    HalfOp,
    Op,
    Admin,
    Owner,
}

bitflags! {
    /// Role bits held by one member of one channel. Each bit is independent.
    #[derive(Default)]
    pub struct MembershipFlagSet: u8
    {
        const MEMBER = 0x01;
        const VOICE  = 0x02;
        const HALFOP = 0x04;
        const OP     = 0x08;
        const ADMIN  = 0x10;
        const OWNER  = 0x20;
    }
}

/// (flag, mode letter, prefix, rank), highest precedence first
const MEMBERSHIP_FLAGS: [(MembershipFlagSet, char, char, MemberRank); 5] = [
    (MembershipFlagSet::OWNER, 'q', '~', MemberRank::Owner),
    (MembershipFlagSet::ADMIN, 'a', '&', MemberRank::Admin),
    (MembershipFlagSet::OP, 'o', '@', MemberRank::Op),
    (MembershipFlagSet::HALFOP, 'h', '%', MemberRank::HalfOp),
    (MembershipFlagSet::VOICE, 'v', '+', MemberRank::Voice),
];

impl MembershipFlagSet
{
    /// Role flags in display precedence order, with their mode letters and prefixes
    pub fn all_roles() -> impl Iterator<Item = (MembershipFlagSet, char, char)>
    {
        MEMBERSHIP_FLAGS.iter().map(|(f, m, p, _)| (*f, *m, *p))
    }

    pub fn for_mode_char(letter: char) -> Option<Self>
    {
        MEMBERSHIP_FLAGS.iter().find(|e| e.1 == letter).map(|e| e.0)
    }

    /// The rank conferred by a single role flag
    pub fn rank_of(flag: MembershipFlagSet) -> MemberRank
    {
        MEMBERSHIP_FLAGS
            .iter()
            .find(|e| e.0 == flag)
            .map(|e| e.3)
            .unwrap_or(MemberRank::Member)
    }

    /// The highest rank held
    pub fn rank(&self) -> MemberRank
    {
        MEMBERSHIP_FLAGS
            .iter()
            .find(|e| self.contains(e.0))
            .map(|e| e.3)
            .unwrap_or(MemberRank::Member)
    }

    /// The prefix character for the highest role held, if any
    pub fn highest_prefix(&self) -> Option<char>
    {
        MEMBERSHIP_FLAGS.iter().find(|e| self.contains(e.0)).map(|e| e.2)
    }

    pub fn to_prefixes(&self) -> String
    {
        self.highest_prefix().map(String::from).unwrap_or_default()
    }
}

bitflags! {
    /// Capabilities granted by operator authentication
    #[derive(Default)]
    pub struct Privileges: u32
    {
        const KILL        = 0x01;
        const DIE         = 0x02;
        const RESTART     = 0x04;
        /// Exempt from the flood governor
        const UNTHROTTLED = 0x08;
        /// May join channels marked operator-only
        const OPER_CHANNELS = 0x10;
    }
}

impl Privileges
{
    /// The privileges held by every authenticated operator
    pub fn standard_oper() -> Self
    {
        Self::KILL | Self::OPER_CHANNELS
    }

    /// The privileges held by super-operators
    pub fn super_oper() -> Self
    {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_set_halves() {
        let mut set = ModeSet::new();
        assert!(set.set('a'));
        assert!(set.set('z'));
        assert!(set.set('A'));
        assert!(set.set('Z'));
        assert!(!set.set('a'));
        assert!(set.is_set('Z'));
        assert!(!set.is_set('B'));
        assert_eq!(set.to_chars(), "AZaz");

        assert!(set.clear('Z'));
        assert!(!set.clear('Z'));
        assert!(!set.is_set('Z'));
        assert!(set.is_set('z'));
        assert!(!set.set('1'));
    }

    #[test]
    fn member_rank_precedence() {
        let flags = MembershipFlagSet::MEMBER | MembershipFlagSet::VOICE | MembershipFlagSet::OP;
        assert_eq!(flags.rank(), MemberRank::Op);
        assert_eq!(flags.to_prefixes(), "@");
        assert_eq!(MembershipFlagSet::MEMBER.rank(), MemberRank::Member);
        assert!(MemberRank::Owner > MemberRank::Admin);
        assert!(MemberRank::HalfOp > MemberRank::Voice);
    }
}
