use super::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// The argument shape of a mode letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum ModeKind
{
    /// A boolean flag
    OnOff,
    /// Takes one value when set
    Param,
    /// Adds or removes wildcard mask entries
    List,
    /// Targets one member's role bit
    MemberList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDefinition
{
    pub letter: char,
    pub kind: ModeKind,
    /// Whether clearing this mode also consumes a parameter
    #[serde(default)]
    pub param_on_unset: bool,
}

impl ModeDefinition
{
    pub fn new(letter: char, kind: ModeKind) -> Self
    {
        Self { letter, kind, param_on_unset: false }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError
{
    #[error("Mode letter {0} is already defined")]
    Duplicate(char),
    #[error("Mode letter {0} is not an ASCII letter")]
    NotALetter(char),
    #[error("Member modes are not valid for users ({0})")]
    MemberModeForUser(char),
}

/// The registry of recognised channel and user mode letters.
///
/// A catalog is assembled with a [`ModeCatalogBuilder`] at startup and is
/// immutable thereafter; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ModeCatalog
{
    channel: BTreeMap<char, ModeDefinition>,
    user: BTreeMap<char, ModeDefinition>,
}

#[derive(Debug, Default)]
pub struct ModeCatalogBuilder
{
    channel: BTreeMap<char, ModeDefinition>,
    user: BTreeMap<char, ModeDefinition>,
}

impl ModeCatalogBuilder
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// A builder pre-populated with the standard mode letters
    pub fn standard() -> Self
    {
        use ModeKind::*;

        let mut ret = Self::new();
        for c in ['i', 'm', 'n', 'p', 's', 't', 'O'] {
            ret.channel.insert(c, ModeDefinition::new(c, OnOff));
        }
        ret.channel.insert(letters::KEY, ModeDefinition { letter: letters::KEY, kind: Param, param_on_unset: true });
        ret.channel.insert(letters::LIMIT, ModeDefinition::new(letters::LIMIT, Param));
        for c in [letters::BAN, letters::EXCEPT, letters::INVEX] {
            ret.channel.insert(c, ModeDefinition::new(c, List));
        }
        for (_, c, _) in MembershipFlagSet::all_roles() {
            ret.channel.insert(c, ModeDefinition::new(c, MemberList));
        }

        for c in [letters::INVISIBLE, letters::WALLOPS, letters::OPER] {
            ret.user.insert(c, ModeDefinition::new(c, OnOff));
        }
        ret
    }

    fn check_letter(letter: char) -> Result<(), CatalogError>
    {
        if letter.is_ascii_alphabetic() {
            Ok(())
        } else {
            Err(CatalogError::NotALetter(letter))
        }
    }

    pub fn add_channel_mode(&mut self, def: ModeDefinition) -> Result<&mut Self, CatalogError>
    {
        Self::check_letter(def.letter)?;
        if self.channel.contains_key(&def.letter) {
            return Err(CatalogError::Duplicate(def.letter));
        }
        self.channel.insert(def.letter, def);
        Ok(self)
    }

    pub fn add_user_mode(&mut self, def: ModeDefinition) -> Result<&mut Self, CatalogError>
    {
        Self::check_letter(def.letter)?;
        if def.kind == ModeKind::MemberList {
            return Err(CatalogError::MemberModeForUser(def.letter));
        }
        if self.user.contains_key(&def.letter) {
            return Err(CatalogError::Duplicate(def.letter));
        }
        self.user.insert(def.letter, def);
        Ok(self)
    }

    pub fn build(self) -> ModeCatalog
    {
        ModeCatalog {
            channel: self.channel,
            user: self.user,
        }
    }
}

impl ModeCatalog
{
    pub fn standard() -> Self
    {
        ModeCatalogBuilder::standard().build()
    }

    pub fn channel_mode(&self, letter: char) -> Option<&ModeDefinition>
    {
        self.channel.get(&letter)
    }

    pub fn user_mode(&self, letter: char) -> Option<&ModeDefinition>
    {
        self.user.get(&letter)
    }

    fn channel_letters(&self, kind: ModeKind) -> String
    {
        self.channel.values().filter(|d| d.kind == kind).map(|d| d.letter).collect()
    }

    /// Every list-kind channel mode letter
    pub fn list_modes(&self) -> impl Iterator<Item = char> + '_
    {
        self.channel.values().filter(|d| d.kind == ModeKind::List).map(|d| d.letter)
    }

    /// The four comma-separated groups advertised as `CHANMODES`
    pub fn chanmodes_token(&self) -> String
    {
        let always_param: String = self
            .channel
            .values()
            .filter(|d| d.kind == ModeKind::Param && d.param_on_unset)
            .map(|d| d.letter)
            .collect();
        let set_param: String = self
            .channel
            .values()
            .filter(|d| d.kind == ModeKind::Param && !d.param_on_unset)
            .map(|d| d.letter)
            .collect();

        format!(
            "{},{},{},{}",
            self.channel_letters(ModeKind::List),
            always_param,
            set_param,
            self.channel_letters(ModeKind::OnOff)
        )
    }

    /// The `PREFIX` token, e.g. `(qaohv)~&@%+`
    pub fn prefix_token(&self) -> String
    {
        let (modes, prefixes): (String, String) = MembershipFlagSet::all_roles()
            .filter(|(_, c, _)| self.channel.contains_key(c))
            .map(|(_, c, p)| (c, p))
            .unzip();
        format!("({}){}", modes, prefixes)
    }

    /// User mode letters, as advertised in `MYINFO`
    pub fn user_mode_letters(&self) -> String
    {
        self.user.keys().collect()
    }

    /// Channel mode letters, as advertised in `MYINFO`
    pub fn channel_mode_letters(&self) -> String
    {
        self.channel.keys().collect()
    }

    /// Channel mode letters that take a parameter, as advertised in `MYINFO`
    pub fn channel_param_letters(&self) -> String
    {
        self.channel.values().filter(|d| d.kind != ModeKind::OnOff).map(|d| d.letter).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_tokens() {
        let catalog = ModeCatalog::standard();
        assert_eq!(catalog.chanmodes_token(), "Ibe,k,l,Oimnpst");
        assert_eq!(catalog.prefix_token(), "(qaohv)~&@%+");
        assert_eq!(catalog.channel_mode(letters::KEY).map(|d| d.param_on_unset), Some(true));
        assert!(catalog.user_mode('o').is_some());
        assert!(catalog.user_mode('v').is_none());
    }

    #[test]
    fn extension_before_freeze() {
        let mut builder = ModeCatalogBuilder::standard();
        builder.add_channel_mode(ModeDefinition::new('c', ModeKind::OnOff)).unwrap();
        assert!(matches!(
            builder.add_channel_mode(ModeDefinition::new('n', ModeKind::OnOff)),
            Err(CatalogError::Duplicate('n'))
        ));
        assert!(builder.add_user_mode(ModeDefinition::new('x', ModeKind::MemberList)).is_err());

        let catalog = builder.build();
        assert_eq!(catalog.channel_mode('c').map(|d| d.kind), Some(ModeKind::OnOff));
    }
}
