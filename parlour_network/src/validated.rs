//! Defines validated string types for various names and identifiers

use arrayvec::ArrayString;
use std::{
    cmp::Ordering,
    convert::TryFrom,
    hash::{Hash, Hasher},
    net::IpAddr,
    str::FromStr,
};
use thiserror::Error;

/// Base trait for validated string types.
pub trait Validated: TryFrom<String> + Into<String> + FromStr + Sized
{
    type Error: std::error::Error;

    /// Maximum permitted length, in bytes
    const LENGTH: usize;

    /// Check whether the provided value is valid according to this type's
    /// rules.
    fn validate(value: &str) -> Result<(), <Self as Validated>::Error>;

    /// Access the raw stored value
    fn value(&self) -> &str;

    /// Attempt to convert from anything that can be converted to a string.
    fn convert(arg: impl ToString) -> Result<Self, <Self as Validated>::Error>;
}

pub struct StringValidationError(String);
type StringValidationResult = Result<(), StringValidationError>;

fn check_allowed_chars(value: &str, allowed_chars: &[&str]) -> StringValidationResult
{
    for c in value.chars() {
        if !allowed_chars.iter().any(|s| s.contains(c)) {
            return Err(StringValidationError(value.to_string()));
        }
    }
    Ok(())
}

const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGIT: &str = "0123456789";
const NAME_SPECIAL: &str = "-_\\|[]{}^`";

/// The identity predicate shared by nicknames and usernames: non-empty, first
/// character alphabetic, the rest alphanumeric or one of a fixed punctuation set.
pub fn is_valid_identifier(value: &str, max_len: usize) -> bool
{
    match value.chars().next() {
        Some(first) if first.is_ascii_alphabetic() => (),
        _ => return false,
    }
    value.len() <= max_len && check_allowed_chars(value, &[LOWER, UPPER, DIGIT, NAME_SPECIAL]).is_ok()
}

macro_rules! casefold_impls {
    ($name:ident casefolded) => {
        impl PartialEq for $name
        {
            fn eq(&self, other: &Self) -> bool
            {
                self.0.eq_ignore_ascii_case(&other.0)
            }
        }

        impl Eq for $name {}

        impl Hash for $name
        {
            fn hash<H: Hasher>(&self, state: &mut H)
            {
                for b in self.0.bytes() {
                    state.write_u8(b.to_ascii_lowercase());
                }
            }
        }

        impl Ord for $name
        {
            fn cmp(&self, other: &Self) -> Ordering
            {
                let lhs = self.0.bytes().map(|b| b.to_ascii_lowercase());
                let rhs = other.0.bytes().map(|b| b.to_ascii_lowercase());
                lhs.cmp(rhs)
            }
        }
    };
    ($name:ident) => {
        impl PartialEq for $name
        {
            fn eq(&self, other: &Self) -> bool
            {
                self.0 == other.0
            }
        }

        impl Eq for $name {}

        impl Hash for $name
        {
            fn hash<H: Hasher>(&self, state: &mut H)
            {
                self.0.hash(state)
            }
        }

        impl Ord for $name
        {
            fn cmp(&self, other: &Self) -> Ordering
            {
                self.0.cmp(&other.0)
            }
        }
    };
}

macro_rules! define_validated {
    ($(
        $name:ident ($len:literal $($fold:ident)?) |$value:ident| $body:block
    )*) => {
        $(
            #[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
            #[serde(try_from = "String", into = "String")]
            pub struct $name(ArrayString<$len>);

            casefold_impls!($name $($fold)?);

            impl PartialOrd for $name
            {
                fn partial_cmp(&self, other: &Self) -> Option<Ordering>
                {
                    Some(self.cmp(other))
                }
            }

            impl Validated for $name
            {
                type Error = InvalidNameError;

                const LENGTH: usize = $len;

                fn validate($value: &str) -> Result<(), InvalidNameError> $body

                fn value(&self) -> &str
                {
                    self.0.as_str()
                }

                fn convert(arg: impl ToString) -> Result<Self, InvalidNameError>
                {
                    Self::from_str(&arg.to_string())
                }
            }

            impl $name
            {
                fn error(s: impl ToString) -> Result<(), InvalidNameError>
                {
                    Err(InvalidNameError { kind: stringify!($name), value: s.to_string() })
                }

                pub fn as_str(&self) -> &str
                {
                    self.0.as_str()
                }
            }

            impl FromStr for $name
            {
                type Err = InvalidNameError;

                fn from_str(arg: &str) -> Result<Self, InvalidNameError>
                {
                    Self::validate(arg)?;
                    ArrayString::from(arg)
                        .map(Self)
                        .map_err(|_| InvalidNameError { kind: stringify!($name), value: arg.to_string() })
                }
            }

            impl TryFrom<String> for $name
            {
                type Error = InvalidNameError;

                fn try_from(arg: String) -> Result<Self, InvalidNameError>
                {
                    Self::from_str(&arg)
                }
            }

            impl From<$name> for String
            {
                fn from(arg: $name) -> String
                {
                    arg.0.to_string()
                }
            }

            impl AsRef<str> for $name
            {
                fn as_ref(&self) -> &str
                {
                    self.0.as_str()
                }
            }

            impl std::fmt::Display for $name
            {
                fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result
                {
                    self.0.fmt(f)
                }
            }
        )*
    };
}

/// A string failed validation for the named type
#[derive(Debug, Clone, Error)]
#[error("Invalid value for {kind}: {value}")]
pub struct InvalidNameError
{
    pub kind: &'static str,
    pub value: String,
}

impl From<StringValidationError> for InvalidNameError
{
    fn from(e: StringValidationError) -> Self
    {
        Self { kind: "name", value: e.0 }
    }
}

define_validated! {
    Nickname(30 casefolded) |value| {
        if is_valid_identifier(value, Self::LENGTH) {
            Ok(())
        } else {
            Self::error(value)
        }
    }

    Username(10) |value| {
        if is_valid_identifier(value, Self::LENGTH) {
            Ok(())
        } else {
            Self::error(value)
        }
    }

    Hostname(64) |value| {
        if value.is_empty() || value.starts_with(':') {
            return Self::error(value);
        }
        check_allowed_chars(value, &[LOWER, UPPER, DIGIT, "-.:"])?;
        Ok(())
    }

    ChannelName(50 casefolded) |value| {
        if value.len() < 2 || !(value.starts_with('#') || value.starts_with('&')) {
            return Self::error(value);
        }
        if value.chars().any(|c| c == ' ' || c == ',' || c == '\x07' || c.is_control()) {
            return Self::error(value);
        }
        Ok(())
    }

    ServerName(64) |value| {
        check_allowed_chars(value, &[UPPER, LOWER, DIGIT, "_-."])?;
        if let Some(first) = value.chars().next() {
            if DIGIT.contains(first) || first == '-' {
                return Self::error(value);
            }
        } else {
            return Self::error(value);
        }
        Ok(())
    }

    ChannelKey(23) |value| {
        for c in value.chars() {
            // less than 0x20 (' ') is control chars, greater than 0x7E (~) is outside of ascii
            // colon, comma and space break protocol parsing
            if c <= ' ' || c > '~' || c == ':' || c == ',' {
                return Self::error(value);
            }
        }
        if value.is_empty() {
            return Self::error(value);
        }
        Ok(())
    }
}

impl Hostname
{
    /// Construct a hostname from an IP address, for clients whose address has
    /// no usable reverse record
    pub fn from_ip(addr: IpAddr) -> Result<Self, InvalidNameError>
    {
        let text = addr.to_string();
        if text.starts_with(':') {
            Self::from_str(&format!("0{}", text))
        } else {
            Self::from_str(&text)
        }
    }
}

impl ChannelKey
{
    pub fn new_coerce(s: &str) -> Result<Self, InvalidNameError>
    {
        let mut s = s.to_string();
        s.retain(|c| c > ' ' && c <= '~' && c != ':' && c != ',');
        s.truncate(Self::LENGTH);
        Self::from_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nickname_rules() {
        assert!(Nickname::from_str("alice").is_ok());
        assert!(Nickname::from_str("a[b]-c_d\\e|f^g`h{}").is_ok());
        assert!(Nickname::from_str("").is_err());
        assert!(Nickname::from_str("1alice").is_err());
        assert!(Nickname::from_str("_alice").is_err());
        assert!(Nickname::from_str("al ice").is_err());
        assert!(Nickname::from_str(&"a".repeat(31)).is_err());
    }

    #[test]
    fn casefolded_equality() {
        let a = Nickname::from_str("Alice").unwrap();
        let b = Nickname::from_str("aLICE").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "Alice");

        let c1 = ChannelName::from_str("#Test").unwrap();
        let c2 = ChannelName::from_str("#test").unwrap();
        assert_eq!(c1, c2);
    }

    #[test]
    fn channel_names() {
        assert!(ChannelName::from_str("#a").is_ok());
        assert!(ChannelName::from_str("&local").is_ok());
        assert!(ChannelName::from_str("#").is_err());
        assert!(ChannelName::from_str("test").is_err());
        assert!(ChannelName::from_str("#a,b").is_err());
    }

    #[test]
    fn ipv6_hostname() {
        let h = Hostname::from_ip("::1".parse().unwrap()).unwrap();
        assert_eq!(h.as_str(), "0::1");
    }

    #[test]
    fn deserialize_validates() {
        assert!(serde_json::from_str::<Nickname>("\"bob\"").is_ok());
        assert!(serde_json::from_str::<Nickname>("\"9bob\"").is_err());
    }
}
