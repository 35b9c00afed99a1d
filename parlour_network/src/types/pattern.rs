//! IRC-style glob matching.
//!
//! Permitted wildcards are `*` (match zero or more characters) and `?` (match
//! exactly one character). A backslash makes the following character literal,
//! so `\*` matches only an asterisk. Matching is always ASCII case-insensitive.

use std::fmt::Display;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// A wildcard pattern
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct Pattern(String);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token
{
    Literal(char),
    AnyOne,
    AnyMany,
}

impl Deref for Pattern
{
    type Target = String;

    fn deref(&self) -> &String
    {
        &self.0
    }
}

impl Display for Pattern
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result
    {
        self.0.fmt(f)
    }
}

impl PartialEq<str> for Pattern
{
    fn eq(&self, other: &str) -> bool
    {
        self.0 == other
    }
}

impl Pattern
{
    /// Construct a `Pattern`
    pub fn new(s: String) -> Self
    {
        Self(s)
    }

    /// Does this pattern contain no unescaped wildcard characters?
    pub fn is_literal(&self) -> bool
    {
        tokenise(&self.0).iter().all(|t| matches!(t, Token::Literal(_)))
    }

    /// Test whether the given string matches this pattern. Note that this is always
    /// case-insensitive
    pub fn matches(&self, s: &str) -> bool
    {
        glob_match(&tokenise(&self.0), &s.chars().collect::<Vec<_>>())
    }
}

fn tokenise(pattern: &str) -> Vec<Token>
{
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        let token = match c {
            '*' => Token::AnyMany,
            '?' => Token::AnyOne,
            // A trailing backslash escapes nothing, so stands for itself
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            c => Token::Literal(c),
        };
        // Runs of '*' are equivalent to one
        if token == Token::AnyMany && tokens.last() == Some(&Token::AnyMany) {
            continue;
        }
        tokens.push(token);
    }
    tokens
}

fn glob_match(pattern: &[Token], text: &[char]) -> bool
{
    let (mut p, mut t) = (0, 0);
    // Position of the last '*' seen, and the text offset it was tried against
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some(Token::AnyMany) => {
                backtrack = Some((p, t));
                p += 1;
                continue;
            }
            Some(Token::AnyOne) => {
                p += 1;
                t += 1;
                continue;
            }
            Some(Token::Literal(c)) if c.eq_ignore_ascii_case(&text[t]) => {
                p += 1;
                t += 1;
                continue;
            }
            _ => (),
        }

        match backtrack {
            Some((star, tried)) => {
                p = star + 1;
                t = tried + 1;
                backtrack = Some((star, tried + 1));
            }
            None => return false,
        }
    }

    pattern[p..].iter().all(|t| *t == Token::AnyMany)
}
