use super::*;

/// Which catalog table a mode string is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTarget
{
    Channel,
    User,
}

/// One requested mode change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeChange
{
    pub adding: bool,
    pub letter: char,
    pub kind: ModeKind,
    pub param: Option<String>,
}

/// The result of tokenising a mode command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedModes
{
    pub changes: Vec<ModeChange>,
    /// List modes given without a parameter, which request the list contents
    pub list_queries: Vec<char>,
    /// Letters not in the catalog; these are skipped, not fatal
    pub unknown: Vec<char>,
}

/// Resolve a mode string and its parameters against the catalog.
///
/// `tokens[0]` is the mode string; parameter-consuming letters take the
/// following tokens in order. At most `max_param_modes` parameter-consuming
/// changes are accepted; letters beyond that are ignored.
pub fn parse_mode_tokens<S: AsRef<str>>(
    catalog: &ModeCatalog,
    target: ModeTarget,
    tokens: &[S],
    max_param_modes: usize,
) -> ParsedModes
{
    let mut ret = ParsedModes::default();

    let Some(modestring) = tokens.first() else {
        return ret;
    };
    let mut params = tokens[1..].iter().map(|s| s.as_ref());
    let mut adding = true;
    let mut param_changes = 0;

    for letter in modestring.as_ref().chars() {
        match letter {
            '+' => {
                adding = true;
                continue;
            }
            '-' => {
                adding = false;
                continue;
            }
            _ => (),
        }

        let def = match target {
            ModeTarget::Channel => catalog.channel_mode(letter),
            ModeTarget::User => catalog.user_mode(letter),
        };
        let Some(def) = def else {
            ret.unknown.push(letter);
            continue;
        };

        let takes_param = match def.kind {
            ModeKind::OnOff => false,
            ModeKind::Param => adding || def.param_on_unset,
            ModeKind::List | ModeKind::MemberList => true,
        };

        if !takes_param {
            ret.changes.push(ModeChange { adding, letter, kind: def.kind, param: None });
            continue;
        }

        if param_changes >= max_param_modes {
            continue;
        }

        let param = params.next().map(str::to_string);
        match (def.kind, param) {
            (ModeKind::List, None) => {
                if !ret.list_queries.contains(&letter) {
                    ret.list_queries.push(letter);
                }
            }
            (ModeKind::Param, None) if !adding => {
                // The unset-with-parameter letter still clears without one
                ret.changes.push(ModeChange { adding, letter, kind: def.kind, param: None });
            }
            (_, None) => (),
            (kind, Some(param)) => {
                param_changes += 1;
                ret.changes.push(ModeChange { adding, letter, kind, param: Some(param) });
            }
        }
    }

    ret
}

/// Format applied changes as a mode string and parameters, e.g. `+o-v alice alice`
pub fn format_mode_changes(changes: &[ModeChange]) -> String
{
    let mut modes = String::new();
    let mut params = Vec::new();
    let mut polarity = None;

    for change in changes {
        if polarity != Some(change.adding) {
            modes.push(if change.adding { '+' } else { '-' });
            polarity = Some(change.adding);
        }
        modes.push(change.letter);
        if let Some(param) = &change.param {
            params.push(param.as_str());
        }
    }

    std::iter::once(modes.as_str()).chain(params).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn change(adding: bool, letter: char, kind: ModeKind, param: Option<&str>) -> ModeChange {
        ModeChange { adding, letter, kind, param: param.map(str::to_string) }
    }

    #[test]
    fn single_ban() {
        let catalog = ModeCatalog::standard();
        let parsed = parse_mode_tokens(&catalog, ModeTarget::Channel, &["+b", "*!*@evil.com"], 4);
        assert_eq!(parsed.changes, vec![change(true, 'b', ModeKind::List, Some("*!*@evil.com"))]);
        assert!(parsed.list_queries.is_empty());
    }

    #[test]
    fn mixed_polarity() {
        let catalog = ModeCatalog::standard();
        let parsed = parse_mode_tokens(&catalog, ModeTarget::Channel, &["+o-v", "alice", "alice"], 4);
        assert_eq!(
            parsed.changes,
            vec![
                change(true, 'o', ModeKind::MemberList, Some("alice")),
                change(false, 'v', ModeKind::MemberList, Some("alice")),
            ]
        );
        assert_eq!(format_mode_changes(&parsed.changes), "+o-v alice alice");
    }

    #[test]
    fn unknown_letters_skipped() {
        let catalog = ModeCatalog::standard();
        let parsed = parse_mode_tokens(&catalog, ModeTarget::Channel, &["+zntY"], 4);
        assert_eq!(parsed.unknown, vec!['z', 'Y']);
        assert_eq!(
            parsed.changes,
            vec![change(true, 'n', ModeKind::OnOff, None), change(true, 't', ModeKind::OnOff, None)]
        );
    }

    #[test]
    fn param_rules() {
        let catalog = ModeCatalog::standard();

        // +l without a parameter is dropped
        let parsed = parse_mode_tokens(&catalog, ModeTarget::Channel, &["+l"], 4);
        assert!(parsed.changes.is_empty());

        // -l takes none
        let parsed = parse_mode_tokens(&catalog, ModeTarget::Channel, &["-l+k", "secret"], 4);
        assert_eq!(
            parsed.changes,
            vec![change(false, 'l', ModeKind::Param, None), change(true, 'k', ModeKind::Param, Some("secret"))]
        );

        // -k consumes a parameter
        let parsed = parse_mode_tokens(&catalog, ModeTarget::Channel, &["-kn", "secret"], 4);
        assert_eq!(
            parsed.changes,
            vec![change(false, 'k', ModeKind::Param, Some("secret")), change(false, 'n', ModeKind::OnOff, None)]
        );
    }

    #[test]
    fn list_queries() {
        let catalog = ModeCatalog::standard();
        let parsed = parse_mode_tokens(&catalog, ModeTarget::Channel, &["bb+e"], 4);
        assert!(parsed.changes.is_empty());
        assert_eq!(parsed.list_queries, vec!['b', 'e']);
    }

    #[test]
    fn param_limit() {
        let catalog = ModeCatalog::standard();
        let parsed = parse_mode_tokens(&catalog, ModeTarget::Channel, &["+vvvt", "a", "b", "c"], 2);
        assert_eq!(
            parsed.changes,
            vec![
                change(true, 'v', ModeKind::MemberList, Some("a")),
                change(true, 'v', ModeKind::MemberList, Some("b")),
                change(true, 't', ModeKind::OnOff, None),
            ]
        );
    }

    #[test]
    fn member_modes_unknown_for_users() {
        let catalog = ModeCatalog::standard();
        let parsed = parse_mode_tokens(&catalog, ModeTarget::User, &["+iv"], 4);
        assert_eq!(parsed.changes, vec![change(true, 'i', ModeKind::OnOff, None)]);
        assert_eq!(parsed.unknown, vec!['v']);
    }
}
