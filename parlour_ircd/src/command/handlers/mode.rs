use super::*;
use parlour_network::network::MemberModeError;

pub(super) fn handle_mode(cmd: &ClientCommand) -> CommandResult
{
    let target = cmd.required_arg(0)?;
    if is_channel_name(target)
    {
        channel_mode(cmd, parse_channel_name(target)?)
    }
    else
    {
        user_mode(cmd, target)
    }
}

fn channel_mode(cmd: &ClientCommand, name: ChannelName) -> CommandResult
{
    let server = cmd.server;

    if cmd.args().len() < 2
    {
        let network = server.network.read();
        let user = source_client(&network, cmd)?;
        let channel = network.channel_by_name(&name)?;
        let is_member = channel.membership(user.id).is_some();
        cmd.numeric(numeric::ChannelModeIs::new(&channel.name, &channel.mode_string(is_member)));
        cmd.numeric(numeric::ChannelCreated::new(&channel.name, channel.created));
        return Ok(());
    }

    let mut network = server.network.write();
    let parsed = parse_mode_tokens(network.catalog(), ModeTarget::Channel, &cmd.args()[1..], network.limits().max_modes);

    if !parsed.unknown.is_empty()
    {
        tracing::trace!(channel = %name, unknown = ?parsed.unknown, "Skipping unknown channel modes");
    }

    let (mask, channel_id, allowed) = {
        let user = source_client(&network, cmd)?;
        let channel = network.channel_by_name(&name)?;

        for letter in &parsed.list_queries
        {
            report(cmd, send_list(cmd, user, channel, *letter))?;
        }

        let mut allowed = Vec::new();
        let mut denied = false;
        for change in parsed.changes
        {
            let check = if change.kind == ModeKind::MemberList
            {
                check_member_mode(cmd, &network, user, channel, &change)
            }
            else
            {
                server.policy.channel.can_change_mode(user, channel, change.letter).map_err(CommandError::from)
            };

            match check {
                Ok(()) => allowed.push(change),
                // One denial is enough to tell the user why
                Err(e) if !denied => {
                    denied = true;
                    report(cmd, Err(e))?;
                }
                Err(_) => (),
            }
        }

        (user.mask(), channel.id, allowed)
    };

    if allowed.is_empty()
    {
        return Ok(());
    }

    let result = network.apply_channel_modes(channel_id, &allowed, &mask)?;
    for error in result.errors
    {
        match error {
            MemberModeError::NoSuchNick(nick) => cmd.numeric(numeric::NoSuchTarget::new(&nick)),
            MemberModeError::NotOnChannel(nick) => cmd.numeric(numeric::UserNotOnChannel::new(&nick, &name)),
        }
    }

    if !result.applied.is_empty()
    {
        let channel = network.channel(channel_id)?;
        let changes = format_mode_changes(&result.applied);
        let message = message::Mode::new(&mask.to_string(), channel.name.as_str(), &changes);
        server.send_to_channel(channel, &message, None);
    }
    Ok(())
}

/// Check a member status change, naming the target in any denial
fn check_member_mode(cmd: &ClientCommand,
                     network: &Network,
                     user: &state::Client,
                     channel: &state::Channel,
                     change: &ModeChange) -> CommandResult
{
    let nick = change.param.as_deref().unwrap_or_default();
    let target = network.client_by_nick_str(nick)?;
    let flag = MembershipFlagSet::for_mode_char(change.letter)
        .ok_or_else(|| CommandError::unknown(format!("no member flag for mode {}", change.letter)))?;

    let policy = &cmd.server.policy.channel;
    let result = if change.adding
    {
        policy.can_grant_flag(user, channel, target, flag)
    }
    else
    {
        policy.can_remove_flag(user, channel, target, flag)
    };
    result.map_err(|e| target_error(e, &target.nick))
}

/// Send the contents of one list mode
fn send_list(cmd: &ClientCommand, user: &state::Client, channel: &state::Channel, letter: char) -> CommandResult
{
    cmd.server.policy.channel.can_query_list(user, channel, letter)?;

    let name = &channel.name;
    for entry in channel.list(letter)
    {
        let numeric = match letter {
            letters::EXCEPT => numeric::ExceptList::new(name, &entry.pattern, &entry.setter, entry.timestamp),
            letters::INVEX => numeric::InviteList::new(name, &entry.pattern, &entry.setter, entry.timestamp),
            _ => numeric::BanList::new(name, &entry.pattern, &entry.setter, entry.timestamp),
        };
        cmd.numeric(numeric);
    }

    let end = match letter {
        letters::EXCEPT => numeric::EndOfExceptList::new(name),
        letters::INVEX => numeric::EndOfInviteList::new(name),
        _ => numeric::EndOfBanList::new(name),
    };
    cmd.numeric(end);
    Ok(())
}

fn user_mode(cmd: &ClientCommand, target: &str) -> CommandResult
{
    let server = cmd.server;
    let mut network = server.network.write();

    let (client_id, nick) = {
        let user = source_client(&network, cmd)?;
        let target = network.client_by_nick_str(target)?;
        if target.id != user.id
        {
            return Err(numeric::CantChangeOtherUserMode::new().into());
        }
        (user.id, user.nick)
    };

    if cmd.args().len() < 2
    {
        let mode = network.client(client_id)?.mode_string();
        cmd.numeric(numeric::UserModeIs::new(&mode));
        return Ok(());
    }

    let parsed = parse_mode_tokens(network.catalog(), ModeTarget::User, &cmd.args()[1..], network.limits().max_modes);
    if !parsed.unknown.is_empty()
    {
        tracing::trace!(client = ?client_id, unknown = ?parsed.unknown, "Skipping unknown user modes");
    }

    let mut applied = Vec::new();
    for change in parsed.changes
    {
        let user = network.client(client_id)?;
        if let Err(e) = server.policy.user.can_change_umode(user, change.letter, change.adding)
        {
            tracing::trace!(client = ?client_id, letter = %change.letter, "User mode change refused: {}", e);
            continue;
        }
        if network.set_user_mode(client_id, change.letter, change.adding)?
        {
            applied.push(change);
        }
    }

    if !applied.is_empty()
    {
        let changes = format_mode_changes(&applied);
        cmd.send(message::Mode::new(nick.as_str(), nick.as_str(), &changes));
    }
    Ok(())
}
