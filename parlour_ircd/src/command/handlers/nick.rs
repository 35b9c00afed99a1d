use super::*;

pub(super) fn handle_nick(cmd: &ClientCommand) -> CommandResult
{
    let nick = match cmd.arg(0) {
        Some(arg) if !arg.is_empty() => parse_nick(arg)?,
        _ => return Err(numeric::NoNicknameGiven::new().into()),
    };

    if let Some(ban) = cmd.server.policy.registration.nick_ban(&nick)
    {
        tracing::debug!(conn = %cmd.connection.id(), %nick, reason = %ban.reason, "Refusing banned nickname");
        return Err(numeric::ErroneousNickname::new(nick.as_str()).into());
    }

    match cmd.connection.client_id() {
        Some(id) => change_nick(cmd, id, nick),
        None => choose_nick(cmd, nick),
    }
}

/// A nickname given before registration is only reserved when registration
/// completes
fn choose_nick(cmd: &ClientCommand, nick: Nickname) -> CommandResult
{
    if cmd.server.network.read().nick_in_use(&nick)
    {
        return Err(numeric::NicknameInUse::new(&nick).into());
    }

    cmd.connection.set_nick(nick);
    if cmd.connection.set_registration_flag(RegistrationFlags::NICK)
    {
        cmd.server.register_client(cmd.connection);
    }
    Ok(())
}

fn change_nick(cmd: &ClientCommand, id: ClientId, nick: Nickname) -> CommandResult
{
    let mut network = cmd.server.network.write();
    let old_mask = network.change_nick(id, nick)?;

    if old_mask.nick == nick.as_str()
    {
        return Ok(());
    }

    cmd.connection.set_nick(nick);

    let message = message::Nick::new(&old_mask, &nick);
    cmd.send(message.clone());
    cmd.server.send_to_clients(network.peers_of(id)?, &message);

    tracing::debug!(client = ?id, old = %old_mask.nick, new = %nick, "Nickname changed");
    Ok(())
}
