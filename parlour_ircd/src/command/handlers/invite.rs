use super::*;

pub(super) fn handle_invite(cmd: &ClientCommand) -> CommandResult
{
    let target = cmd.required_arg(0)?;
    let name = parse_channel_name(cmd.required_arg(1)?)?;
    let server = cmd.server;
    let mut network = server.network.write();

    let (mask, channel_id, target_id, target_nick, away) = {
        let user = source_client(&network, cmd)?;
        let target = network.client_by_nick_str(target)?;
        let channel = network.channel_by_name(&name)?;

        server
            .policy
            .channel
            .can_invite(user, channel, target)
            .map_err(|e| target_error(e, &target.nick))?;

        (user.mask(), channel.id, target.id, target.nick, target.away.clone())
    };

    network.add_invite(channel_id, target_id)?;

    cmd.numeric(numeric::Inviting::new(&target_nick, &name));
    if let Some(reason) = away
    {
        cmd.numeric(numeric::Away::new(&target_nick, &reason));
    }
    server.send_to_client(target_id, &message::Invite::new(&mask, &target_nick, &name));
    Ok(())
}
