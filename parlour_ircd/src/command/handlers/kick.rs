use super::*;

pub(super) fn handle_kick(cmd: &ClientCommand) -> CommandResult
{
    let name = parse_channel_name(cmd.required_arg(0)?)?;
    let targets = cmd.required_arg(1)?;
    let reason = cmd.arg(2);

    for target in targets.split(',')
    {
        report(cmd, kick_one(cmd, &name, target, reason))?;
    }
    Ok(())
}

fn kick_one(cmd: &ClientCommand, name: &ChannelName, target: &str, reason: Option<&str>) -> CommandResult
{
    let server = cmd.server;
    let mut network = server.network.write();

    let (channel_id, target_id) = {
        let user = source_client(&network, cmd)?;
        let channel = network.channel_by_name(name)?;
        let target = network.client_by_nick_str(target)?;

        server
            .policy
            .channel
            .can_kick(user, channel, target)
            .map_err(|e| target_error(e, &target.nick))?;

        let reason = truncate(reason.unwrap_or(user.nick.as_str()), server.config.limits.kick_len);
        let message = message::Kick::new(&user.mask(), &target.nick, &channel.name, reason);
        server.send_to_channel(channel, &message, None);

        tracing::debug!(channel = %channel.name, source = %user.nick, target = %target.nick, "Kick");
        (channel.id, target.id)
    };

    network.kick_member(channel_id, target_id)?;
    Ok(())
}
