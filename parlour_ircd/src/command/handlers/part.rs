use super::*;

pub(super) fn handle_part(cmd: &ClientCommand) -> CommandResult
{
    let names = cmd.required_arg(0)?;
    let reason = cmd.arg(1).unwrap_or("");

    for name in names.split(',')
    {
        report(cmd, part_one(cmd, name, reason))?;
    }
    Ok(())
}

fn part_one(cmd: &ClientCommand, name: &str, reason: &str) -> CommandResult
{
    let name = parse_channel_name(name)?;
    let server = cmd.server;
    let mut network = server.network.write();

    let user = source_client(&network, cmd)?;
    let channel = network.channel_by_name(&name)?;
    if channel.membership(user.id).is_none()
    {
        return Err(LookupError::NotAMember(user.id, channel.name).into());
    }

    let (client_id, channel_id) = (user.id, channel.id);
    let reason = truncate(reason, server.config.limits.kick_len);
    server.send_to_channel(channel, &message::Part::new(&user.mask(), &channel.name, reason), None);

    network.part_channel(client_id, channel_id)?;
    Ok(())
}
