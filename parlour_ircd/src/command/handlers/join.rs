use super::*;

pub(super) fn handle_join(cmd: &ClientCommand) -> CommandResult
{
    let names = cmd.required_arg(0)?;
    if names == "0"
    {
        return part_all(cmd);
    }

    let mut keys = cmd.arg(1).unwrap_or("").split(',');

    for name in names.split(',')
    {
        let key = keys.next().filter(|k| !k.is_empty());
        report(cmd, join_one(cmd, name, key))?;
    }
    Ok(())
}

fn join_one(cmd: &ClientCommand, name: &str, key: Option<&str>) -> CommandResult
{
    let name = parse_channel_name(name)?;
    let server = cmd.server;
    let mut network = server.network.write();

    let client_id = {
        let user = source_client(&network, cmd)?;
        let existing = network.channel_by_name(&name).ok();
        if existing.map_or(false, |c| c.members.contains_key(&user.id))
        {
            return Ok(());
        }
        server.policy.channel.can_join(user, &name, existing, key)?;
        user.id
    };

    let joined = network.join_channel(client_id, &name)?;
    let channel = network.channel(joined.channel)?;
    let mask = network.client(client_id)?.mask();

    if joined.created
    {
        tracing::debug!(channel = %name, founder = %mask, "Channel founded");
    }

    server.send_to_channel(channel, &message::Join::new(&mask, &channel.name), None);
    server.send_topic(cmd.connection, channel);
    server.send_names(&network, cmd.connection, channel);
    Ok(())
}

/// `JOIN 0` leaves every channel
fn part_all(cmd: &ClientCommand) -> CommandResult
{
    let server = cmd.server;
    let mut network = server.network.write();

    let (client_id, mask, channels) = {
        let user = source_client(&network, cmd)?;
        (user.id, user.mask(), user.channels.iter().copied().collect::<Vec<_>>())
    };

    for channel_id in channels
    {
        let channel = network.channel(channel_id)?;
        server.send_to_channel(channel, &message::Part::new(&mask, &channel.name, "Left all channels"), None);
        network.part_channel(client_id, channel_id)?;
    }
    Ok(())
}
