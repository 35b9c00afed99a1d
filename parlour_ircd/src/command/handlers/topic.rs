use super::*;

pub(super) fn handle_topic(cmd: &ClientCommand) -> CommandResult
{
    let name = parse_channel_name(cmd.required_arg(0)?)?;
    let server = cmd.server;

    let text = match cmd.arg(1) {
        Some(text) => truncate(text, server.config.limits.topic_len),
        None => {
            let network = server.network.read();
            let user = source_client(&network, cmd)?;
            let channel = network.channel_by_name(&name)?;
            server.policy.channel.can_see_topic(user, channel)?;
            server.send_topic(cmd.connection, channel);
            return Ok(());
        }
    };

    let mut network = server.network.write();
    let (mask, channel_id) = {
        let user = source_client(&network, cmd)?;
        let channel = network.channel_by_name(&name)?;
        server.policy.channel.can_set_topic(user, channel)?;
        (user.mask(), channel.id)
    };

    network.set_topic(channel_id, text.to_string(), &mask)?;

    let channel = network.channel(channel_id)?;
    server.send_to_channel(channel, &message::Topic::new(&mask, &channel.name, text), None);
    Ok(())
}
