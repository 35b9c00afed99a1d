use super::*;

pub(super) fn handle_names(cmd: &ClientCommand) -> CommandResult
{
    let names = match cmd.arg(0) {
        Some(names) if !names.is_empty() => names,
        _ => {
            cmd.numeric(numeric::EndOfNames::new("*"));
            return Ok(());
        }
    };

    let server = cmd.server;
    let network = server.network.read();
    let user = source_client(&network, cmd)?;

    for name in names.split(',')
    {
        let visible = name
            .parse::<ChannelName>()
            .ok()
            .and_then(|n| network.channel_by_name(&n).ok())
            .filter(|c| server.policy.channel.can_see_names(user, c).is_ok());

        match visible {
            Some(channel) => server.send_names(&network, cmd.connection, channel),
            // An unknown or invisible channel gets only the end of the list
            None => cmd.numeric(numeric::EndOfNames::new(name)),
        }
    }
    Ok(())
}
