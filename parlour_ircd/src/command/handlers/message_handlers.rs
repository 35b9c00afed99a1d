use super::*;

pub(super) fn handle_privmsg(cmd: &ClientCommand) -> CommandResult
{
    send_message(cmd, false)
}

/// NOTICE never produces an error reply
pub(super) fn handle_notice(cmd: &ClientCommand) -> CommandResult
{
    match send_message(cmd, true) {
        Err(e) if !e.is_fatal() => Ok(()),
        other => other,
    }
}

fn send_message(cmd: &ClientCommand, notice: bool) -> CommandResult
{
    let targets = match cmd.arg(0) {
        Some(t) if !t.is_empty() => t,
        _ => return Err(numeric::NoRecipient::new(cmd.command()).into()),
    };
    let text = match cmd.arg(1) {
        Some(t) if !t.is_empty() => t,
        _ => return Err(numeric::NoTextToSend::new().into()),
    };

    for target in targets.split(',')
    {
        let result = send_one(cmd, target, text, notice);
        if notice
        {
            result.or_else(|e| if e.is_fatal() { Err(e) } else { Ok(()) })?;
        }
        else
        {
            report(cmd, result)?;
        }
    }
    Ok(())
}

fn send_one(cmd: &ClientCommand, target: &str, text: &str, notice: bool) -> CommandResult
{
    let server = cmd.server;
    let network = server.network.read();
    let user = source_client(&network, cmd)?;
    let mask = user.mask();

    let format = |target: &str| {
        if notice
        {
            message::Notice::new(&mask.to_string(), target, text)
        }
        else
        {
            message::Privmsg::new(&mask, target, text)
        }
    };

    if is_channel_name(target)
    {
        let channel = network
            .channel_by_name(&parse_channel_name(target)?)
            .map_err(|_| LookupError::NoSuchNick(target.to_string()))?;
        server.policy.channel.can_send(user, channel)?;
        server.send_to_channel(channel, &format(channel.name.as_str()), Some(user.id));
    }
    else
    {
        let recipient = network.client_by_nick_str(target)?;
        server.send_to_client(recipient.id, &format(recipient.nick.as_str()));

        if let (Some(reason), false) = (&recipient.away, notice)
        {
            cmd.numeric(numeric::Away::new(&recipient.nick, reason));
        }
    }
    Ok(())
}
