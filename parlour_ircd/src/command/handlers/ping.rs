use super::*;

pub(super) fn handle_ping(cmd: &ClientCommand) -> CommandResult
{
    let cookie = cmd.required_arg(0)?;
    cmd.send(message::Pong::new(cmd.server.name(), cookie));
    Ok(())
}

/// A PONG counts as activity wherever it comes from; before registration
/// one carrying the connection's cookie also completes the spoof check
pub(super) fn handle_pong(cmd: &ClientCommand) -> CommandResult
{
    if cmd.connection.is_registered()
    {
        return Ok(());
    }

    let echoed = cmd.args().last().map(String::as_str);
    if echoed.is_some() && echoed == cmd.connection.spoof_cookie()
        && cmd.connection.set_registration_flag(RegistrationFlags::CUSTOM)
    {
        cmd.server.register_client(cmd.connection);
    }
    Ok(())
}
