use super::*;

pub(super) fn handle_user(cmd: &ClientCommand) -> CommandResult
{
    let username = cmd.required_arg(0)?;
    let realname = cmd.required_arg(3)?;

    let username = truncate(username, Username::LENGTH)
        .parse::<Username>()
        .map_err(|_| CommandError::from(numeric::InvalidUsername::new()))?;

    // These only fail if USER was already accepted from this connection, in
    // which case the new values are ignored
    let pre_client = &cmd.connection.pre_client;
    pre_client.user.set(username).ok();
    pre_client.realname.set(realname.to_string()).ok();

    if cmd.connection.set_registration_flag(RegistrationFlags::USER)
    {
        cmd.server.register_client(cmd.connection);
    }
    Ok(())
}
