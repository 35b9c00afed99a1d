use super::*;

pub(super) fn handle_motd(cmd: &ClientCommand) -> CommandResult
{
    cmd.server.send_motd(cmd.connection);
    Ok(())
}

pub(super) fn handle_version(cmd: &ClientCommand) -> CommandResult
{
    let server = cmd.server;
    cmd.numeric(numeric::Version::new(server.version(), server.name(), server.network_name()));
    server.send_isupport(cmd.connection);
    Ok(())
}

pub(super) fn handle_isupport(cmd: &ClientCommand) -> CommandResult
{
    cmd.server.send_isupport(cmd.connection);
    Ok(())
}
