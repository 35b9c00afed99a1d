use super::*;

pub(super) fn handle_quit(cmd: &ClientCommand) -> CommandResult
{
    if cmd.connection.is_registered()
    {
        let message = truncate(cmd.arg(0).unwrap_or("Client Quit"), cmd.server.config.limits.kick_len);
        cmd.connection.close(format!("Quit: {}", message));
    }
    else
    {
        cmd.connection.close("Client Quit");
    }
    Ok(())
}
