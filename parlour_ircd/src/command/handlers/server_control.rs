use super::*;

use crate::server::ShutdownAction;

pub(super) fn handle_die(cmd: &ClientCommand) -> CommandResult
{
    request(cmd, Privileges::DIE, ShutdownAction::Shutdown)
}

pub(super) fn handle_restart(cmd: &ClientCommand) -> CommandResult
{
    request(cmd, Privileges::RESTART, ShutdownAction::Restart)
}

fn request(cmd: &ClientCommand, privilege: Privileges, action: ShutdownAction) -> CommandResult
{
    let server = cmd.server;
    {
        let network = server.network.read();
        let user = source_client(&network, cmd)?;
        server.policy.oper.require_privilege(user, privilege)?;
        tracing::warn!(oper = %user.nick, ?action, "Server control requested");
    }
    server.request_shutdown(action);
    Ok(())
}
