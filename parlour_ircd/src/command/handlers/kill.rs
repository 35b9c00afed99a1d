use super::*;

pub(super) fn handle_kill(cmd: &ClientCommand) -> CommandResult
{
    let target = cmd.required_arg(0)?;
    let server = cmd.server;
    let network = server.network.read();

    let user = source_client(&network, cmd)?;
    server.policy.oper.require_privilege(user, Privileges::KILL)?;

    let target = network.client_by_nick_str(target)?;
    let reason = truncate(cmd.arg(1).unwrap_or("<No reason given>"), server.config.limits.kick_len);

    tracing::info!(source = %user.nick, target = %target.nick, %reason, "KILL");

    match server.connections.read().get_client(target.id) {
        Some(conn) => conn.close(format!("Killed ({} ({}))", user.nick, reason)),
        None => tracing::error!(client = ?target.id, "KILL target has no connection"),
    }
    Ok(())
}
