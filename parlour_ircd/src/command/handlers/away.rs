use super::*;

pub(super) fn handle_away(cmd: &ClientCommand) -> CommandResult
{
    let server = cmd.server;
    let client_id = cmd.client_id()?;

    match cmd.arg(0).filter(|r| !r.is_empty()) {
        Some(reason) => {
            let reason = truncate(reason, server.config.limits.away_len);
            server.network.write().set_away(client_id, Some(reason.to_string()))?;
            cmd.numeric(numeric::NowAway::new());
        }
        None => {
            server.network.write().set_away(client_id, None)?;
            cmd.numeric(numeric::Unaway::new());
        }
    }
    Ok(())
}
