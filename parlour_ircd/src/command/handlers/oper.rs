use super::*;

pub(super) fn handle_oper(cmd: &ClientCommand) -> CommandResult
{
    let oper_name = cmd.required_arg(0)?;
    let password = cmd.required_arg(1)?;
    let server = cmd.server;
    let mut network = server.network.write();

    let (client_id, nick) = {
        let user = source_client(&network, cmd)?;
        (user.id, user.nick)
    };

    let block = match server.config.opers.iter().find(|o| o.name == oper_name) {
        Some(block) => block,
        None => return Err(numeric::NoOperConf::new().into()),
    };

    if !server.policy.oper.authenticate(block, network.client(client_id)?, oper_name, password)
    {
        tracing::info!(client = ?client_id, %nick, oper = %oper_name, "Failed OPER attempt");
        return Err(numeric::PasswordMismatch::new().into());
    }

    let privileges = server.policy.oper.privileges_for(block);
    network.grant_oper(client_id, &block.name, privileges)?;

    if let Some(class_name) = &block.class
    {
        move_to_class(cmd, &mut network, client_id, class_name)?;
    }

    tracing::info!(client = ?client_id, %nick, oper = %block.name, ?privileges, "Operator authenticated");

    cmd.send(message::Mode::new(nick.as_str(), nick.as_str(), "+o"));
    cmd.numeric(numeric::YoureOper::new());
    Ok(())
}

/// Move an operator's connection into their configured class, applying
/// its queue limits to the live connection
fn move_to_class(cmd: &ClientCommand, network: &mut Network, client_id: ClientId, class_name: &str) -> CommandResult
{
    let class = cmd
        .server
        .classes
        .get(class_name)
        .ok_or_else(|| CommandError::unknown(format!("operator class {} is not defined", class_name)))?;

    let current = cmd.connection.class();
    if current.name == class.name
    {
        return Ok(());
    }
    if !class.try_attach()
    {
        tracing::warn!(client = ?client_id, class = %class.name, "Operator class is full; keeping current class");
        return Ok(());
    }

    current.detach();
    network.set_client_class(client_id, &class.name)?;
    cmd.connection.set_class(class);
    Ok(())
}
