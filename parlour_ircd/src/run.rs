//! Process entry point: load configuration, start the runtime and run the
//! server until it is told to stop

use crate::server::config::{ServerConfig, TlsConfig};
use crate::server::{Server, ShutdownAction};

use anyhow::Context;
use parlour_listener::TlsSettings;
use tracing_subscriber::util::SubscriberInitExt;

use std::env;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Time allowed for the final ERROR lines to reach clients before the process exits
const EXIT_FLUSH_DELAY: Duration = Duration::from_millis(200);

/// Load and check a configuration file without starting anything
pub fn check_config(config_path: impl AsRef<Path>) -> anyhow::Result<ServerConfig>
{
    let path = config_path.as_ref();
    ServerConfig::load_file(path).with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn load_tls(conf: &TlsConfig) -> anyhow::Result<TlsSettings>
{
    TlsSettings::load_pem(&conf.cert_file, &conf.key_file)
        .with_context(|| format!("Failed to load TLS certificate {}", conf.cert_file.display()))
}

async fn do_run_server(config: ServerConfig, tls: Option<TlsSettings>) -> anyhow::Result<ShutdownAction>
{
    let server = Server::new(config.server, config.network)?;

    if let Some(tls) = &tls
    {
        server.load_tls_settings(tls)?;
    }

    for listener in &config.listeners
    {
        let bound = server.add_listener(listener.address, listener.connection_type())?;
        tracing::info!(address = %bound, tls = listener.tls, "Listening");
    }

    let action = server.run().await;

    tokio::time::sleep(EXIT_FLUSH_DELAY).await;

    Ok(action)
}

/// Run a server from the configuration at `config_path`.
///
/// Configuration problems, including unreadable TLS files, are reported
/// before the tokio runtime or any listener is started. If the server is
/// asked to restart, the current executable is executed again with the
/// same arguments, and this function only returns if that fails.
///
/// Note that this function will create a new tokio runtime. It should not be
/// called if one is already active.
pub fn run_server(config_path: impl AsRef<Path>) -> anyhow::Result<()>
{
    let mut config = check_config(config_path)?;
    let tls = config.tls.as_ref().map(load_tls).transpose()?;

    crate::tracing_config::build_subscriber(std::mem::take(&mut config.log))
        .context("Failed to set up logging")?
        .init();

    let runtime = tokio::runtime::Runtime::new()?;
    let action = runtime.block_on(do_run_server(config, tls))?;

    // Make sure nothing from the old runtime survives into the new process image
    runtime.shutdown_timeout(EXIT_FLUSH_DELAY);

    match action {
        ShutdownAction::Shutdown => {
            tracing::info!("Server stopped");
            Ok(())
        }
        ShutdownAction::Restart => {
            tracing::info!("Restarting");

            let err = Command::new(env::current_exe()?)
                .args(env::args_os().skip(1))
                .exec();

            Err(err).context("Couldn't re-execute")
        }
    }
}
