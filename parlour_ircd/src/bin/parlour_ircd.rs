use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(rename_all = "kebab")]
struct Opts {
    /// Server config file location
    #[structopt(default_value = "parlour.json", parse(from_os_str))]
    config: PathBuf,

    /// Check the configuration and exit without starting the server
    #[structopt(long)]
    check: bool,
}

/// Main entry point.
///
/// With `--check`, the configuration is loaded and validated and the process
/// exits with the result. Otherwise the server runs until it is shut down.
pub fn main() -> Result<(), anyhow::Error> {
    let opts = Opts::from_args();

    if opts.check {
        let config = parlour_ircd::run::check_config(&opts.config)?;
        println!(
            "{}: configuration OK for {} ({} listener(s))",
            opts.config.display(),
            config.server.name,
            config.listeners.len()
        );
        return Ok(());
    }

    parlour_ircd::run::run_server(opts.config)
}
