use crate::server::config::*;

use tracing::Subscriber;
use tracing_core::LevelFilter;
use tracing_subscriber::{filter::filter_fn, prelude::*, registry::LookupSpan, Layer};

use std::io::Error as IoError;
use std::path::Path;

fn build_target<S>(conf: LogEntry, dir: impl AsRef<Path>) -> Result<Box<dyn Layer<S> + Send + Sync + 'static>, IoError>
    where S: Subscriber + Send + Sync,
          for<'span> S: LookupSpan<'span>,
{
    let layer = match &conf.target {
        LogTarget::File { filename } => {
            std::fs::create_dir_all(dir.as_ref())?;
            tracing_subscriber::fmt::layer()
                .with_writer(tracing_appender::rolling::daily(dir, filename))
                .with_ansi(false)
                .boxed()
        }
        LogTarget::Builtin(BuiltinLogTarget::Stdout) => {
            tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
        }
        LogTarget::Builtin(BuiltinLogTarget::Stderr) => {
            tracing_subscriber::fmt::layer().with_writer(std::io::stderr).boxed()
        }
    };

    let level: LevelFilter = conf.level.map(Into::into).unwrap_or(LevelFilter::TRACE);
    let modules = conf.modules;
    let filter = filter_fn(move |metadata| {
        metadata.level() <= &level
            && (modules.is_empty()
                || match metadata.module_path() {
                    Some(module) => modules.iter().any(|m| module.starts_with(m)),
                    None => true,
                })
    });

    Ok(layer.with_filter(filter).boxed())
}

/// Build the subscriber described by the logging configuration
pub fn build_subscriber(conf: LoggingConfig) -> Result<impl Subscriber, IoError>
{
    let mut layers = Vec::new();

    for target in conf.targets
    {
        layers.push(build_target(target, &conf.dir)?);
    }

    // The global filter only excludes overly verbose external modules; each
    // target applies its own level
    let default_level: LevelFilter = conf.default_level.unwrap_or(LogLevel::Trace).into();
    let module_levels = conf.module_levels.into_iter().map(|(module, level)| (module, LevelFilter::from(level)));
    let filter = tracing_subscriber::filter::Targets::new()
        .with_default(default_level)
        .with_targets(module_levels);

    Ok(tracing_subscriber::registry().with(filter).with(layers))
}
