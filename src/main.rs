mod app;
mod cli;
mod config;
mod core;
mod error;
mod widgets;

use std::fs::File;
use std::sync::Arc;

use color_eyre::Result;
use tracing::Level;
use tracing_subscriber::{prelude::*, EnvFilter};

use app::App;
use cli::parse_args;
use config::Config;
use crate::core::external_ip::HttpExternalIpResolver;
use crate::core::probe::{ExternalIpResolver, SystemProbe};
use crate::core::scheduler::{Orchestrator, Sources};

fn main() -> Result<()> {
    let cli = parse_args();

    color_eyre::install()?;

    // log to a file, stdout belongs to the TUI
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let log_file = File::create(&cli.log_file)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(false),
        )
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    tracing::info!("Starting netview {}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(?config, "effective configuration");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let probe = Arc::new(SystemProbe::new());
    let external_ip = config.external_ip.enabled.then(|| {
        Arc::new(HttpExternalIpResolver::from_config(&config.external_ip)) as Arc<dyn ExternalIpResolver>
    });
    let sources = Sources {
        interfaces: probe.clone(),
        ports: probe.clone(),
        processes: probe,
        external_ip,
    };

    let (orchestrator, rx) = Orchestrator::new(
        runtime.handle().clone(),
        sources,
        &config.refresh,
        config.display.process_limit,
    );

    let mut terminal = ratatui::init();

    let app_result = App::new(orchestrator, rx, config.refresh.tick_rate(), config.external_ip.enabled)
        .run(&mut terminal);

    ratatui::restore();

    // in-flight polls are abandoned, not awaited
    runtime.shutdown_background();

    app_result?;

    tracing::info!("Goodbye!");
    Ok(())
}
