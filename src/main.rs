use clap::Parser;
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use watchcopy::{cli::Cli, Monitor, WatchConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.setup_logging();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let monitor = Monitor::start(config)?;
    monitor.run(running)
}

fn load_config(cli: &Cli) -> Result<WatchConfig, watchcopy::ConfigError> {
    let config = cli.build_config()?;
    config.validate()?;
    Ok(config)
}
