use std::{path::PathBuf, process, sync::Arc};

use clap::Parser;
use log::{error, info};
use tokio::sync::Mutex;

use dailydo::{App, AppContext, Cli, Config, Result};

pub fn initialize_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    info!("Application starting up");

    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    info!("Application shutting down");
}

async fn run(cli: Cli) -> Result<()> {
    let config_path: Option<PathBuf> = cli.config.clone().or_else(Config::default_path);

    let mut config = match &config_path {
        Some(path) => Config::load_or_default(path)?,
        None => Config::default(),
    };
    if let Some(data_dir) = cli.data_dir.clone() {
        config.data_dir = data_dir;
    }
    config.validate()?;

    let mut context = AppContext::open(config.clone())?;
    if config.auto_reset {
        let outcome = context.run_daily_reset()?;
        info!("Startup reset check: {:?}", outcome);
    }

    let app = App::new(
        Arc::new(Mutex::new(context)),
        config,
        config_path,
        cli.verbose,
    );
    app.run(cli.command).await
}
