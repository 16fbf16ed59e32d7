use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use spdlog::{info, warn};

use roamlog::config::{open_config, read_secrets};
use roamlog::logger::configure_logger;
use roamlog::server::server_run;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.config_path.map(PathBuf::from);

    let config = match open_config(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run roamlog --help");
            return Ok(());
        }
    };

    let secrets = match read_secrets() {
        Ok(secrets) => secrets,
        Err(err) => {
            eprintln!("{}", err);
            return Ok(());
        }
    };

    if let Some(ref log) = config.log {
        if let Err(err) = configure_logger(log) {
            warn!("Error creating logger sinks. Using console instead. Desc={}", err);
        }
    }

    info!("Starting Roamlog =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
    info!("Listening on {}:{}", config.server.address, config.server.port);

    server_run(config, secrets).await
}
