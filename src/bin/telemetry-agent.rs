use clap::arg;
use clap::command;
use clap::Parser;
use reqwest::Client;
use telemetry_agent::cache::credential_cache::CredentialCache;
use telemetry_agent::pipeline::driver::Driver;
use telemetry_agent::server;
use telemetry_agent::utils::config_loader;
use telemetry_agent::utils::constants::DEFAULT_CONFIG_PATH;
use telemetry_agent::utils::logging;
use telemetry_agent::utils::pid_file::PidFile;
use telemetry_agent::utils::shutdown;
use anyhow::Result;
use telemetry_agent::utils::logging::LogLevel;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[arg(long, env = "LOG_LEVEL" , value_enum, ignore_case = true)]
    log_level: Option<LogLevel>,
    /// collect a single reading and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let mut service_config = config_loader::run(&args.config).await?;
    if args.once {
        service_config.settings.collect.disabled = true;
    }
    logging::run(&service_config, args.log_level.to_owned());

    let _pid_file = match &service_config.settings.pid_filename {
        Some(path) => Some(PidFile::create(path)?),
        None => None,
    };

    // -------------------------------
    // 2. Composition root: one client, one credential cache
    // -------------------------------

    let client = Client::new();
    let cache = CredentialCache::new();
    let driver = Driver::from_config(&service_config, cache, client)?;

    // -------------------------------
    // 3. Metrics server
    // -------------------------------

    let settings = service_config.settings.clone();
    tokio::spawn(async move {
        if let Err(e) = server::server::start(&settings).await {
            error!("metrics server stopped: {}", e);
        }
    });

    // -------------------------------
    // 4. Collect until Ctrl-C
    // -------------------------------

    info!("Service starting...");
    driver
        .run(shutdown::until_signal(tokio::signal::ctrl_c()))
        .await?;

    info!("Service stopped");
    Ok(())
}
