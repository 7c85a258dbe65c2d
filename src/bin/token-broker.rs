use anyhow::Result;
use clap::Parser;
use token_broker::server;
use token_broker::sources::authority::AuthorityClient;
use token_broker::utils::config_loader;
use token_broker::utils::logging;
use token_broker::utils::logging::LogLevel;
use token_broker::TokenBroker;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "token-broker.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Read args
    // -------------------------------

    let args = Args::parse();

    // -------------------------------
    // 2. Load YAML config, init logging
    // -------------------------------

    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level)?;

    // -------------------------------
    // 3. Create authorization server client
    // -------------------------------

    let authority = AuthorityClient::new(&service_config.authority)?;

    // -------------------------------
    // 4. Create broker with an empty cache
    // -------------------------------

    let broker = TokenBroker::new(authority, service_config.settings.refresh_window_seconds);

    // -------------------------------
    // 5. Serve token requests
    // -------------------------------

    info!(
        "Service starting, refresh window {}s...",
        service_config.settings.refresh_window_seconds
    );
    server::server::start(&service_config.settings, broker).await
}
