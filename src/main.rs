use std::sync::Arc;

use clap::Parser;

use search_server::config::{AppState, Config};
use search_server::logger;
use search_server::server::{self, Shutdown};

const DEFAULT_CONFIG: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config)?;
    logger::init(&cfg)?;

    // Worker threads from config, default CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(AppState::new(cfg)?);
    let shutdown = Shutdown::new();
    server::start_signal_handler(Arc::clone(&state), shutdown.clone());

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local.run_until(server::run(listener, state, shutdown)).await;
    Ok(())
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "search-server", version, about)]
struct Cli {
    /// Configuration file path, without the extension
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG)]
    config: String,
}
