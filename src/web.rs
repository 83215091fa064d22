#![cfg(not(tarpaulin_include))]

use clap::Parser;
use orderlist::app;
use orderlist::config::ServerConfig;

/// Main entry point for the order list web application
///
/// Reads the server configuration from flags and `ORDERLIST_*` environment
/// variables, sets up logging (`RUST_LOG`, `info` by default) and serves the
/// application until the process is stopped.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::parse();
    log::info!(
        "Starting order list server, data in {}",
        config.data_dir.display()
    );

    app::run(config).await
}
