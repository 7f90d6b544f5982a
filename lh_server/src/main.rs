//! Live Hold'em table server.
//!
//! Spawns a set of table actors behind a [`HoldemEngine`], runs the lobby
//! scheduler over them and stays up until interrupted.

mod config;

use std::sync::Arc;

use anyhow::Error;
use ctrlc::set_handler;
use env_logger::Env;
use live_holdem::{HoldemEngine, wallet::InMemoryWallet};
use log::info;
use pico_args::Arguments;
use tokio_util::sync::CancellationToken;

use config::ServerConfig;

const HELP: &str = "\
Run a set of live Hold'em tables

USAGE:
  lh_server [OPTIONS]

OPTIONS:
  --tables     N           Number of tables to create  [default: env INITIAL_TABLES or 1]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  LOBBY_TTL_SECS           Idle seconds before an empty table is closed  [default: 30]
  LOBBY_TTS_SECS           Idle seconds before the next hand is dealt   [default: 5]
  LOBBY_POLL_MS            Lobby scheduler poll interval               [default: 1000]
  DEFAULT_MAX_PLAYERS      Seats per table                             [default: 10]
  DEFAULT_SMALL_BLIND      Small blind                                 [default: 50]
  DEFAULT_ANTE             Ante                                        [default: 0]
  DEFAULT_TABLE_SPEED      normal, turbo, hyper or untimed             [default: turbo]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let num_tables: Option<usize> = pargs.opt_value_from_str("--tables")?;
    let config = ServerConfig::from_env(num_tables)?;
    config.validate()?;

    // Catching signals for exit.
    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    set_handler(move || on_signal.cancel())?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_target(false)
        .init();
    info!(
        "Starting live Hold'em server with {} table(s), lobby {:?}",
        config.num_tables, config.lobby
    );

    let engine = HoldemEngine::new(Arc::new(InMemoryWallet::new()), config.lobby);

    for i in 0..config.num_tables {
        match engine
            .create_table(config.table_defaults.clone(), None)
            .await
        {
            Ok(table_id) => info!("Created table {} with ID {}", i + 1, table_id),
            Err(e) => log::error!("Failed to create table {}: {}", i + 1, e),
        }
    }

    for table in engine.list_tables(0).await {
        info!(
            "  - {} - {}/{} players, blinds: {}/{}, speed: {}",
            table.table_id,
            table.current_players,
            table.config.max_players,
            table.small_blind,
            table.small_blind * 2,
            table.config.speed
        );
    }

    let scheduler = engine.spawn_scheduler(shutdown.clone());
    info!("Server is running. Press Ctrl+C to stop.");

    shutdown.cancelled().await;
    info!("Shutting down server...");
    scheduler.await?;

    Ok(())
}
