use std::time::Duration;

use clap::Parser;
use crownhunt::prelude::*;
use crownhunt_mapgen::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use tracing_subscriber::EnvFilter;

/// Crownhunt game server.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Address to listen on
    #[clap(short, long, default_value = "127.0.0.1:8080")]
    bind: String,
    /// Arena width in tiles (odd, at least 3)
    #[clap(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,
    /// Arena height in tiles (odd, at least 3)
    #[clap(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,
    /// Fixed maze seed; random when omitted
    #[clap(long)]
    seed: Option<u64>,
    /// Milliseconds between elimination checks
    #[clap(long, default_value_t = 500)]
    tick_ms: u64,
    /// Outbound messages buffered per player before it is dropped
    #[clap(long, default_value_t = 256)]
    sink_capacity: usize,
    /// Seconds of silence before a connection is closed
    #[clap(long, default_value_t = 60)]
    idle_timeout: u64,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind,
            game: GameConfig {
                map_width: self.width,
                map_height: self.height,
                map_seed: self.seed,
                tick: TickConfig::with_period(Duration::from_millis(self.tick_ms)),
                outbound_capacity: self.sink_capacity,
                ..GameConfig::default()
            },
            idle_timeout: Duration::from_secs(self.idle_timeout),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CrownhuntError> {
    // RUST_LOG=crownhunt_game=debug for per-message logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .compact()
        .init();

    let config = Args::parse().into_config();
    let server = CrownhuntServer::builder().config(config).build().await?;
    tracing::info!(addr = %server.local_addr()?, "listening");

    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("ctrl-c received, shutting down");
                shutdown.cancel();
            }
            Err(e) => tracing::error!(error = %e, "failed to listen for ctrl-c"),
        }
    });

    server.run().await
}
