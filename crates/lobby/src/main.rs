//! `lobbyd`: the Lobby matchmaking server.
//!
//! Run with:
//! ```not_rust
//! lobbyd          # listens on 0.0.0.0:10000
//! lobbyd 12345    # listens on 0.0.0.0:12345
//! ```

use clap::Parser;
use lobby::logging::init_logging;
use lobby::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "lobbyd")]
#[command(about = "Two-player room matchmaking server", long_about = None)]
struct Args {
    /// TCP port to listen on
    #[arg(default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging("info");
    let args = Args::parse();

    let server = LobbyServer::builder()
        .bind(&format!("0.0.0.0:{}", args.port))
        .build()
        .await?;

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await?;
    Ok(())
}
