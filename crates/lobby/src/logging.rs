//! Logging setup for the server binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events the default filter lets through.
const LOBBY_CRATES: &[&str] = &[
    "lobby",
    "lobby_transport",
    "lobby_protocol",
    "lobby_session",
    "lobby_registry",
];

/// Installs a `tracing` subscriber that writes to stderr.
///
/// `RUST_LOG` wins when set; otherwise every lobby crate logs at
/// `default_level` and everything else is silent.
pub fn init_logging(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(default_level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn default_filter(level: &str) -> String {
    LOBBY_CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
