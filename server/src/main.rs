//! callrelay Server – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet den Server.

use anyhow::{Context, Result};
use callrelay_observability::logging_initialisieren;
use callrelay_server::{config::ServerConfig, Server};

/// Umgebungsvariable mit dem Pfad zur Konfigurationsdatei
const CONFIG_VARIABLE: &str = "CALLRELAY_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    let config_pfad = std::env::var(CONFIG_VARIABLE).unwrap_or_else(|_| "config.toml".into());

    // Datei, dann CALLRELAY_BIND / CALLRELAY_PORT
    let config = ServerConfig::laden(&config_pfad)?
        .mit_umgebung()
        .context("Umgebungsvariablen ungueltig")?;

    logging_initialisieren(&config.logging.level, &config.logging.format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "callrelay Server wird initialisiert"
    );

    Server::neu(config).starten().await
}
