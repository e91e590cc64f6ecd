//! # Zafra - Farm-Logistics Ledger
//!
//! The main binary for the Zafra ledger.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for records, totals, export and backup
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                apps/zafra (THE BINARY)               │
//! │                                                      │
//! │  ┌─────────────┐   ┌─────────────┐   ┌────────────┐  │
//! │  │    CLI      │   │  HTTP API   │   │   Config   │  │
//! │  │   (clap)    │   │   (axum)    │   │   (toml)   │  │
//! │  └──────┬──────┘   └──────┬──────┘   └─────┬──────┘  │
//! │         └─────────────────┼────────────────┘         │
//! │                           ▼                          │
//! │                   ┌───────────────┐                  │
//! │                   │  zafra-core   │                  │
//! │                   │ (THE LEDGER)  │                  │
//! │                   └───────────────┘                  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! zafra serve --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! zafra status
//! zafra carrier add --name "Transportes Sur" --plate "SBA 1234"
//! zafra freight add --carrier 1718000000000 --product Soja --distance 120 --rate 2.5
//! zafra totals freight
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zafra::cli;

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // ZAFRA_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("ZAFRA_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "zafra=info,zafra_core=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Zafra startup banner.
fn print_banner() {
    println!(
        r#"
  ███████╗ █████╗ ███████╗██████╗  █████╗
  ╚══███╔╝██╔══██╗██╔════╝██╔══██╗██╔══██╗
    ███╔╝ ███████║█████╗  ██████╔╝███████║
   ███╔╝  ██╔══██║██╔══╝  ██╔══██╗██╔══██║
  ███████╗██║  ██║██║     ██║  ██║██║  ██║
  ╚══════╝╚═╝  ╚═╝╚═╝     ╚═╝  ╚═╝╚═╝  ╚═╝

  Farm-Logistics Ledger v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
