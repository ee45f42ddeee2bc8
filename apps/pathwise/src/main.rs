//! # Pathwise - Adaptive Learning Playlists
//!
//! The command-line harness for the Pathwise sequencing engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            apps/pathwise (THE BINARY)         │
//! │                                               │
//! │   ┌────────────┐   ┌──────────────────────┐   │
//! │   │    CLI     │   │  Course manifest     │   │
//! │   │   (clap)   │   │  (TOML)              │   │
//! │   └─────┬──────┘   └──────────┬───────────┘   │
//! │         └───────────┬─────────┘               │
//! │                     ▼                         │
//! │            ┌────────────────┐   ┌─────────┐   │
//! │            │ pathwise-core  │──▶│  redb   │   │
//! │            │  (THE LOGIC)   │   │sessions │   │
//! │            └────────────────┘   └─────────┘   │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! pathwise -m course.toml -e learner-7 init
//! pathwise -m course.toml -e learner-7 step
//! pathwise -m course.toml -e learner-7 gate --score 0.4 --failed vectors,matrices
//! pathwise -m course.toml -e learner-7 show
//! ```

use clap::Parser;
use pathwise::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // Initialize tracing: PATHWISE_LOG_FORMAT=json selects JSON output.
    let log_format = std::env::var("PATHWISE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "pathwise=debug,pathwise_core=debug"
    } else {
        "pathwise=info,pathwise_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

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

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Pathwise startup banner.
fn print_banner() {
    eprintln!(
        r#"
  ┌─┐┌─┐┌┬┐┬ ┬┬ ┬┬┌─┐┌─┐
  ├─┘├─┤ │ ├─┤││││└─┐├┤
  ┴  ┴ ┴ ┴ ┴ ┴└┴┘┴└─┘└─┘  v{}

  Gates • Retries • Remediation
"#,
        env!("CARGO_PKG_VERSION")
    );
}
