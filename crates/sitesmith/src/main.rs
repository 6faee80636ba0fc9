// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sitesmith - conversational website builder.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod doctor;
mod serve;
mod shutdown;

use clap::{Parser, Subcommand};
use sitesmith_config::SitesmithConfig;

/// Sitesmith - conversational website builder.
#[derive(Parser, Debug)]
#[command(name = "sitesmith", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server (the default).
    Serve,
    /// Check configuration, storage and upstream reachability.
    Doctor,
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // A missing .env is not an error.
    let _ = dotenvy::dotenv();

    let config = match sitesmith_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            sitesmith_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Doctor => doctor::run_doctor(&config).await,
        Commands::Config => print_config(&config),
    };

    if let Err(e) = result {
        eprintln!("sitesmith: {e}");
        std::process::exit(1);
    }
}

fn print_config(config: &SitesmithConfig) -> Result<(), sitesmith_core::SitesmithError> {
    let mut shown = config.clone();
    if shown.huggingface.api_key.is_some() {
        shown.huggingface.api_key = Some("[REDACTED]".to_string());
    }
    let json = serde_json::to_string_pretty(&shown)
        .map_err(|e| sitesmith_core::SitesmithError::Internal(e.to_string()))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["sitesmith"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["sitesmith", "doctor"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Doctor)));
    }

    #[test]
    fn complete_config_validates() {
        let config = sitesmith_config::load_and_validate_str(
            r#"
[gathering]
url = "http://localhost:11434"
model = "gemma3:12b"
timeout = 60
temperature = 0.7
max_tokens = 512
stream = false

[builder]
url = "http://localhost:11434"
model = "qwen2.5-coder:14b"
timeout = 600
temperature = 0.4
max_tokens = 8000
stream = false
"#,
        )
        .expect("complete config should be valid");
        assert_eq!(config.server.port, 8080);
        assert!(config.gathering.resolve(&config.huggingface).is_some());
    }
}
