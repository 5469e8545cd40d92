//! Relief CLI - command-line front end for the relief platform.
//!
//! Runs the REST server, talks to a running server through `relief-api`,
//! and exposes the offline calculators and the simulated escrow walkthrough.

mod commands;

use std::path::Path;

use clap::{Parser, Subcommand};
use tracing::info;

use relief_core::config::{AppConfig, ConfigHandle};
use relief_core::error::ReliefResult;
use relief_core::logging;

/// Relief - disaster-relief donation platform.
#[derive(Parser)]
#[command(
    name = "relief",
    version,
    about = "Disaster-relief donation platform CLI",
    long_about = "Serve the relief REST API, browse and fund campaigns on a running server,\n\
                  run the risk, supply and impact calculators, and walk through the simulated escrow."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST server over a freshly seeded store.
    Serve {
        /// Interface to bind (overrides config).
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides config).
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Browse and create campaigns.
    Campaigns {
        #[command(subcommand)]
        action: commands::campaigns::CampaignsAction,
    },
    /// Donate to a campaign.
    Donate {
        /// Campaign id.
        id: u64,
        /// Amount, e.g. "25" or "25.50".
        amount: String,
        /// Donor name shown on the campaign.
        #[arg(short, long)]
        donor: Option<String>,
        /// Message attached to the donation.
        #[arg(short, long)]
        message: Option<String>,
    },
    /// List, upload and review proofs of aid delivery.
    Proofs {
        #[command(subcommand)]
        action: commands::proofs::ProofsAction,
    },
    /// Log in and print the session token.
    Login {
        /// Account email.
        #[arg(short, long)]
        email: Option<String>,
        /// Account password (prompted when omitted).
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Show the current user's profile.
    Profile,
    /// Show platform-wide statistics.
    Stats,
    /// Inspect the escrow and make quick on-chain donations.
    Escrow {
        #[command(subcommand)]
        action: commands::escrow::EscrowAction,
    },
    /// Run the risk, impact and supply calculators locally.
    Assess {
        #[command(subcommand)]
        action: commands::assess::AssessAction,
    },
    /// Simulated chain utilities.
    Chain {
        #[command(subcommand)]
        action: commands::chain::ChainAction,
    },
    /// View and write configuration.
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Load the config from `--config` or the default location. `config`
/// subcommands tolerate a missing explicit file so `config init` can create it.
fn load_config(path: Option<&str>, allow_missing: bool) -> ReliefResult<AppConfig> {
    match path {
        Some(p) if allow_missing && !Path::new(p).exists() => Ok(AppConfig::default()),
        Some(p) => AppConfig::load_from_file(Path::new(p)),
        None => AppConfig::load_default(),
    }
}

#[tokio::main]
async fn main() -> ReliefResult<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), matches!(cli.command, Commands::Config { .. }))?;

    // The server logs to the configured directory; every other command only
    // needs warnings on the console.
    let _guard = if matches!(cli.command, Commands::Serve { .. }) {
        let level = if cli.verbose { "debug".to_string() } else { config.logging.level.clone() };
        let log_dir = config.effective_log_dir()?;
        Some(logging::init_logging(&level, &log_dir, config.logging.json_output)?)
    } else {
        logging::init_console_logging(if cli.verbose { "debug" } else { "warn" });
        None
    };

    let config_handle = ConfigHandle::new(config);

    info!("relief CLI v{}", relief_core::constants::APP_VERSION);

    match cli.command {
        Commands::Serve { host, port } => commands::serve::run(config_handle, host, port).await,
        Commands::Campaigns { action } => commands::campaigns::run(config_handle, action, cli.format).await,
        Commands::Donate { id, amount, donor, message } => {
            commands::donate::run(config_handle, id, amount, donor, message, cli.format).await
        }
        Commands::Proofs { action } => commands::proofs::run(config_handle, action, cli.format).await,
        Commands::Login { email, password } => {
            commands::users::login(config_handle, email, password, cli.format).await
        }
        Commands::Profile => commands::users::profile(config_handle, cli.format).await,
        Commands::Stats => commands::stats::run(config_handle, cli.format).await,
        Commands::Escrow { action } => commands::escrow::run(config_handle, action, cli.format).await,
        Commands::Assess { action } => commands::assess::run(action, cli.format),
        Commands::Chain { action } => commands::chain::run(config_handle, action, cli.format).await,
        Commands::Config { action } => {
            commands::config::run(config_handle, cli.config.as_deref(), action, cli.format).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["relief", "campaigns", "list", "--status", "active", "-f", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Campaigns { .. }));
    }

    #[test]
    fn test_parses_offline_allocate() {
        let cli = Cli::try_parse_from([
            "relief", "assess", "allocate", "--units", "500",
            "--region", "North:1000:0.9:0.2", "--region", "South:4000:0.4:0.9",
        ])
        .unwrap();
        match cli.command {
            Commands::Assess {
                action: commands::assess::AssessAction::Allocate { units, regions },
            } => {
                assert_eq!(units, 500);
                assert_eq!(regions.len(), 2);
                assert_eq!(regions[1].name, "South");
            }
            _ => panic!("expected assess allocate"),
        }
    }

    #[test]
    fn test_parses_escrow_approve_and_release() {
        let cli = Cli::try_parse_from(["relief", "escrow", "approve", "Local Government"]).unwrap();
        match cli.command {
            Commands::Escrow {
                action: commands::escrow::EscrowAction::Approve { oracle },
            } => assert_eq!(oracle, "Local Government"),
            _ => panic!("expected escrow approve"),
        }
        let cli = Cli::try_parse_from(["relief", "escrow", "release"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Escrow {
                action: commands::escrow::EscrowAction::Release
            }
        ));
    }

    #[test]
    fn test_missing_explicit_config_only_allowed_for_config_commands() {
        let missing = "/nonexistent/relief/config.toml";
        assert!(load_config(Some(missing), true).is_ok());
        assert!(load_config(Some(missing), false).is_err());
    }
}
