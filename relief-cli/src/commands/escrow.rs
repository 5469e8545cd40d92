//! Escrow commands.

use clap::Subcommand;
use comfy_table::Cell;
use console::style;

use relief_core::config::ConfigHandle;
use relief_core::error::ReliefResult;
use relief_services::EscrowStatus;

use super::{new_table, print_json, progress_bar};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum EscrowAction {
    /// Show the escrow balance and oracle approvals.
    Status,
    /// Send ALGO straight into the escrow.
    Donate {
        /// Amount in ALGO.
        algos: f64,
        /// Donor name.
        #[arg(short, long)]
        donor: Option<String>,
        /// Campaign the donation is earmarked for.
        #[arg(long)]
        campaign: Option<u64>,
    },
    /// Approve the current escrow as an oracle.
    Approve {
        /// Oracle name (case-insensitive) or address.
        oracle: String,
    },
    /// Pay the escrow balance to its beneficiary.
    Release,
}

pub async fn run(config: ConfigHandle, action: EscrowAction, format: OutputFormat) -> ReliefResult<()> {
    let api = super::create_api_client(&config).await?;

    match action {
        EscrowAction::Status => {
            let status = api.escrow_status().await?;
            match format {
                OutputFormat::Json => print_json(&status),
                OutputFormat::Text => print_status(&status),
            }
        }

        EscrowAction::Donate { algos, donor, campaign } => {
            let receipt = api.quick_donate(algos, donor.as_deref(), campaign).await?;
            match format {
                OutputFormat::Json => print_json(&receipt),
                OutputFormat::Text => {
                    println!(
                        "{} sent {:.6} ALGO to escrow app {} on {}",
                        style("OK").green().bold(),
                        receipt.amount,
                        receipt.app_id,
                        receipt.network
                    );
                    println!("  Transaction: {}", style(&receipt.tx_id).dim());
                }
            }
        }

        EscrowAction::Approve { oracle } => {
            let status = api.approve_escrow(&oracle).await?;
            match format {
                OutputFormat::Json => print_json(&status),
                OutputFormat::Text => {
                    println!(
                        "{} {} approved escrow app {}",
                        style("OK").green().bold(),
                        oracle,
                        status.app_id
                    );
                    println!();
                    print_status(&status);
                }
            }
        }

        EscrowAction::Release => {
            let release = api.release_escrow().await?;
            match format {
                OutputFormat::Json => print_json(&release),
                OutputFormat::Text => {
                    println!(
                        "{} released {} from escrow app {} on {}",
                        style("OK").green().bold(),
                        style(release.amount).bold(),
                        release.app_id,
                        release.network
                    );
                    println!("  Beneficiary: {}", release.beneficiary);
                    println!("  Transaction: {}", style(&release.tx_id).dim());
                }
            }
        }
    }

    Ok(())
}

fn print_status(status: &EscrowStatus) {
    println!("{}", style("Escrow").bold().underlined());
    println!("  Network:     {}", status.network);
    println!("  App ID:      {}", status.app_id);
    println!("  Address:     {}", status.address);
    println!("  Beneficiary: {}", status.beneficiary);
    println!("  Balance:     {}", style(status.balance).bold());
    let approval = if status.threshold > 0.0 {
        status.approved_weight / status.threshold
    } else {
        1.0
    };
    println!(
        "  Approvals:   {:.2} of {:.2}  {}",
        status.approved_weight,
        status.threshold,
        progress_bar(approval)
    );
    let state = if status.released {
        style("released").cyan()
    } else if status.can_release {
        style("ready to release").green()
    } else {
        style("awaiting approvals").yellow()
    };
    println!("  State:       {state}");
    println!();

    let mut table = new_table();
    table.set_header(vec!["Oracle", "Weight", "Approved", "Address"]);
    for oracle in &status.oracles {
        table.add_row(vec![
            Cell::new(&oracle.name),
            Cell::new(format!("{:.2}", oracle.weight)),
            Cell::new(if oracle.approved { "yes" } else { "no" }),
            Cell::new(&oracle.address),
        ]);
    }
    println!("{table}");
}
