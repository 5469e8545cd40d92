//! Simulated chain commands.

use std::time::Duration;

use clap::Subcommand;
use comfy_table::Cell;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use relief_chain::{demo, DemoStep, SimulatedChain};
use relief_core::config::ConfigHandle;
use relief_core::error::ReliefResult;

use super::{new_table, print_json};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ChainAction {
    /// Walk through an escrow: deploy, donate, collect approvals, release.
    Demo {
        /// Simulated latency per chain call, in milliseconds (overrides config).
        #[arg(long)]
        latency_ms: Option<u64>,
        /// Seed for reproducible addresses and transaction ids.
        #[arg(long)]
        seed: Option<u64>,
    },
}

pub async fn run(config: ConfigHandle, action: ChainAction, format: OutputFormat) -> ReliefResult<()> {
    match action {
        ChainAction::Demo { latency_ms, seed } => {
            let mut chain_config = config.read().await.chain.clone();
            if let Some(ms) = latency_ms {
                chain_config.latency_ms = ms;
            }
            let mut chain = SimulatedChain::from_config(&chain_config);
            if let Some(s) = seed {
                chain = chain.with_seed(s);
            }

            let pb = if format == OutputFormat::Text {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("  {spinner} [{elapsed_precise}] {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb.enable_steady_tick(Duration::from_millis(100));
                pb.set_message("Preparing accounts...");
                pb
            } else {
                ProgressBar::hidden()
            };

            let observer = |step: &DemoStep| {
                pb.println(format!(
                    "  {} {}. {}: {}",
                    style("OK").green().bold(),
                    step.index,
                    step.title,
                    step.detail
                ));
                pb.set_message(format!("{} done", step.title));
            };
            let result = demo::run(
                &chain,
                &chain_config.oracles,
                chain_config.approval_threshold,
                observer,
            )
            .await;
            pb.finish_and_clear();
            let report = result?;

            match format {
                OutputFormat::Json => print_json(&report),
                OutputFormat::Text => {
                    println!();
                    println!("{}", style("Escrow walkthrough").bold().underlined());
                    println!("  Network:     {}", report.network);
                    println!("  App ID:      {}", report.app_id);
                    println!("  Escrow:      {}", report.escrow_address);
                    println!("  Donated:     {}", report.donated);
                    println!("  Released:    {}", style(report.released).green());
                    println!(
                        "  Approvals:   {} ({:.2} of {:.2} required)",
                        report.approvals, report.approved_weight, report.threshold
                    );
                    println!(
                        "  Early release blocked: {}",
                        if report.early_release_blocked { "yes" } else { "no" }
                    );
                    println!();

                    let mut table = new_table();
                    table.set_header(vec!["#", "Transaction"]);
                    for (i, tx) in report.transactions.iter().enumerate() {
                        table.add_row(vec![Cell::new(i + 1), Cell::new(tx)]);
                    }
                    println!("{table}");
                }
            }
        }
    }
    Ok(())
}
