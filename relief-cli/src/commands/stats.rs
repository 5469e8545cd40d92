//! Stats command - platform-wide totals.

use console::style;

use relief_core::config::ConfigHandle;
use relief_core::error::ReliefResult;

use super::{format_money, print_json, progress_bar};
use crate::OutputFormat;

pub async fn run(config: ConfigHandle, format: OutputFormat) -> ReliefResult<()> {
    let api = super::create_api_client(&config).await?;
    let stats = api.stats().await?;

    match format {
        OutputFormat::Json => print_json(&stats),
        OutputFormat::Text => {
            let funded = if stats.total_goal > 0.0 {
                stats.total_raised / stats.total_goal
            } else {
                0.0
            };

            println!("{}", style("Campaigns").bold().underlined());
            println!("  Total:       {}", stats.total_campaigns);
            println!("  Active:      {}", style(stats.active_campaigns).green());
            println!("  Completed:   {}", style(stats.completed_campaigns).cyan());
            println!();
            println!("{}", style("Funding").bold().underlined());
            println!("  Raised:      {}", format_money(stats.total_raised));
            println!("  Goal:        {}", format_money(stats.total_goal));
            println!("  Progress:    {}", progress_bar(funded));
            println!("  Donations:   {}", stats.total_donations);
            println!("  Donors:      {}", stats.unique_donors);
            println!("  Average:     {}", format_money(stats.average_donation));
            println!();
            println!("{}", style("Accountability").bold().underlined());
            println!(
                "  Proofs:      {} ({} verified)",
                stats.total_proofs, stats.verified_proofs
            );
            println!("  Users:       {}", stats.total_users);
        }
    }
    Ok(())
}
