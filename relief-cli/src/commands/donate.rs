//! Donate command.

use console::style;

use relief_core::config::ConfigHandle;
use relief_core::error::ReliefResult;
use relief_models::{Amount, NewDonation};

use super::{format_money, print_json, progress_bar};
use crate::OutputFormat;

pub async fn run(
    config: ConfigHandle,
    campaign_id: u64,
    amount: String,
    donor: Option<String>,
    message: Option<String>,
    format: OutputFormat,
) -> ReliefResult<()> {
    let amount = Amount::Text(amount);
    // Reject junk before it reaches the server.
    amount.value()?;

    let api = super::create_api_client(&config).await?;
    let receipt = api
        .donate(campaign_id, &NewDonation { amount, donor, message })
        .await?;

    match format {
        OutputFormat::Json => print_json(&receipt),
        OutputFormat::Text => {
            let d = &receipt.donation;
            let c = &receipt.campaign;
            println!(
                "{} {} donated {} to {}",
                style("OK").green().bold(),
                d.donor,
                style(format_money(d.amount)).bold(),
                c.title
            );
            println!("  Transaction: {}", style(&d.tx_id).dim());
            println!(
                "  Campaign:    {} of {}  {}",
                format_money(c.raised),
                format_money(c.goal),
                progress_bar(c.progress())
            );
            if c.goal_reached() {
                println!("  {}", style("Goal reached!").cyan().bold());
            }
        }
    }
    Ok(())
}
