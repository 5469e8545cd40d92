//! Campaign commands.

use clap::Subcommand;
use comfy_table::Cell;
use console::style;

use relief_api::CampaignQuery;
use relief_core::config::ConfigHandle;
use relief_core::error::ReliefResult;
use relief_models::{Campaign, CampaignStatus, DisasterType, NewCampaign};

use super::{format_money, new_table, print_json, progress_bar, truncate};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum CampaignsAction {
    /// List campaigns.
    List {
        /// Page number (1-based).
        #[arg(short, long, default_value = "1")]
        page: usize,
        /// Campaigns per page.
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
        /// Only campaigns with this status (active, completed, paused).
        #[arg(short, long)]
        status: Option<String>,
        /// Only campaigns for this disaster type.
        #[arg(short = 't', long = "type")]
        disaster_type: Option<String>,
        /// Text to search for in title, description and location.
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Show one campaign with its donations.
    Show {
        /// Campaign id.
        id: u64,
    },
    /// Create a campaign.
    Create {
        /// Campaign title.
        title: String,
        /// Fundraising goal.
        #[arg(short, long)]
        goal: Option<f64>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        location: Option<String>,
        /// Disaster type (flood, earthquake, wildfire, hurricane, ...).
        #[arg(short = 't', long = "type")]
        disaster_type: Option<String>,
        /// Organizer name.
        #[arg(long)]
        creator: Option<String>,
        /// Chain address that receives released funds.
        #[arg(long)]
        beneficiary: Option<String>,
    },
}

pub async fn run(config: ConfigHandle, action: CampaignsAction, format: OutputFormat) -> ReliefResult<()> {
    let api = super::create_api_client(&config).await?;

    match action {
        CampaignsAction::List {
            page,
            limit,
            status,
            disaster_type,
            query,
        } => {
            // Validate locally so typos fail before the round trip.
            let status = status.as_deref().map(CampaignStatus::parse).transpose()?;
            let disaster_type = disaster_type.as_deref().map(DisasterType::parse).transpose()?;
            let list = api
                .campaigns(&CampaignQuery {
                    page: Some(page),
                    limit: Some(limit),
                    status,
                    disaster_type,
                    q: query,
                })
                .await?;

            match format {
                OutputFormat::Json => print_json(&list),
                OutputFormat::Text => {
                    if list.campaigns.is_empty() {
                        println!("No campaigns found.");
                        return Ok(());
                    }
                    let mut table = new_table();
                    table.set_header(vec!["ID", "Title", "Type", "Location", "Raised", "Goal", "Progress", "Status"]);
                    for c in &list.campaigns {
                        table.add_row(vec![
                            Cell::new(c.id),
                            Cell::new(truncate(&c.title, 32)),
                            Cell::new(c.disaster_type.as_str()),
                            Cell::new(truncate(&c.location, 20)),
                            Cell::new(format_money(c.raised)),
                            Cell::new(format_money(c.goal)),
                            Cell::new(progress_bar(c.progress())),
                            Cell::new(c.status.as_str()),
                        ]);
                    }
                    println!("{table}");
                    println!(
                        "  Page {}/{} ({} campaigns)",
                        list.page,
                        list.total_pages.max(1),
                        list.total
                    );
                }
            }
        }

        CampaignsAction::Show { id } => {
            let campaign = api.campaign(id).await?;
            let donations = api.donations(id).await?;

            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "campaign": campaign,
                    "donations": donations,
                })),
                OutputFormat::Text => {
                    print_campaign(&campaign);
                    println!();
                    println!("{}", style("Donations").bold().underlined());
                    if donations.is_empty() {
                        println!("  No donations yet.");
                    } else {
                        let mut table = new_table();
                        table.set_header(vec!["ID", "Donor", "Amount", "Message", "Tx", "Date"]);
                        for d in &donations {
                            table.add_row(vec![
                                Cell::new(d.id),
                                Cell::new(truncate(&d.donor, 20)),
                                Cell::new(format_money(d.amount)),
                                Cell::new(truncate(d.message.as_deref().unwrap_or(""), 30)),
                                Cell::new(truncate(&d.tx_id, 12)),
                                Cell::new(d.created_at.format("%Y-%m-%d %H:%M")),
                            ]);
                        }
                        println!("{table}");
                    }
                }
            }
        }

        CampaignsAction::Create {
            title,
            goal,
            description,
            location,
            disaster_type,
            creator,
            beneficiary,
        } => {
            let new = NewCampaign {
                title,
                description,
                goal,
                location,
                disaster_type: disaster_type.as_deref().map(DisasterType::parse).transpose()?,
                status: None,
                creator,
                beneficiary_address: beneficiary,
                image_url: None,
                end_date: None,
            };
            new.validate()?;
            let campaign = api.create_campaign(&new).await?;

            match format {
                OutputFormat::Json => print_json(&campaign),
                OutputFormat::Text => {
                    println!(
                        "{} created campaign {} ({})",
                        style("OK").green().bold(),
                        style(campaign.id).cyan(),
                        campaign.title
                    );
                }
            }
        }
    }

    Ok(())
}

fn print_campaign(c: &Campaign) {
    println!("{}", style(&c.title).bold().underlined());
    println!("  ID:          {}", c.id);
    println!("  Status:      {}", status_label(c.status));
    println!("  Type:        {}", c.disaster_type.as_str());
    println!("  Location:    {}", c.location);
    println!("  Creator:     {}", c.creator);
    println!(
        "  Raised:      {} of {}  {}",
        format_money(c.raised),
        format_money(c.goal),
        progress_bar(c.progress())
    );
    if let Some(addr) = &c.beneficiary_address {
        println!("  Beneficiary: {addr}");
    }
    if let Some(end) = c.end_date {
        println!("  Ends:        {}", end.format("%Y-%m-%d"));
    }
    println!("  Created:     {}", c.created_at.format("%Y-%m-%d %H:%M"));
    if !c.description.is_empty() {
        println!();
        println!("  {}", c.description);
    }
}

fn status_label(status: CampaignStatus) -> String {
    match status {
        CampaignStatus::Active => style(status.as_str()).green().to_string(),
        CampaignStatus::Completed => style(status.as_str()).cyan().to_string(),
        CampaignStatus::Paused => style(status.as_str()).yellow().to_string(),
    }
}
