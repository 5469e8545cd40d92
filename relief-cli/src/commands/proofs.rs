//! Proof-of-delivery commands.

use std::path::PathBuf;

use clap::Subcommand;
use comfy_table::Cell;
use console::style;

use relief_api::ProofFile;
use relief_core::config::ConfigHandle;
use relief_core::error::ReliefResult;
use relief_models::{Proof, ProofStatus};

use super::{new_table, print_json, truncate};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ProofsAction {
    /// List proofs uploaded for a campaign.
    List {
        /// Campaign id.
        campaign_id: u64,
    },
    /// Upload a receipt, photo or report for a campaign.
    Upload {
        /// Campaign id.
        campaign_id: u64,
        /// File to upload.
        file: PathBuf,
        /// Short description of what the file shows.
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Mark a proof as verified.
    Verify {
        /// Proof id.
        proof_id: u64,
    },
    /// Mark a proof as rejected.
    Reject {
        /// Proof id.
        proof_id: u64,
    },
}

pub async fn run(config: ConfigHandle, action: ProofsAction, format: OutputFormat) -> ReliefResult<()> {
    let api = super::create_api_client(&config).await?;

    match action {
        ProofsAction::List { campaign_id } => {
            let proofs = api.proofs(campaign_id).await?;
            match format {
                OutputFormat::Json => print_json(&proofs),
                OutputFormat::Text => {
                    if proofs.is_empty() {
                        println!("No proofs uploaded for campaign {campaign_id}.");
                        return Ok(());
                    }
                    let mut table = new_table();
                    table.set_header(vec!["ID", "File", "Type", "Size", "Status", "Description", "Uploaded"]);
                    for p in &proofs {
                        table.add_row(vec![
                            Cell::new(p.id),
                            Cell::new(truncate(&p.original_name, 28)),
                            Cell::new(&p.mime_type),
                            Cell::new(format_bytes(p.size)),
                            Cell::new(status_label(p.status)),
                            Cell::new(truncate(p.description.as_deref().unwrap_or(""), 30)),
                            Cell::new(p.uploaded_at.format("%Y-%m-%d %H:%M")),
                        ]);
                    }
                    println!("{table}");
                }
            }
        }

        ProofsAction::Upload {
            campaign_id,
            file,
            description,
        } => {
            let proof_file = ProofFile::from_path(&file).await?;
            let proof = api
                .upload_proof(campaign_id, proof_file, description.as_deref())
                .await?;
            print_proof(&proof, "uploaded", format);
        }

        ProofsAction::Verify { proof_id } => {
            let proof = api.set_proof_status(proof_id, ProofStatus::Verified).await?;
            print_proof(&proof, "verified", format);
        }

        ProofsAction::Reject { proof_id } => {
            let proof = api.set_proof_status(proof_id, ProofStatus::Rejected).await?;
            print_proof(&proof, "rejected", format);
        }
    }

    Ok(())
}

fn print_proof(proof: &Proof, verb: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(proof),
        OutputFormat::Text => {
            println!(
                "{} {verb} proof {} for campaign {}",
                style("OK").green().bold(),
                style(proof.id).cyan(),
                proof.campaign_id
            );
            println!("  File:   {} ({})", proof.original_name, format_bytes(proof.size));
            println!("  Stored: {}", proof.file_name);
            println!("  Status: {}", status_label(proof.status));
        }
    }
}

fn status_label(status: ProofStatus) -> String {
    let label = status.to_string();
    match status {
        ProofStatus::Verified => style(label).green().to_string(),
        ProofStatus::Rejected => style(label).red().to_string(),
        ProofStatus::Pending => style(label).yellow().to_string(),
    }
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
