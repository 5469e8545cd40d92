//! Scripted escrow walkthrough.
//!
//! Creates the cast (creator, donor, beneficiary, one account per oracle),
//! funds them, deploys an escrow, donates into it, collects oracle approvals
//! one at a time, and releases the funds once the threshold is met. Each step
//! is reported to an observer as it completes.

use serde::Serialize;
use tracing::info;

use relief_core::config::OracleConfig;
use relief_core::error::{ReliefError, ReliefResult};

use crate::client::ChainClient;
use crate::types::{MicroAlgos, OracleSpec};

const DONOR_FUNDING_ALGOS: u64 = 100;
const DONATION_ALGOS: u64 = 25;
/// Enough to cover a handful of fees.
const FEE_FUNDING_ALGOS: u64 = 1;

/// One completed step of the walkthrough.
#[derive(Debug, Clone, Serialize)]
pub struct DemoStep {
    pub index: usize,
    pub title: String,
    pub detail: String,
}

/// Summary of a finished walkthrough.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoReport {
    pub network: String,
    pub app_id: u64,
    pub escrow_address: String,
    pub donor: String,
    pub beneficiary: String,
    pub donated: MicroAlgos,
    pub released: MicroAlgos,
    pub approvals: usize,
    pub approved_weight: f64,
    pub threshold: f64,
    /// Whether a release attempted before the threshold was refused.
    pub early_release_blocked: bool,
    pub transactions: Vec<String>,
    pub steps: Vec<DemoStep>,
}

struct Recorder<F> {
    steps: Vec<DemoStep>,
    observer: F,
}

impl<F: FnMut(&DemoStep)> Recorder<F> {
    fn step(&mut self, title: impl Into<String>, detail: impl Into<String>) {
        let step = DemoStep {
            index: self.steps.len() + 1,
            title: title.into(),
            detail: detail.into(),
        };
        info!("demo step {}: {}", step.index, step.title);
        (self.observer)(&step);
        self.steps.push(step);
    }
}

fn short(address: &str) -> &str {
    address.get(..8).unwrap_or(address)
}

/// Run the walkthrough against `client`.
pub async fn run<C, F>(
    client: &C,
    oracles: &[OracleConfig],
    threshold: f64,
    observer: F,
) -> ReliefResult<DemoReport>
where
    C: ChainClient + ?Sized,
    F: FnMut(&DemoStep),
{
    if oracles.is_empty() {
        return Err(ReliefError::InvalidInput("demo needs at least one oracle".into()));
    }
    let mut rec = Recorder {
        steps: Vec::new(),
        observer,
    };
    let mut transactions = Vec::new();

    let creator = client.create_account().await?;
    let donor = client.create_account().await?;
    let beneficiary = client.create_account().await?;
    rec.step(
        "Create accounts",
        format!(
            "creator {}, donor {}, beneficiary {}",
            short(&creator.address),
            short(&donor.address),
            short(&beneficiary.address)
        ),
    );

    let mut members = Vec::with_capacity(oracles.len());
    for oracle in oracles {
        let account = client.create_account().await?;
        members.push(OracleSpec {
            address: account.address,
            name: oracle.name.clone(),
            weight: oracle.weight,
        });
    }
    rec.step(
        "Register oracles",
        members
            .iter()
            .map(|o| format!("{} (weight {:.2})", o.name, o.weight))
            .collect::<Vec<_>>()
            .join(", "),
    );

    transactions.push(
        client
            .fund_account(&donor.address, MicroAlgos::from_algos(DONOR_FUNDING_ALGOS))
            .await?
            .id,
    );
    transactions.push(
        client
            .fund_account(&creator.address, MicroAlgos::from_algos(FEE_FUNDING_ALGOS))
            .await?
            .id,
    );
    for member in &members {
        transactions.push(
            client
                .fund_account(&member.address, MicroAlgos::from_algos(FEE_FUNDING_ALGOS))
                .await?
                .id,
        );
    }
    rec.step(
        "Fund accounts",
        format!("donor received {}", MicroAlgos::from_algos(DONOR_FUNDING_ALGOS)),
    );

    let escrow = client
        .deploy_escrow(&creator.address, &beneficiary.address, &members, threshold)
        .await?;
    transactions.push(escrow.tx_id.clone());
    rec.step(
        "Deploy escrow",
        format!("app {} at {}, threshold {:.0}%", escrow.app_id, short(&escrow.address), threshold * 100.0),
    );

    let donated = MicroAlgos::from_algos(DONATION_ALGOS);
    let deposit = client.escrow_deposit(escrow.app_id, &donor.address, donated).await?;
    transactions.push(deposit.id);
    rec.step("Donate", format!("{donated} deposited into escrow"));

    let mut early_release_blocked = false;
    for member in &members {
        let state = client.escrow_state(escrow.app_id).await?;
        if state.can_release() {
            break;
        }
        let tx = client.oracle_approve(escrow.app_id, &member.address).await?;
        transactions.push(tx.id);
        let state = client.escrow_state(escrow.app_id).await?;
        rec.step(
            format!("{} approves", member.name),
            format!(
                "approved weight {:.0}% of required {:.0}%",
                state.approved_weight * 100.0,
                state.threshold * 100.0
            ),
        );

        if state.approvals() == 1 && !state.can_release() {
            match client.escrow_release(escrow.app_id, &creator.address).await {
                Err(ReliefError::InsufficientApprovals { have, need }) => {
                    early_release_blocked = true;
                    rec.step(
                        "Early release refused",
                        format!("{:.0}% approved, {:.0}% needed", have * 100.0, need * 100.0),
                    );
                }
                Err(e) => return Err(e),
                Ok(_) => {
                    return Err(ReliefError::Chain(
                        "escrow released below its approval threshold".into(),
                    ))
                }
            }
        }
    }

    let release = client.escrow_release(escrow.app_id, &creator.address).await?;
    transactions.push(release.id);
    let final_state = client.escrow_state(escrow.app_id).await?;
    let beneficiary_balance = client.balance(&beneficiary.address).await?;
    rec.step(
        "Release funds",
        format!("beneficiary balance {beneficiary_balance}"),
    );

    Ok(DemoReport {
        network: client.network().to_string(),
        app_id: escrow.app_id,
        escrow_address: escrow.address,
        donor: donor.address,
        beneficiary: beneficiary.address,
        donated,
        released: release.amount,
        approvals: final_state.approvals(),
        approved_weight: final_state.approved_weight,
        threshold: final_state.threshold,
        early_release_blocked,
        transactions,
        steps: rec.steps,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::simulated::SimulatedChain;

    fn oracles() -> Vec<OracleConfig> {
        vec![
            OracleConfig { name: "Red Cross".into(), weight: 0.4 },
            OracleConfig { name: "Local Government".into(), weight: 0.35 },
            OracleConfig { name: "Satellite".into(), weight: 0.25 },
        ]
    }

    #[tokio::test]
    async fn test_demo_releases_donation() {
        let chain = SimulatedChain::new("testnet", Duration::ZERO).with_seed(9);
        let mut seen = Vec::new();
        let report = run(&chain, &oracles(), 0.66, |step: &DemoStep| seen.push(step.title.clone()))
            .await
            .unwrap();

        assert_eq!(report.donated, MicroAlgos::from_algos(DONATION_ALGOS));
        assert_eq!(report.released, report.donated);
        // Two of three oracles reach 75%, so the third is never asked.
        assert_eq!(report.approvals, 2);
        assert!(report.early_release_blocked);
        assert_eq!(seen.len(), report.steps.len());
        assert_eq!(seen.first().map(String::as_str), Some("Create accounts"));
        assert_eq!(seen.last().map(String::as_str), Some("Release funds"));
        assert_eq!(
            chain.balance(&report.beneficiary).await.unwrap(),
            MicroAlgos::from_algos(DONATION_ALGOS)
        );
    }

    #[tokio::test]
    async fn test_demo_single_oracle() {
        let chain = SimulatedChain::new("testnet", Duration::ZERO);
        let one = vec![OracleConfig { name: "Solo".into(), weight: 1.0 }];
        let report = run(&chain, &one, 1.0, |_: &DemoStep| {}).await.unwrap();
        assert_eq!(report.approvals, 1);
        assert!(!report.early_release_blocked);
    }

    #[tokio::test]
    async fn test_demo_needs_oracles() {
        let chain = SimulatedChain::new("testnet", Duration::ZERO);
        assert!(run(&chain, &[], 0.5, |_: &DemoStep| {}).await.is_err());
    }
}
