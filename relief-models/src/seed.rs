//! Startup data generator.
//!
//! Builds a plausible set of campaigns, donations, proofs, and users so a
//! freshly started server has something to show. With `rng_seed` set the
//! generated content is identical across runs (timestamps aside).

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use relief_core::config::StoreConfig;
use relief_core::ids;

use crate::models::campaign::{Campaign, CampaignStatus, DisasterType};
use crate::models::donation::Donation;
use crate::models::proof::{Proof, ProofStatus};
use crate::models::user::User;
use crate::store::StoreData;

/// Email of the always-present demo administrator.
pub const DEMO_ADMIN_EMAIL: &str = "admin@relief.org";

/// Password of the demo administrator.
pub const DEMO_ADMIN_PASSWORD: &str = "admin123";

const LOCATIONS: &[&str] = &[
    "Kerala, India",
    "Sindh, Pakistan",
    "Hatay, Turkey",
    "Maui, Hawaii",
    "Valencia, Spain",
    "Tacloban, Philippines",
    "Beira, Mozambique",
    "Derna, Libya",
    "Sulawesi, Indonesia",
    "Turkana, Kenya",
];

const DONOR_NAMES: &[&str] = &[
    "Amara Okafor",
    "Lucas Meyer",
    "Priya Nair",
    "Sofia Rossi",
    "Kenji Watanabe",
    "Fatima Zahra",
    "Diego Alvarez",
    "Anonymous",
    "Hannah Schmidt",
    "Omar Haddad",
];

const DONOR_MESSAGES: &[&str] = &[
    "Stay strong.",
    "For the families rebuilding.",
    "Clean water first.",
    "Sending support from afar.",
];

const PROOF_FILES: &[(&str, &str)] = &[
    ("distribution-photo.jpg", "image/jpeg"),
    ("supplier-invoice.pdf", "application/pdf"),
    ("shelter-site.png", "image/png"),
];

fn title_for(kind: DisasterType, location: &str) -> String {
    let place = location.split(',').next().unwrap_or(location);
    match kind {
        DisasterType::Flood => format!("{place} Flood Recovery Fund"),
        DisasterType::Earthquake => format!("{place} Earthquake Emergency Shelter"),
        DisasterType::Wildfire => format!("{place} Wildfire Survivors Aid"),
        DisasterType::Hurricane => format!("{place} Hurricane Rebuild"),
        DisasterType::Drought => format!("{place} Drought Water Relief"),
        DisasterType::Tsunami => format!("{place} Tsunami Response"),
        DisasterType::Other => format!("{place} Community Relief"),
    }
}

fn make_rng(config: &StoreConfig) -> StdRng {
    match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Generate store contents according to `config`.
pub fn populate(config: &StoreConfig) -> StoreData {
    let mut rng = make_rng(config);
    let now = Utc::now();

    let mut campaigns = Vec::with_capacity(config.seed_campaigns);
    let mut donations = Vec::new();
    let mut proofs = Vec::new();

    for i in 0..config.seed_campaigns {
        let id = i as u64 + 1;
        let kind = DisasterType::ALL[rng.gen_range(0..DisasterType::ALL.len() - 1)];
        let location = LOCATIONS.choose(&mut rng).copied().unwrap_or("Unknown");
        let goal = f64::from(rng.gen_range(10u32..=200)) * 500.0;
        let created_at = now - Duration::days(rng.gen_range(1..=90));

        let donation_count = if config.max_seed_donations == 0 {
            0
        } else {
            rng.gen_range(0..=config.max_seed_donations)
        };
        let mut raised = 0.0;
        for _ in 0..donation_count {
            let amount = f64::from(rng.gen_range(1u32..=100)) * 10.0;
            raised += amount;
            donations.push(Donation {
                id: donations.len() as u64 + 1,
                campaign_id: id,
                donor: DONOR_NAMES.choose(&mut rng).copied().unwrap_or("Anonymous").to_string(),
                amount,
                message: if rng.gen_bool(0.4) {
                    DONOR_MESSAGES.choose(&mut rng).map(|m| m.to_string())
                } else {
                    None
                },
                tx_id: ids::random_tx_id(&mut rng),
                created_at: created_at + Duration::hours(rng.gen_range(1..=48)),
            });
        }

        if rng.gen_bool(0.3) {
            let (name, mime) = PROOF_FILES.choose(&mut rng).copied().unwrap_or(PROOF_FILES[0]);
            proofs.push(Proof {
                id: proofs.len() as u64 + 1,
                campaign_id: id,
                file_name: format!("seed-{id}-{name}"),
                original_name: name.to_string(),
                mime_type: mime.to_string(),
                size: rng.gen_range(20_000..2_000_000),
                description: Some("Field report from partner organisation".into()),
                status: if rng.gen_bool(0.5) { ProofStatus::Verified } else { ProofStatus::Pending },
                uploaded_at: created_at + Duration::days(1),
            });
        }

        let status = if raised >= goal {
            CampaignStatus::Completed
        } else if rng.gen_bool(0.1) {
            CampaignStatus::Paused
        } else {
            CampaignStatus::Active
        };

        campaigns.push(Campaign {
            id,
            title: title_for(kind, location),
            description: format!(
                "Emergency {kind} response in {location}: water, food, shelter, and medical care."
            ),
            goal,
            raised,
            location: location.to_string(),
            disaster_type: kind,
            status,
            creator: "Relief Coordination Team".to_string(),
            beneficiary_address: Some(ids::random_address(&mut rng)),
            image_url: Some(format!("/images/campaigns/{}.jpg", kind.as_str())),
            created_at,
            end_date: Some(created_at + Duration::days(120)),
        });
    }

    let users = seed_users(&mut rng, config.seed_users, now);
    StoreData::new(campaigns, donations, proofs, users)
}

fn seed_users(rng: &mut StdRng, count: usize, now: chrono::DateTime<Utc>) -> Vec<User> {
    let mut users = vec![User {
        id: 1,
        name: "Relief Admin".into(),
        email: DEMO_ADMIN_EMAIL.into(),
        password: DEMO_ADMIN_PASSWORD.into(),
        role: "admin".into(),
        wallet_address: Some(ids::random_address(&mut *rng)),
        created_at: now - Duration::days(365),
    }];

    for i in 1..count {
        let name = DONOR_NAMES[i % DONOR_NAMES.len()];
        let handle = name.to_lowercase().replace(' ', ".");
        users.push(User {
            id: i as u64 + 1,
            name: name.to_string(),
            email: format!("{handle}{i}@example.org"),
            password: "password".into(),
            role: "donor".into(),
            wallet_address: rng.gen_bool(0.5).then(|| ids::random_address(&mut *rng)),
            created_at: now - Duration::days(rng.gen_range(1..=300)),
        });
    }
    users
}
