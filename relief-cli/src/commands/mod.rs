//! CLI command implementations.

pub mod serve;
pub mod campaigns;
pub mod donate;
pub mod proofs;
pub mod users;
pub mod stats;
pub mod escrow;
pub mod assess;
pub mod chain;
pub mod config;

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use relief_api::ApiClient;
use relief_core::config::ConfigHandle;
use relief_core::error::ReliefResult;

/// Helper to create an API client from config.
pub async fn create_api_client(config: &ConfigHandle) -> ReliefResult<ApiClient> {
    let client_config = config.read().await.client.clone();
    ApiClient::new(&client_config)
}

/// A table with the CLI's standard look.
pub fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Pretty-print any serializable value as JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Format a currency amount with two decimals.
pub fn format_money(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Render a 0..=1 ratio as a ten-cell progress bar followed by the percentage.
pub fn progress_bar(ratio: f64) -> String {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
    let filled = (ratio * 10.0).round() as usize;
    format!(
        "{}{} {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(10 - filled),
        ratio * 100.0
    )
}

/// Truncate a string to a maximum number of characters, appending an
/// ellipsis if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Flood relief", 20), "Flood relief");
        assert_eq!(truncate("Earthquake response fund", 10), "Earthqu...");
        assert_eq!(truncate("abcdef", 2), "ab");
        assert_eq!(truncate("Inondación València", 12), "Inondació...");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0), "----------   0%");
        assert_eq!(progress_bar(0.5), "#####-----  50%");
        assert_eq!(progress_bar(1.7), "########## 100%");
        assert_eq!(progress_bar(f64::NAN), progress_bar(0.0));
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(1234.5), "$1234.50");
        assert_eq!(format_money(0.0), "$0.00");
    }
}
