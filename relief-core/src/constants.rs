//! Application-wide constants.

/// Application name.
pub const APP_NAME: &str = "Relief";

/// Service identifier reported by the health endpoint.
pub const SERVICE_NAME: &str = "relief-server";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// Event bus channel capacity.
pub const EVENT_BUS_CAPACITY: usize = 256;

/// Microalgos per Algo.
pub const MICROALGOS_PER_ALGO: u64 = 1_000_000;

/// Flat fee charged for every simulated transaction, in microalgos.
pub const MIN_TX_FEE: u64 = 1_000;

/// Prefix of the fake bearer tokens handed out by the login endpoint.
pub const TOKEN_PREFIX: &str = "mock-jwt-";

/// Multipart form field carrying a proof file.
pub const PROOF_FIELD: &str = "proof";

/// Humanitarian minimums used by the supply calculator.
pub mod sphere {
    /// Litres of water per person per day.
    pub const WATER_LITRES_PER_DAY: f64 = 15.0;
    /// Kilograms of dry food ration per person per day.
    pub const FOOD_KG_PER_DAY: f64 = 0.6;
    /// Days covered by one hygiene kit per household.
    pub const HYGIENE_KIT_DAYS: f64 = 30.0;
    /// Blankets per person.
    pub const BLANKETS_PER_PERSON: u64 = 2;
    /// People served by one general medical kit.
    pub const PEOPLE_PER_MEDICAL_KIT: f64 = 1_000.0;
    /// Vulnerable people served by one additional medical kit.
    pub const VULNERABLE_PER_MEDICAL_KIT: f64 = 250.0;
    /// People per field responder.
    pub const PEOPLE_PER_RESPONDER: f64 = 50.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_bounds() {
        assert!(DEFAULT_PAGE_SIZE <= MAX_PAGE_SIZE);
    }

    #[test]
    fn test_fee_is_small_fraction_of_algo() {
        assert!(MIN_TX_FEE < MICROALGOS_PER_ALGO);
    }
}
