//! Identifier formats shared by the store seeder and the chain simulator.
//!
//! Addresses and transaction ids look like Algorand's (upper-case base32),
//! but are random strings with no key material behind them.

use rand::Rng;

/// RFC 4648 base32 alphabet.
const BASE32: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Length of an account or escrow address.
pub const ADDRESS_LEN: usize = 58;

/// Length of a transaction id.
pub const TX_ID_LEN: usize = 52;

fn random_base32<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| BASE32[rng.gen_range(0..BASE32.len())] as char)
        .collect()
}

/// Random 58-character address.
pub fn random_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    random_base32(rng, ADDRESS_LEN)
}

/// Random 52-character transaction id.
pub fn random_tx_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    random_base32(rng, TX_ID_LEN)
}

/// Whether `s` has the shape of an address.
pub fn is_valid_address(s: &str) -> bool {
    s.len() == ADDRESS_LEN && s.bytes().all(|b| BASE32.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_shape() {
        let mut rng = rand::thread_rng();
        let addr = random_address(&mut rng);
        assert_eq!(addr.len(), ADDRESS_LEN);
        assert!(is_valid_address(&addr));
        assert_ne!(addr, random_address(&mut rng));
    }

    #[test]
    fn test_tx_id_shape() {
        let tx = random_tx_id(&mut rand::thread_rng());
        assert_eq!(tx.len(), TX_ID_LEN);
        assert!(!is_valid_address(&tx));
    }

    #[test]
    fn test_rejects_lowercase_and_bad_digits() {
        let lower = "a".repeat(ADDRESS_LEN);
        assert!(!is_valid_address(&lower));
        let digits = "1".repeat(ADDRESS_LEN);
        assert!(!is_valid_address(&digits));
    }
}
