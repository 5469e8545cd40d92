//! Recovery phrases for simulated accounts.
//!
//! The phrase is decorative: 25 words drawn from a fixed list, with no
//! relation to the address.

use rand::seq::SliceRandom;
use rand::Rng;

pub const WORD_COUNT: usize = 25;

const WORDS: &[&str] = &[
    "abandon", "ability", "absorb", "access", "across", "action", "adapt", "advice",
    "aerobic", "agent", "alarm", "alpine", "anchor", "annual", "arena", "arrow",
    "aspect", "atlas", "autumn", "avocado", "bamboo", "basket", "beacon", "blanket",
    "bridge", "bundle", "cabin", "canal", "canvas", "carbon", "cedar", "charter",
    "circle", "coast", "comfort", "copper", "cradle", "crystal", "delta", "desert",
    "dolphin", "dune", "eagle", "echo", "ember", "engine", "fabric", "falcon",
    "ferry", "fiber", "galaxy", "garden", "glacier", "harbor", "harvest", "horizon",
    "island", "ivory", "jungle", "kettle", "lantern", "meadow", "orbit", "shelter",
];

/// Random 25-word phrase separated by single spaces.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..WORD_COUNT)
        .filter_map(|_| WORDS.choose(rng).copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether `phrase` has the expected shape.
pub fn is_well_formed(phrase: &str) -> bool {
    let words: Vec<&str> = phrase.split(' ').collect();
    words.len() == WORD_COUNT && words.iter().all(|w| WORDS.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_shape() {
        let mut rng = StdRng::seed_from_u64(3);
        let phrase = generate(&mut rng);
        assert_eq!(phrase.split(' ').count(), WORD_COUNT);
        assert!(is_well_formed(&phrase));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(!is_well_formed("abandon ability"));
        assert!(!is_well_formed(&["zzz"; WORD_COUNT].join(" ")));
    }
}
