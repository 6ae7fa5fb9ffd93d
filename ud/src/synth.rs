//! Synthetic value generation
//!
//! The field validator asks a [`Synthesizer`] for replacement emails and names
//! instead of reaching for a global random source, so a run can be replayed
//! exactly by seeding the generator.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Domain every valid login email must use
pub const EMAIL_DOMAIN: &str = "example.com";

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David", "Elizabeth", "William",
    "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah", "Charles", "Karen", "Daniel", "Nancy",
    "Matthew", "Lisa", "Anthony", "Betty", "Mark", "Margaret", "Donald", "Sandra", "Steven", "Ashley", "Paul",
    "Kimberly", "Andrew", "Emily", "Joshua", "Donna", "Kenneth", "Michelle", "Kevin", "Carol", "Brian", "Amanda",
    "George", "Melissa", "Timothy", "Deborah", "Ronald", "Stephanie",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez", "Martinez",
    "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor", "Moore", "Jackson", "Martin", "Lee",
    "Perez", "Thompson", "White", "Harris", "Sanchez", "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young",
    "Allen", "King", "Wright", "Scott", "Torres", "Nguyen", "Hill", "Flores", "Green", "Adams", "Nelson", "Baker",
    "Hall", "Rivera", "Campbell", "Mitchell", "Carter", "Roberts",
];

/// Source of replacement values for missing or invalid fields
pub trait Synthesizer {
    /// A login email that satisfies the email rule
    fn email(&mut self) -> String;

    /// A plausible first name, at least two characters long
    fn first_name(&mut self) -> String;

    /// A plausible last name, at least two characters long
    fn last_name(&mut self) -> String;
}

/// Synthesizer backed by a random number generator
pub struct RandomSynthesizer<R: Rng> {
    rng: R,
}

impl RandomSynthesizer<StdRng> {
    /// Reproducible generator for a given seed
    pub fn seeded(seed: u64) -> Self {
        debug!(seed, "RandomSynthesizer::seeded: called");
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from the operating system
    pub fn from_os_rng() -> Self {
        debug!("RandomSynthesizer::from_os_rng: called");
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> RandomSynthesizer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Synthesizer for RandomSynthesizer<R> {
    fn email(&mut self) -> String {
        let prefix: String = (&mut self.rng)
            .sample_iter(&rand::distr::Alphanumeric)
            .take(3)
            .map(char::from)
            .collect();
        let number: u8 = self.rng.random_range(10..=99);
        format!("{prefix}{number}@{EMAIL_DOMAIN}")
    }

    fn first_name(&mut self) -> String {
        FIRST_NAMES.choose(&mut self.rng).unwrap_or(&"Alex").to_string()
    }

    fn last_name(&mut self) -> String {
        LAST_NAMES.choose(&mut self.rng).unwrap_or(&"Morgan").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::is_valid_email;

    #[test]
    fn test_synthetic_emails_are_valid() {
        let mut synth = RandomSynthesizer::seeded(7);
        for _ in 0..200 {
            let email = synth.email();
            assert!(is_valid_email(&email), "generated invalid email: {email}");
        }
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut a = RandomSynthesizer::seeded(42);
        let mut b = RandomSynthesizer::seeded(42);
        for _ in 0..10 {
            assert_eq!(a.email(), b.email());
            assert_eq!(a.first_name(), b.first_name());
            assert_eq!(a.last_name(), b.last_name());
        }
    }

    #[test]
    fn test_names_are_long_enough() {
        let mut synth = RandomSynthesizer::seeded(3);
        for _ in 0..100 {
            assert!(synth.first_name().chars().count() >= 2);
            assert!(synth.last_name().chars().count() >= 2);
        }
    }
}
