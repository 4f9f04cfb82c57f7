//! Executor that scores guesses against a secret number

use async_trait::async_trait;
use log::debug;
use rand::Rng;

use super::range::{HIGHER, LOWER};
use crate::refine::{Executor, Outcome};

/// Knows the secret number and answers "higher", "lower" or success.
#[derive(Debug, Clone, Copy)]
pub struct GuessJudge {
    target: u32,
}

impl GuessJudge {
    pub fn new(target: u32) -> Self {
        Self { target }
    }

    /// Judge with a secret drawn uniformly from `min..=max`
    pub fn random(min: u32, max: u32) -> Self {
        Self::new(rand::rng().random_range(min..=max))
    }

    pub fn target(&self) -> u32 {
        self.target
    }
}

#[async_trait]
impl Executor for GuessJudge {
    type Artifact = u32;
    type Output = ();

    async fn execute(&self, guess: &u32) -> Outcome<()> {
        debug!("Judging guess {}", guess);
        match guess.cmp(&self.target) {
            std::cmp::Ordering::Equal => Outcome::Success(()),
            std::cmp::Ordering::Less => Outcome::RecoverableFailure(HIGHER.to_string()),
            std::cmp::Ordering::Greater => Outcome::RecoverableFailure(LOWER.to_string()),
        }
    }

    fn description(&self) -> &str {
        "judge"
    }
}
