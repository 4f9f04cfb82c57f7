//! Bounds of the guessing game and the range still open after feedback

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthloopError};
use crate::refine::{Outcome, RoundRecord};

/// Feedback when the secret number is above the guess
pub const HIGHER: &str = "higher";
/// Feedback when the secret number is below the guess
pub const LOWER: &str = "lower";

/// Inclusive range the secret number is drawn from. Loop context for guessers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessBounds {
    pub min: u32,
    pub max: u32,
}

impl Default for GuessBounds {
    fn default() -> Self {
        Self { min: 1, max: 100 }
    }
}

impl GuessBounds {
    pub fn new(min: u32, max: u32) -> Result<Self> {
        if min > max {
            return Err(SynthloopError::InvalidState(format!(
                "Invalid guessing range: {} is greater than {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, n: u32) -> bool {
        (self.min..=self.max).contains(&n)
    }
}

/// Numbers still consistent with every piece of feedback so far.
///
/// Empty when `low > high`, which only happens if the feedback contradicts itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessRange {
    pub low: u32,
    pub high: u32,
}

impl GuessRange {
    /// Replay the judge's feedback over the starting bounds
    pub fn narrow(bounds: &GuessBounds, history: &[RoundRecord<u32, ()>]) -> Self {
        let mut range = Self {
            low: bounds.min,
            high: bounds.max,
        };
        for record in history {
            if let Outcome::RecoverableFailure(feedback) = &record.outcome {
                range.apply(record.artifact, feedback);
            }
        }
        range
    }

    fn apply(&mut self, guess: u32, feedback: &str) {
        let narrowed = match feedback {
            HIGHER => guess.checked_add(1).map(|low| (self.low.max(low), self.high)),
            LOWER => guess.checked_sub(1).map(|high| (self.low, self.high.min(high))),
            _ => return,
        };
        match narrowed {
            Some((low, high)) => {
                self.low = low;
                self.high = high;
            }
            None => self.clear(),
        }
    }

    fn clear(&mut self) {
        self.low = 1;
        self.high = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.low > self.high
    }

    pub fn contains(&self, n: u32) -> bool {
        (self.low..=self.high).contains(&n)
    }

    pub fn midpoint(&self) -> Option<u32> {
        if self.is_empty() {
            None
        } else {
            Some(self.low + (self.high - self.low) / 2)
        }
    }

    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            u64::from(self.high - self.low) + 1
        }
    }
}
