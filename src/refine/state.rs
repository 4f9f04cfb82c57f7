//! Loop state, round history and the final report.
//!
//! `LoopState` is only mutated by the refinement driver. Collaborators see it
//! through `ProposalRequest` borrows and never write to it.

use serde::{Deserialize, Serialize};

use super::outcome::{Outcome, Termination};

/// One executed round: the artifact that was applied and what came of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord<A, R> {
    /// 1-based round number
    pub round: u32,
    pub artifact: A,
    pub outcome: Outcome<R>,
}

/// Driver phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingProposal,
    AwaitingExecution,
    Terminated(Termination),
}

/// Mutable record threaded through every round of one loop invocation.
#[derive(Debug, Clone)]
pub struct LoopState<A, R> {
    round_index: u32,
    round_limit: u32,
    current_artifact: Option<A>,
    outcome: Outcome<R>,
    phase: Phase,
    history: Vec<RoundRecord<A, R>>,
    failed_proposals: u32,
}

impl<A: Clone, R: Clone> LoopState<A, R> {
    /// Create the state for a fresh run. A zero limit is terminal from the start.
    pub fn new(round_limit: u32) -> Self {
        let phase = if round_limit == 0 {
            Phase::Terminated(Termination::MaxRoundsExceeded)
        } else {
            Phase::AwaitingProposal
        };
        Self {
            round_index: 0,
            round_limit,
            current_artifact: None,
            outcome: Outcome::Pending,
            phase,
            history: Vec::new(),
            failed_proposals: 0,
        }
    }

    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    pub fn round_limit(&self) -> u32 {
        self.round_limit
    }

    pub fn current_artifact(&self) -> Option<&A> {
        self.current_artifact.as_ref()
    }

    pub fn outcome(&self) -> &Outcome<R> {
        &self.outcome
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn history(&self) -> &[RoundRecord<A, R>] {
        &self.history
    }

    pub fn failed_proposals(&self) -> u32 {
        self.failed_proposals
    }

    /// The last executed round, fed back to the proposer
    pub fn previous(&self) -> Option<&RoundRecord<A, R>> {
        self.history.last()
    }

    pub fn previous_artifact(&self) -> Option<&A> {
        self.previous().map(|r| &r.artifact)
    }

    pub fn previous_outcome(&self) -> Option<&Outcome<R>> {
        self.previous().map(|r| &r.outcome)
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.phase, Phase::Terminated(_))
    }

    pub fn termination(&self) -> Option<Termination> {
        match self.phase {
            Phase::Terminated(reason) => Some(reason),
            _ => None,
        }
    }

    /// Rounds still available before the budget runs out
    pub fn rounds_remaining(&self) -> u32 {
        self.round_limit.saturating_sub(self.round_index)
    }

    /// A usable candidate was produced: it becomes the current artifact and
    /// consumes one round.
    pub(crate) fn accept_candidate(&mut self, artifact: A) {
        debug_assert_eq!(self.phase, Phase::AwaitingProposal);
        self.current_artifact = Some(artifact);
        self.round_index += 1;
        self.outcome = Outcome::Pending;
        self.phase = Phase::AwaitingExecution;
    }

    /// Both the proposal and its corrective re-prompt were unusable. No round
    /// is consumed and nothing is appended to the history. Once the external
    /// budget (if any) is spent the loop ends with a fatal error.
    pub(crate) fn record_unusable(&mut self, detail: String, budget: Option<u32>) {
        self.failed_proposals += 1;
        match budget {
            Some(limit) if self.failed_proposals >= limit => {
                self.outcome = Outcome::FatalError(format!(
                    "proposer produced no usable candidate after {} attempts: {}",
                    self.failed_proposals, detail
                ));
            }
            _ => {
                self.outcome = Outcome::RecoverableFailure(detail);
            }
        }
        self.evaluate();
    }

    /// The proposer itself failed in a way that cannot be retried.
    pub(crate) fn abort(&mut self, detail: String) {
        self.outcome = Outcome::FatalError(detail);
        self.evaluate();
    }

    /// Store the executor's verdict for the current artifact and re-evaluate.
    pub(crate) fn record_execution(&mut self, outcome: Outcome<R>) {
        debug_assert_eq!(self.phase, Phase::AwaitingExecution);
        if let Some(artifact) = self.current_artifact.clone() {
            self.history.push(RoundRecord {
                round: self.round_index,
                artifact,
                outcome: outcome.clone(),
            });
        }
        self.outcome = outcome;
        self.evaluate();
    }

    /// terminated iff Success, FatalError, or the round budget is spent.
    fn evaluate(&mut self) {
        self.phase = match &self.outcome {
            Outcome::Success(_) => Phase::Terminated(Termination::Success),
            Outcome::FatalError(_) => Phase::Terminated(Termination::FatalError),
            _ if self.round_index >= self.round_limit => {
                Phase::Terminated(Termination::MaxRoundsExceeded)
            }
            _ => Phase::AwaitingProposal,
        };
    }

    /// Consume the state into the caller-facing report.
    pub fn into_report(self) -> LoopReport<A, R> {
        let termination = self.termination().unwrap_or(Termination::MaxRoundsExceeded);
        LoopReport {
            termination,
            rounds: self.round_index,
            round_limit: self.round_limit,
            final_artifact: self.current_artifact,
            final_outcome: self.outcome,
            failed_proposals: self.failed_proposals,
            history: self.history,
        }
    }
}

/// What the caller gets back once a loop has terminated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopReport<A, R> {
    pub termination: Termination,
    /// Rounds that produced a usable candidate
    pub rounds: u32,
    pub round_limit: u32,
    pub final_artifact: Option<A>,
    pub final_outcome: Outcome<R>,
    /// Proposal attempts that yielded nothing usable, even after re-prompting
    pub failed_proposals: u32,
    pub history: Vec<RoundRecord<A, R>>,
}

impl<A, R> LoopReport<A, R> {
    pub fn is_success(&self) -> bool {
        self.termination == Termination::Success
    }

    /// Success payload of the final round
    pub fn output(&self) -> Option<&R> {
        self.final_outcome.output()
    }

    /// Number of executor invocations
    pub fn executions(&self) -> usize {
        self.history.len()
    }
}
