//! Collaborator interfaces consumed by the refinement loop.

use async_trait::async_trait;

use super::outcome::Outcome;
use super::state::RoundRecord;
use crate::error::Result;

/// What a proposer hands back for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proposal<A> {
    /// A candidate worth executing
    Usable(A),
    /// Nothing actionable was produced; the reason is passed to the re-prompt
    Unusable(String),
}

impl<A> Proposal<A> {
    pub fn is_usable(&self) -> bool {
        matches!(self, Proposal::Usable(_))
    }
}

/// Feedback available to the proposer when it is asked for a candidate.
#[derive(Debug)]
pub struct ProposalRequest<'a, A, R> {
    /// Round the candidate is for (1-based)
    pub round: u32,
    /// Last executed round, `None` while proposing round 1
    pub previous: Option<&'a RoundRecord<A, R>>,
    /// Every executed round so far
    pub history: &'a [RoundRecord<A, R>],
    /// Set on the corrective re-prompt: why the first answer was unusable
    pub correction: Option<&'a str>,
}

impl<'a, A, R> ProposalRequest<'a, A, R> {
    pub fn previous_artifact(&self) -> Option<&'a A> {
        self.previous.map(|r| &r.artifact)
    }

    pub fn previous_outcome(&self) -> Option<&'a Outcome<R>> {
        self.previous.map(|r| &r.outcome)
    }

    pub fn is_first_round(&self) -> bool {
        self.previous.is_none()
    }

    pub fn is_correction(&self) -> bool {
        self.correction.is_some()
    }
}

/// Produces candidate artifacts from prior feedback.
///
/// Returning `Err` ends the loop with a fatal error.
#[async_trait]
pub trait Proposer: Send + Sync {
    /// Candidate payload handed to the executor
    type Artifact: Clone + Send + Sync;
    /// Success payload reported by the paired executor
    type Output: Clone + Send + Sync;
    /// Caller-supplied seed parameters, opaque to the loop
    type Context: Send + Sync;

    async fn propose(
        &self,
        request: ProposalRequest<'_, Self::Artifact, Self::Output>,
        context: &Self::Context,
    ) -> Result<Proposal<Self::Artifact>>;

    fn description(&self) -> &str {
        "proposer"
    }
}

/// Applies an artifact and reports a structured outcome.
///
/// Implementations must not return `Outcome::Pending`.
#[async_trait]
pub trait Executor: Send + Sync {
    type Artifact: Send + Sync;
    type Output: Clone + Send + Sync;

    async fn execute(&self, artifact: &Self::Artifact) -> Outcome<Self::Output>;

    fn description(&self) -> &str {
        "executor"
    }
}
