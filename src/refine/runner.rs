//! Refinement loop driver.
//!
//! Each round asks the proposer for a candidate, hands it to the executor and
//! judges the outcome, until success, a fatal error, or the round budget is
//! spent. Rounds are strictly sequential.

use std::sync::Arc;

use log::{debug, error, info, warn};

use super::outcome::Outcome;
use super::state::{LoopReport, LoopState};
use super::traits::{Executor, Proposal, ProposalRequest, Proposer};

/// Configuration for the RefinementLoop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinementConfig {
    /// External budget on proposal attempts that stay unusable after the
    /// corrective re-prompt. `None` means unbounded.
    pub max_failed_proposals: Option<u32>,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            max_failed_proposals: Some(3),
        }
    }
}

/// Result of asking the proposer for one round's candidate.
enum Candidate<A> {
    Usable(A),
    Unusable(String),
    Fatal(String),
}

/// Drives propose -> execute -> judge rounds.
pub struct RefinementLoop<P, E>
where
    P: Proposer,
    E: Executor<Artifact = P::Artifact, Output = P::Output>,
{
    proposer: Arc<P>,
    executor: Arc<E>,
    config: RefinementConfig,
}

impl<P, E> RefinementLoop<P, E>
where
    P: Proposer,
    E: Executor<Artifact = P::Artifact, Output = P::Output>,
{
    /// Create a new RefinementLoop with the given collaborators.
    pub fn new(proposer: Arc<P>, executor: Arc<E>) -> Self {
        Self::with_config(proposer, executor, RefinementConfig::default())
    }

    /// Create a new RefinementLoop with custom configuration.
    pub fn with_config(proposer: Arc<P>, executor: Arc<E>, config: RefinementConfig) -> Self {
        Self {
            proposer,
            executor,
            config,
        }
    }

    pub fn config(&self) -> &RefinementConfig {
        &self.config
    }

    /// Run rounds until termination and return the report.
    ///
    /// Expected failures never surface as `Err`; they are part of the report.
    pub async fn run(
        &self,
        round_limit: u32,
        context: &P::Context,
    ) -> LoopReport<P::Artifact, P::Output> {
        let mut state: LoopState<P::Artifact, P::Output> = LoopState::new(round_limit);
        info!(
            "Starting refinement loop: proposer={}, executor={}, round_limit={}",
            self.proposer.description(),
            self.executor.description(),
            round_limit
        );

        while !state.is_terminated() {
            let artifact = match self.request_candidate(&state, context).await {
                Candidate::Usable(artifact) => artifact,
                Candidate::Unusable(detail) => {
                    warn!(
                        "No usable candidate for round {} after re-prompt: {}",
                        state.round_index() + 1,
                        detail
                    );
                    state.record_unusable(detail, self.config.max_failed_proposals);
                    continue;
                }
                Candidate::Fatal(detail) => {
                    error!("Proposer failed: {}", detail);
                    state.abort(detail);
                    break;
                }
            };

            state.accept_candidate(artifact.clone());
            let round = state.round_index();
            debug!(
                "Round {}/{}: executing candidate ({} round(s) left after this one)",
                round,
                round_limit,
                state.rounds_remaining()
            );

            let outcome = match self.executor.execute(&artifact).await {
                Outcome::Pending => {
                    error!("Executor {} returned no outcome", self.executor.description());
                    Outcome::FatalError("executor returned no outcome".to_string())
                }
                outcome => outcome,
            };

            match &outcome {
                Outcome::RecoverableFailure(detail) => {
                    warn!("Round {} failed: {}", round, first_line(detail))
                }
                other => info!("Round {} finished: {}", round, other.label()),
            }
            state.record_execution(outcome);
        }

        let report = state.into_report();
        info!(
            "Refinement loop terminated: {} after {} round(s)",
            report.termination, report.rounds
        );
        report
    }

    /// Ask for a candidate, with one corrective re-prompt on an unusable answer.
    async fn request_candidate(
        &self,
        state: &LoopState<P::Artifact, P::Output>,
        context: &P::Context,
    ) -> Candidate<P::Artifact> {
        let round = state.round_index() + 1;

        let first = ProposalRequest {
            round,
            previous: state.previous(),
            history: state.history(),
            correction: None,
        };
        let reason = match self.proposer.propose(first, context).await {
            Ok(Proposal::Usable(artifact)) => return Candidate::Usable(artifact),
            Ok(Proposal::Unusable(reason)) => reason,
            Err(e) => return Candidate::Fatal(e.to_string()),
        };

        debug!("Round {}: unusable proposal ({}), re-prompting", round, reason);
        let retry = ProposalRequest {
            round,
            previous: state.previous(),
            history: state.history(),
            correction: Some(reason.as_str()),
        };
        match self.proposer.propose(retry, context).await {
            Ok(Proposal::Usable(artifact)) => Candidate::Usable(artifact),
            Ok(Proposal::Unusable(reason)) => Candidate::Unusable(reason),
            Err(e) => Candidate::Fatal(e.to_string()),
        }
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SynthloopError};
    use crate::refine::Termination;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Proposer that replays a script of answers, then repeats the last one.
    struct ScriptedProposer {
        answers: Mutex<VecDeque<Result<Proposal<String>>>>,
        corrections: Mutex<Vec<String>>,
        calls: Mutex<u32>,
    }

    impl ScriptedProposer {
        fn new(answers: Vec<Result<Proposal<String>>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                corrections: Mutex::new(Vec::new()),
                calls: Mutex::new(0),
            }
        }

        fn always(artifact: &str) -> Self {
            Self::new(vec![Ok(Proposal::Usable(artifact.to_string()))])
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Proposer for ScriptedProposer {
        type Artifact = String;
        type Output = String;
        type Context = ();

        async fn propose(
            &self,
            request: ProposalRequest<'_, String, String>,
            _context: &(),
        ) -> Result<Proposal<String>> {
            *self.calls.lock().unwrap() += 1;
            if let Some(reason) = request.correction {
                self.corrections.lock().unwrap().push(reason.to_string());
            }
            let mut answers = self.answers.lock().unwrap();
            if answers.len() > 1 {
                return answers.pop_front().unwrap();
            }
            match answers.front() {
                Some(Ok(p)) => Ok(p.clone()),
                Some(Err(e)) => Err(SynthloopError::Llm(e.to_string())),
                None => Ok(Proposal::Unusable("empty script".into())),
            }
        }
    }

    /// Executor that replays outcomes, then repeats the last one.
    struct ScriptedExecutor {
        outcomes: Mutex<VecDeque<Outcome<String>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedExecutor {
        fn new(outcomes: Vec<Outcome<String>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Executor for ScriptedExecutor {
        type Artifact = String;
        type Output = String;

        async fn execute(&self, _artifact: &String) -> Outcome<String> {
            *self.calls.lock().unwrap() += 1;
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.len() > 1 {
                outcomes.pop_front().unwrap()
            } else {
                outcomes.front().cloned().unwrap_or(Outcome::Pending)
            }
        }
    }

    fn recoverable(detail: &str) -> Outcome<String> {
        Outcome::RecoverableFailure(detail.to_string())
    }

    #[test]
    fn test_refinement_config_default() {
        let config = RefinementConfig::default();
        assert_eq!(config.max_failed_proposals, Some(3));
    }

    #[tokio::test]
    async fn test_success_first_round() {
        let proposer = Arc::new(ScriptedProposer::always("A"));
        let executor = Arc::new(ScriptedExecutor::new(vec![Outcome::Success("out.v".into())]));
        let runner = RefinementLoop::new(proposer.clone(), executor.clone());

        let report = runner.run(3, &()).await;

        assert_eq!(report.termination, Termination::Success);
        assert_eq!(report.rounds, 1);
        assert_eq!(report.output(), Some(&"out.v".to_string()));
        assert_eq!(proposer.calls(), 1);
        assert_eq!(executor.calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_limit_never_proposes() {
        let proposer = Arc::new(ScriptedProposer::always("A"));
        let executor = Arc::new(ScriptedExecutor::new(vec![Outcome::Success(String::new())]));
        let runner = RefinementLoop::new(proposer.clone(), executor.clone());

        let report = runner.run(0, &()).await;

        assert_eq!(report.termination, Termination::MaxRoundsExceeded);
        assert_eq!(report.rounds, 0);
        assert_eq!(proposer.calls(), 0);
        assert_eq!(executor.calls(), 0);
    }

    #[tokio::test]
    async fn test_unusable_then_corrected() {
        let proposer = Arc::new(ScriptedProposer::new(vec![
            Ok(Proposal::Unusable("no commands".into())),
            Ok(Proposal::Usable("A".into())),
        ]));
        let executor = Arc::new(ScriptedExecutor::new(vec![Outcome::Success(String::new())]));
        let runner = RefinementLoop::new(proposer.clone(), executor.clone());

        let report = runner.run(2, &()).await;

        assert!(report.is_success());
        assert_eq!(report.rounds, 1);
        assert_eq!(report.failed_proposals, 0);
        assert_eq!(proposer.calls(), 2);
        assert_eq!(*proposer.corrections.lock().unwrap(), vec!["no commands".to_string()]);
    }

    #[tokio::test]
    async fn test_double_unusable_records_recoverable_without_round() {
        let proposer = Arc::new(ScriptedProposer::new(vec![
            Ok(Proposal::Unusable("no commands".into())),
            Ok(Proposal::Unusable("still none".into())),
            Ok(Proposal::Usable("A".into())),
        ]));
        let executor = Arc::new(ScriptedExecutor::new(vec![Outcome::Success(String::new())]));
        let runner = RefinementLoop::new(proposer.clone(), executor.clone());

        let report = runner.run(1, &()).await;

        assert!(report.is_success());
        assert_eq!(report.rounds, 1);
        assert_eq!(report.failed_proposals, 1);
        assert_eq!(report.history.len(), 1);
        assert_eq!(proposer.calls(), 3);
    }

    #[tokio::test]
    async fn test_failed_proposal_budget_is_fatal() {
        let proposer = Arc::new(ScriptedProposer::new(vec![Ok(Proposal::Unusable(
            "gibberish".into(),
        ))]));
        let executor = Arc::new(ScriptedExecutor::new(vec![Outcome::Success(String::new())]));
        let config = RefinementConfig {
            max_failed_proposals: Some(2),
        };
        let runner = RefinementLoop::with_config(proposer.clone(), executor.clone(), config);

        let report = runner.run(5, &()).await;

        assert_eq!(report.termination, Termination::FatalError);
        assert_eq!(report.rounds, 0);
        assert_eq!(report.failed_proposals, 2);
        assert!(report.history.is_empty());
        // two attempts per failed proposal
        assert_eq!(proposer.calls(), 4);
        assert_eq!(executor.calls(), 0);
    }

    #[tokio::test]
    async fn test_proposer_error_is_fatal() {
        let proposer = Arc::new(ScriptedProposer::new(vec![Err(SynthloopError::Llm(
            "ANTHROPIC_API_KEY not set".into(),
        ))]));
        let executor = Arc::new(ScriptedExecutor::new(vec![Outcome::Success(String::new())]));
        let runner = RefinementLoop::new(proposer, executor.clone());

        let report = runner.run(3, &()).await;

        assert_eq!(report.termination, Termination::FatalError);
        assert!(report.final_outcome.detail().unwrap().contains("ANTHROPIC_API_KEY"));
        assert_eq!(executor.calls(), 0);
    }

    #[tokio::test]
    async fn test_pending_from_executor_is_fatal() {
        let proposer = Arc::new(ScriptedProposer::always("A"));
        let executor = Arc::new(ScriptedExecutor::new(vec![Outcome::Pending]));
        let runner = RefinementLoop::new(proposer, executor);

        let report = runner.run(3, &()).await;

        assert_eq!(report.termination, Termination::FatalError);
        assert_eq!(report.rounds, 1);
        assert_eq!(report.history.len(), 1);
    }

    #[tokio::test]
    async fn test_feedback_reaches_proposer() {
        struct FeedbackProposer {
            seen: Mutex<Vec<Option<String>>>,
        }

        #[async_trait]
        impl Proposer for FeedbackProposer {
            type Artifact = String;
            type Output = String;
            type Context = ();

            async fn propose(
                &self,
                request: ProposalRequest<'_, String, String>,
                _context: &(),
            ) -> Result<Proposal<String>> {
                let detail = request
                    .previous_outcome()
                    .and_then(|o| o.detail())
                    .map(str::to_string);
                self.seen.lock().unwrap().push(detail);
                Ok(Proposal::Usable(format!("script-{}", request.round)))
            }
        }

        let proposer = Arc::new(FeedbackProposer {
            seen: Mutex::new(Vec::new()),
        });
        let executor = Arc::new(ScriptedExecutor::new(vec![
            recoverable("line 3: syntax error"),
            Outcome::Success(String::new()),
        ]));
        let runner = RefinementLoop::new(proposer.clone(), executor);

        let report = runner.run(4, &()).await;

        assert!(report.is_success());
        assert_eq!(
            *proposer.seen.lock().unwrap(),
            vec![None, Some("line 3: syntax error".to_string())]
        );
        assert_eq!(report.history[1].artifact, "script-2");
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("a\nb"), "a");
        assert_eq!(first_line(""), "");
    }
}
