//! Guessing strategies: deterministic bisection and a language model

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use serde_json::json;

use super::range::{GuessBounds, GuessRange, HIGHER};
use crate::error::Result;
use crate::llm::{CompletionRequest, LlmClient, Message};
use crate::prompt::{PromptRenderer, templates};
use crate::refine::{Outcome, Proposal, ProposalRequest, Proposer};

/// Always guesses the middle of the open range.
#[derive(Debug, Clone, Copy, Default)]
pub struct BisectProposer;

#[async_trait]
impl Proposer for BisectProposer {
    type Artifact = u32;
    type Output = ();
    type Context = GuessBounds;

    async fn propose(
        &self,
        request: ProposalRequest<'_, u32, ()>,
        bounds: &GuessBounds,
    ) -> Result<Proposal<u32>> {
        let range = GuessRange::narrow(bounds, request.history);
        debug!(
            "Round {}: {} candidate(s) left in {}..={}",
            request.round,
            range.len(),
            range.low,
            range.high
        );
        Ok(match range.midpoint() {
            Some(guess) => Proposal::Usable(guess),
            None => Proposal::Unusable("no numbers left in range".to_string()),
        })
    }

    fn description(&self) -> &str {
        "bisect"
    }
}

/// First unsigned integer appearing in `text`
pub fn first_number(text: &str) -> Option<u32> {
    text.split(|c: char| !c.is_ascii_digit())
        .find(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

/// Lets a language model play the guessing game.
///
/// The conversation is rebuilt from the loop history on every call, so the
/// proposer itself holds no game state.
pub struct LlmGuessProposer<L: LlmClient> {
    client: Arc<L>,
    renderer: PromptRenderer,
    temperature: Option<f32>,
}

impl<L: LlmClient> LlmGuessProposer<L> {
    pub fn new(client: Arc<L>) -> Result<Self> {
        Ok(Self {
            client,
            renderer: PromptRenderer::with_builtin_templates()?,
            temperature: None,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn turn(&self, previous: Option<(u32, &Outcome<()>)>, range: &GuessRange) -> Result<String> {
        let (previous, direction) = match previous {
            Some((guess, Outcome::RecoverableFailure(feedback))) => {
                let direction = if feedback == HIGHER { "low" } else { "high" };
                (guess.to_string(), direction)
            }
            _ => (String::new(), ""),
        };
        self.renderer.render_named(
            templates::GUESS_TURN,
            &json!({
                "previous": previous,
                "direction": direction,
                "low": range.low,
                "high": range.high,
            }),
        )
    }

    /// System prompt plus one user/assistant exchange per executed round
    fn conversation(
        &self,
        request: &ProposalRequest<'_, u32, ()>,
        bounds: &GuessBounds,
    ) -> Result<CompletionRequest> {
        let system = self.renderer.render_named(
            templates::GUESS_SYSTEM,
            &json!({ "min": bounds.min, "max": bounds.max }),
        )?;
        let mut completion = CompletionRequest::new(system);

        for (i, record) in request.history.iter().enumerate() {
            let range = GuessRange::narrow(bounds, &request.history[..i]);
            let previous = i
                .checked_sub(1)
                .map(|p| &request.history[p])
                .map(|r| (r.artifact, &r.outcome));
            completion = completion
                .with_user_message(self.turn(previous, &range)?)
                .with_message(Message::assistant(record.artifact.to_string()));
        }

        let range = GuessRange::narrow(bounds, request.history);
        let previous = request.previous.map(|r| (r.artifact, &r.outcome));
        let mut prompt = self.turn(previous, &range)?;
        if let Some(reason) = request.correction {
            prompt = self.renderer.render_named(
                templates::GUESS_CORRECTION,
                &json!({
                    "base": prompt,
                    "reason": reason,
                    "low": range.low,
                    "high": range.high,
                }),
            )?;
        }

        completion = completion.with_user_message(prompt);
        if let Some(temperature) = self.temperature {
            completion = completion.with_temperature(temperature);
        }
        Ok(completion)
    }
}

#[async_trait]
impl<L: LlmClient> Proposer for LlmGuessProposer<L> {
    type Artifact = u32;
    type Output = ();
    type Context = GuessBounds;

    async fn propose(
        &self,
        request: ProposalRequest<'_, u32, ()>,
        bounds: &GuessBounds,
    ) -> Result<Proposal<u32>> {
        let completion = self.conversation(&request, bounds)?;
        let response = self.client.complete(completion).await?;
        debug!("Round {} reply: {}", request.round, response.content.trim());

        let range = GuessRange::narrow(bounds, request.history);
        Ok(match first_number(&response.content) {
            None => Proposal::Unusable("the reply did not contain a number".to_string()),
            Some(guess) if !range.contains(guess) => Proposal::Unusable(format!(
                "{} is outside the valid range of {} to {}",
                guess, range.low, range.high
            )),
            Some(guess) => Proposal::Usable(guess),
        })
    }

    fn description(&self) -> &str {
        self.client.model()
    }
}
