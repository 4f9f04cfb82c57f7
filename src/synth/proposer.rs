//! LLM-backed proposer that writes Yosys scripts

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::json;

use super::executor::SynthesisOutput;
use super::script::{YosysScript, extract_script};
use super::target::SynthesisTarget;
use crate::error::Result;
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompt::{PromptRenderer, templates};
use crate::refine::{Proposal, ProposalRequest, Proposer};

/// Default cap on how much of a failure log is fed back to the model
pub const DEFAULT_MAX_LOG_CHARS: usize = 8000;

const TRUNCATION_MARKER: &str = "[... earlier output truncated ...]\n";

/// Asks a language model for a Yosys script, feeding back the last failure.
pub struct ScriptProposer<L: LlmClient> {
    client: Arc<L>,
    renderer: PromptRenderer,
    max_log_chars: usize,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl<L: LlmClient> ScriptProposer<L> {
    pub fn new(client: Arc<L>) -> Result<Self> {
        Ok(Self {
            client,
            renderer: PromptRenderer::with_builtin_templates()?,
            max_log_chars: DEFAULT_MAX_LOG_CHARS,
            max_tokens: None,
            temperature: None,
        })
    }

    pub fn with_max_log_chars(mut self, max: usize) -> Self {
        self.max_log_chars = max;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Build the user prompt for this request
    fn prompt(
        &self,
        request: &ProposalRequest<'_, YosysScript, SynthesisOutput>,
        target: &SynthesisTarget,
    ) -> Result<String> {
        let verilog_path = target.verilog_path.display().to_string();
        let sdc_path = target.sdc_path.display().to_string();
        let output_file = target.output_file.display().to_string();

        let base = match request.previous {
            None => self.renderer.render_named(
                templates::SYNTH_INITIAL,
                &json!({
                    "verilog_path": verilog_path,
                    "sdc_path": sdc_path,
                    "output_file": output_file,
                }),
            )?,
            Some(previous) => {
                let log = previous.outcome.detail().unwrap_or("no log was captured");
                self.renderer.render_named(
                    templates::SYNTH_REFINE,
                    &json!({
                        "round": request.round,
                        "previous_script": previous.artifact.as_str(),
                        "failure_log": tail(log, self.max_log_chars),
                        "verilog_path": verilog_path,
                        "sdc_path": sdc_path,
                        "output_file": output_file,
                    }),
                )?
            }
        };

        match request.correction {
            Some(reason) => self.renderer.render_named(
                templates::SYNTH_CORRECTION,
                &json!({ "base": base, "reason": reason }),
            ),
            None => Ok(base),
        }
    }
}

/// Last `max` characters of `text`, marked when anything was dropped
pub fn tail(text: &str, max: usize) -> String {
    let count = text.chars().count();
    if count <= max {
        return text.to_string();
    }
    let kept: String = text.chars().skip(count - max).collect();
    format!("{}{}", TRUNCATION_MARKER, kept)
}

#[async_trait]
impl<L: LlmClient> Proposer for ScriptProposer<L> {
    type Artifact = YosysScript;
    type Output = SynthesisOutput;
    type Context = SynthesisTarget;

    async fn propose(
        &self,
        request: ProposalRequest<'_, YosysScript, SynthesisOutput>,
        target: &SynthesisTarget,
    ) -> Result<Proposal<YosysScript>> {
        let system = self
            .renderer
            .render_named(templates::SYNTH_SYSTEM, &json!({}))?;
        let prompt = self.prompt(&request, target)?;
        debug!("Round {} prompt:\n{}", request.round, prompt);

        let mut completion = CompletionRequest::new(system).with_user_message(prompt);
        if let Some(max_tokens) = self.max_tokens {
            completion = completion.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            completion = completion.with_temperature(temperature);
        }

        let response = self.client.complete(completion).await?;
        if response.stop_reason.is_truncated() {
            warn!("Round {} reply hit the token limit", request.round);
        }
        debug!("Round {} reply:\n{}", request.round, response.content);

        Ok(match extract_script(&response.content) {
            Some(script) => Proposal::Usable(script),
            None => Proposal::Unusable("the reply contained no Yosys commands".to_string()),
        })
    }

    fn description(&self) -> &str {
        self.client.model()
    }
}
