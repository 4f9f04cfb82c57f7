//! Prompt Renderer - Render templates with context variables using Handlebars
//!
//! This module provides the PromptRenderer struct which uses Handlebars to
//! render prompt templates with context variables.

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::{Result, SynthloopError};
use crate::prompt::templates;

/// Renders prompt templates using Handlebars templating
pub struct PromptRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptRenderer {
    /// Create a new PromptRenderer with no registered templates
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        // Prompts are plain text, never HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        Self { handlebars }
    }

    /// Create a renderer with every built-in prompt registered by name
    pub fn with_builtin_templates() -> Result<Self> {
        let mut renderer = Self::new();
        for (name, template) in templates::BUILTIN {
            renderer.register_template(name, template)?;
        }
        Ok(renderer)
    }

    /// Register a named template for later use
    pub fn register_template(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| {
                SynthloopError::Template(format!("Failed to register template '{}': {}", name, e))
            })
    }

    /// Render a previously registered template
    pub fn render_named<T: Serialize>(&self, name: &str, context: &T) -> Result<String> {
        self.handlebars
            .render(name, context)
            .map_err(|e| SynthloopError::Template(format!("Failed to render '{}': {}", name, e)))
    }

    /// Check if a named template is registered
    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.get_template(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn render<T: Serialize>(template: &str, context: &T) -> Result<String> {
        let mut renderer = PromptRenderer::new();
        renderer.register_template("inline", template)?;
        renderer.render_named("inline", context)
    }

    #[test]
    fn test_new_renderer_is_empty() {
        let renderer = PromptRenderer::new();
        assert!(!renderer.has_template(templates::SYNTH_SYSTEM));
    }

    #[test]
    fn test_builtin_templates_registered() {
        let renderer = PromptRenderer::with_builtin_templates().unwrap();
        for (name, _) in templates::BUILTIN {
            assert!(renderer.has_template(name), "missing {}", name);
        }
    }

    #[test]
    fn test_builtin_templates_render_every_variable() {
        // Each value must reach the output; a variable named like a
        // Handlebars helper (`log`, `lookup`, ...) would render as nothing.
        let cases: Vec<(&str, serde_json::Value, Vec<&str>)> = vec![
            (templates::SYNTH_SYSTEM, json!({}), vec!["Yosys"]),
            (
                templates::SYNTH_INITIAL,
                json!({ "verilog_path": "V-PATH", "sdc_path": "S-PATH", "output_file": "O-FILE" }),
                vec!["V-PATH", "S-PATH", "O-FILE"],
            ),
            (
                templates::SYNTH_REFINE,
                json!({
                    "round": 7,
                    "previous_script": "PREV-SCRIPT",
                    "failure_log": "FAIL-LOG",
                    "verilog_path": "V-PATH",
                    "sdc_path": "S-PATH",
                    "output_file": "O-FILE",
                }),
                vec!["Round 7", "PREV-SCRIPT", "FAIL-LOG", "V-PATH", "S-PATH", "O-FILE"],
            ),
            (
                templates::SYNTH_CORRECTION,
                json!({ "base": "BASE-PROMPT", "reason": "WHY" }),
                vec!["BASE-PROMPT", "WHY"],
            ),
            (
                templates::GUESS_SYSTEM,
                json!({ "min": 11, "max": 99 }),
                vec!["11", "99"],
            ),
            (
                templates::GUESS_TURN,
                json!({ "previous": "42", "direction": "low", "low": 43, "high": 98 }),
                vec!["42", "too low", "43", "98"],
            ),
            (
                templates::GUESS_TURN,
                json!({ "previous": "", "direction": "", "low": 1, "high": 100 }),
                vec!["first guess", "1", "100"],
            ),
            (
                templates::GUESS_CORRECTION,
                json!({ "base": "BASE-PROMPT", "reason": "WHY", "low": 5, "high": 9 }),
                vec!["BASE-PROMPT", "WHY", "between 5 and 9"],
            ),
        ];

        let renderer = PromptRenderer::with_builtin_templates().unwrap();
        for (name, context, expected) in cases {
            let rendered = renderer.render_named(name, &context).unwrap();
            for needle in expected {
                assert!(rendered.contains(needle), "{} is missing {:?}: {}", name, needle, rendered);
            }
        }
    }

    #[test]
    fn test_render_map() {
        let mut context = HashMap::new();
        context.insert("name", "counter");

        let result = render("Top: {{name}}", &context).unwrap();
        assert_eq!(result, "Top: counter");
    }

    #[test]
    fn test_render_missing_variable_empty_string() {
        let context: HashMap<String, String> = HashMap::new();
        let result = render("Hello, {{name}}!", &context).unwrap();
        assert_eq!(result, "Hello, !");
    }

    #[test]
    fn test_render_no_escape() {
        let context = json!({ "detail": "ERROR: <counter> & 'clk'" });
        let result = render("{{detail}}", &context).unwrap();
        assert_eq!(result, "ERROR: <counter> & 'clk'");
    }

    #[test]
    fn test_render_serializable() {
        #[derive(Serialize)]
        struct Context {
            file: String,
            round: u32,
        }

        let context = Context {
            file: "counter.v".to_string(),
            round: 2,
        };
        let result = render("{{file}} round {{round}}", &context).unwrap();
        assert_eq!(result, "counter.v round 2");
    }

    #[test]
    fn test_register_and_render_named() {
        let mut renderer = PromptRenderer::new();
        renderer.register_template("greeting", "Hello, {{name}}!").unwrap();
        assert!(renderer.has_template("greeting"));

        let result = renderer
            .render_named("greeting", &json!({ "name": "yosys" }))
            .unwrap();
        assert_eq!(result, "Hello, yosys!");
    }

    #[test]
    fn test_render_named_not_found() {
        let renderer = PromptRenderer::new();
        let result = renderer.render_named("nonexistent", &json!({}));
        assert!(matches!(result, Err(SynthloopError::Template(_))));
    }

    #[test]
    fn test_register_invalid_template() {
        let mut renderer = PromptRenderer::new();
        let result = renderer.register_template("broken", "{{#if x}}never closed");
        assert!(matches!(result, Err(SynthloopError::Template(_))));
    }

    #[test]
    fn test_render_preserves_whitespace() {
        let result = render("Line 1\n\nLine 3", &json!({})).unwrap();
        assert_eq!(result, "Line 1\n\nLine 3");
    }
}
