//! Prompt System - Template rendering
//!
//! Built-in prompt templates for the LLM-backed proposers, rendered with
//! Handlebars.

mod render;
pub mod templates;

pub use render::PromptRenderer;
