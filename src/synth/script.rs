//! Yosys script artifact and extraction from free-form model replies.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Commands recognised by their full name
const COMMANDS: &[&str] = &[
    "read", "hierarchy", "proc", "flatten", "techmap", "abc", "abc9", "dfflibmap", "dffunmap",
    "dfflegalize", "clean", "stat", "check", "show", "tee", "select", "setattr", "setparam",
    "chparam", "rename", "splitnets", "insbuf", "hilomap", "iopadmap", "autoname", "memory",
    "fsm", "alumacc", "share", "wreduce", "peepopt", "tribuf", "deminout", "script", "design",
    "connect", "ltp", "sta", "scc", "echo", "log", "plugin", "synth", "opt",
];

/// Command families: `<family>_<variant>`, e.g. `synth_ice40`, `opt_clean`
const COMMAND_FAMILIES: &[&str] = &[
    "read", "write", "synth", "opt", "memory", "fsm", "dff", "abc", "extract", "flatten", "proc",
    "techmap",
];

/// Words and phrases that mark a line as explanation rather than script
const EXPLANATORY: &[&[&str]] = &[
    &["here's"],
    &["to", "generate"],
    &["you", "can"],
    &["step"],
    &["note"],
    &["key", "points"],
    &["make", "sure"],
    &["adjust"],
    &["if", "you"],
    &["for", "example"],
];

/// Lines that open a script section in prose replies
const SECTION_MARKERS: &[&str] = &["yosys synthesis script", "here's the", "here is the"];

/// A candidate Yosys script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YosysScript(String);

impl YosysScript {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-comment, non-blank lines
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.0
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
    }
}

impl fmt::Display for YosysScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `line` (already trimmed) begins with a Yosys command.
///
/// Yosys commands are lowercase, so "Synthesis should work" is prose.
pub fn is_command_line(line: &str) -> bool {
    let Some(word) = line.split_whitespace().next() else {
        return false;
    };
    let word = word.trim_end_matches(';');
    COMMANDS.contains(&word)
        || COMMAND_FAMILIES.iter().any(|family| {
            word.strip_prefix(family)
                .and_then(|rest| rest.strip_prefix('_'))
                .is_some_and(|variant| !variant.is_empty())
        })
}

/// Whether `line` reads as explanation ("Note: ...", "If you need ...")
pub fn is_explanatory(line: &str) -> bool {
    let lower = line.to_lowercase();
    let words: Vec<&str> = lower
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| matches!(c, '.' | ',' | ':' | ';' | '!' | '?' | '(' | ')' | '"')))
        .filter(|w| !w.is_empty())
        .collect();
    EXPLANATORY
        .iter()
        .any(|phrase| words.windows(phrase.len()).any(|window| window == *phrase))
}

fn keep(line: &str) -> bool {
    (line.starts_with('#') || is_command_line(line)) && !is_explanatory(line)
}

/// Pull a Yosys script out of a model reply.
///
/// Lines inside code fences or after a "here's the script" style marker are
/// considered first; if none of them qualify the whole reply is scanned.
/// Returns `None` when no command line is found.
pub fn extract_script(text: &str) -> Option<YosysScript> {
    let mut fenced = Vec::new();
    let mut in_fence = false;
    let mut in_section = false;

    for line in text.lines().map(str::trim) {
        if line.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        let lower = line.to_lowercase();
        if !in_fence && SECTION_MARKERS.iter().any(|m| lower.contains(m)) {
            in_section = true;
            continue;
        }
        if (in_fence || in_section) && keep(line) {
            fenced.push(line);
        }
    }

    let lines = if fenced.iter().any(|l| is_command_line(l)) {
        fenced
    } else {
        text.lines().map(str::trim).filter(|l| keep(l)).collect()
    };

    if !lines.iter().any(|l| is_command_line(l)) {
        return None;
    }
    Some(YosysScript::new(lines.join("\n")))
}
