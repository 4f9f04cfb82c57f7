use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use synthloop::llm::AnthropicConfig;
use synthloop::llm::anthropic::DEFAULT_MODEL;
use synthloop::refine::RefinementConfig;
use synthloop::synth::{DEFAULT_MAX_LOG_CHARS, YosysConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub llm: LlmConfig,
    pub refine: RefineConfig,
    pub yosys: YosysSection,
    pub guess: GuessConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 4096,
            temperature: None,
            timeout_ms: 300000,
        }
    }
}

impl LlmConfig {
    pub fn anthropic(&self) -> AnthropicConfig {
        AnthropicConfig {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineConfig {
    pub max_rounds: u32,
    /// Unusable proposals tolerated per run; `null` for no limit
    pub max_failed_proposals: Option<u32>,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            max_rounds: 5,
            max_failed_proposals: Some(3),
        }
    }
}

impl RefineConfig {
    pub fn refinement(&self) -> RefinementConfig {
        RefinementConfig {
            max_failed_proposals: self.max_failed_proposals,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YosysSection {
    pub program: String,
    pub args: Vec<String>,
    pub timeout_ms: u64,
    pub require_output: bool,
    pub max_log_chars: usize,
}

impl Default for YosysSection {
    fn default() -> Self {
        Self {
            program: "yosys".to_string(),
            args: Vec::new(),
            timeout_ms: 60000,
            require_output: true,
            max_log_chars: DEFAULT_MAX_LOG_CHARS,
        }
    }
}

impl YosysSection {
    pub fn executor_config(&self) -> YosysConfig {
        YosysConfig {
            program: self.program.clone(),
            args: self.args.clone(),
            timeout_ms: self.timeout_ms,
            working_dir: None,
            require_output: self.require_output,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuessConfig {
    pub min: u32,
    pub max: u32,
    pub max_attempts: u32,
}

impl Default for GuessConfig {
    fn default() -> Self {
        Self {
            min: 1,
            max: 100,
            max_attempts: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            llm: LlmConfig::default(),
            refine: RefineConfig::default(),
            yosys: YosysSection::default(),
            guess: GuessConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}
