//! Yosys executor - runs a candidate script and classifies the result

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use super::script::YosysScript;
use crate::error::Result;
use crate::refine::{Executor, Outcome};

/// How the Yosys binary is invoked
#[derive(Debug, Clone)]
pub struct YosysConfig {
    /// Program to run (default: `yosys`)
    pub program: String,
    /// Extra arguments placed before the script path
    pub args: Vec<String>,
    /// Wall-clock limit per run in milliseconds (default: 60000)
    pub timeout_ms: u64,
    /// Directory the program runs in; the current directory when unset
    pub working_dir: Option<PathBuf>,
    /// Treat a missing netlist as a failed round
    pub require_output: bool,
}

impl Default for YosysConfig {
    fn default() -> Self {
        Self {
            program: "yosys".to_string(),
            args: Vec::new(),
            timeout_ms: 60000,
            working_dir: None,
            require_output: true,
        }
    }
}

impl YosysConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn require_output(mut self, require: bool) -> Self {
        self.require_output = require;
        self
    }
}

/// What a successful run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisOutput {
    /// Netlist written by the script, when one was expected and found
    pub netlist: Option<PathBuf>,
    /// Combined tool output
    pub log: String,
}

/// Runs Yosys scripts as subprocesses.
pub struct YosysExecutor {
    config: YosysConfig,
    output: Option<PathBuf>,
}

impl YosysExecutor {
    pub fn new(config: YosysConfig) -> Self {
        Self {
            config,
            output: None,
        }
    }

    /// Netlist path the script is expected to write
    pub fn expect_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn config(&self) -> &YosysConfig {
        &self.config
    }

    /// Expected netlist, resolved against the working directory
    fn output_path(&self) -> Option<PathBuf> {
        let path = self.output.as_ref()?;
        match &self.config.working_dir {
            Some(dir) if path.is_relative() => Some(dir.join(path)),
            _ => Some(path.clone()),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.config.program);
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    /// Report the installed version (`<program> -V`)
    pub async fn version(&self) -> Result<String> {
        let mut cmd = self.command();
        cmd.arg("-V");
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let output = tokio::time::timeout(timeout, cmd.output())
            .await
            .map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("{} -V timed out after {}ms", self.config.program, self.config.timeout_ms),
                )
            })??;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn write_script(script: &YosysScript) -> std::io::Result<tempfile::NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("synthloop_")
            .suffix(".ys")
            .tempfile()?;
        file.write_all(script.as_str().as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()?;
        Ok(file)
    }

    async fn remove_stale_output(path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => info!("Removed existing netlist {} before running", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove stale netlist {}: {}", path.display(), e),
        }
    }

    async fn run(&self, script: &YosysScript) -> Outcome<SynthesisOutput> {
        let owned = script.clone();
        let file = match tokio::task::spawn_blocking(move || Self::write_script(&owned)).await {
            Ok(Ok(file)) => file,
            Ok(Err(e)) => return Outcome::FatalError(format!("Failed to write script file: {}", e)),
            Err(e) => return Outcome::FatalError(format!("Script writer task failed: {}", e)),
        };

        let output_path = self.output_path();
        if let Some(path) = &output_path {
            Self::remove_stale_output(path).await;
        }

        let mut cmd = self.command();
        cmd.args(&self.config.args).arg(file.path());
        debug!(
            "Running {} {} {}",
            self.config.program,
            self.config.args.join(" "),
            file.path().display()
        );

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Outcome::FatalError(format!(
                    "{} is not installed or not in PATH",
                    self.config.program
                ));
            }
            Err(e) => {
                return Outcome::FatalError(format!("Failed to start {}: {}", self.config.program, e));
            }
        };

        // Dropping the child on timeout kills it
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Outcome::FatalError(format!("Failed to wait for {}: {}", self.config.program, e));
            }
            Err(_) => {
                return Outcome::RecoverableFailure(format!(
                    "timeout after {}ms",
                    self.config.timeout_ms
                ));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none (terminated by signal)".to_string());
            return Outcome::RecoverableFailure(format!(
                "{} failed with return code {}\nSTDOUT:\n{}\nSTDERR:\n{}",
                self.config.program,
                code,
                stdout.trim_end(),
                stderr.trim_end()
            ));
        }

        let mut log = stdout.trim_end().to_string();
        if !stderr.trim().is_empty() {
            log.push_str("\nSTDERR:\n");
            log.push_str(stderr.trim_end());
        }

        let netlist = match output_path {
            Some(path) if path.is_file() => Some(path),
            Some(path) if self.config.require_output => {
                return Outcome::RecoverableFailure(format!(
                    "{} exited successfully but did not write the netlist {}\nSTDOUT:\n{}",
                    self.config.program,
                    path.display(),
                    log
                ));
            }
            _ => None,
        };

        Outcome::Success(SynthesisOutput { netlist, log })
    }
}

#[async_trait]
impl Executor for YosysExecutor {
    type Artifact = YosysScript;
    type Output = SynthesisOutput;

    async fn execute(&self, artifact: &YosysScript) -> Outcome<SynthesisOutput> {
        let outcome = self.run(artifact).await;
        info!("{} run finished: {}", self.config.program, outcome.label());
        outcome
    }

    fn description(&self) -> &str {
        &self.config.program
    }
}
