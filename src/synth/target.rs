//! Synthesis target - the design files a refinement loop works on.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthloopError};

/// Suffix appended to the Verilog file stem for the default netlist name
const NETLIST_SUFFIX: &str = "_synthesized_netlist.v";

/// Input and output files for one synthesis loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisTarget {
    pub verilog_path: PathBuf,
    pub sdc_path: PathBuf,
    pub output_file: PathBuf,
}

impl SynthesisTarget {
    /// Target with the default netlist name `<verilog stem>_synthesized_netlist.v`
    pub fn new(verilog_path: impl Into<PathBuf>, sdc_path: impl Into<PathBuf>) -> Self {
        let verilog_path = verilog_path.into();
        let output_file = default_output_file(&verilog_path);
        Self {
            verilog_path,
            sdc_path: sdc_path.into(),
            output_file,
        }
    }

    /// Override the netlist path
    pub fn with_output(mut self, output_file: impl Into<PathBuf>) -> Self {
        self.output_file = output_file.into();
        self
    }

    /// Design name, taken from the Verilog file stem
    pub fn design_name(&self) -> String {
        self.verilog_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "design".to_string())
    }

    /// Check that both input files exist
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<String> = [&self.verilog_path, &self.sdc_path]
            .iter()
            .filter(|p| !p.is_file())
            .map(|p| p.display().to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SynthloopError::InvalidState(format!(
                "Required files not found: {}",
                missing.join(", ")
            )))
        }
    }
}

fn default_output_file(verilog_path: &Path) -> PathBuf {
    let stem = verilog_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "design".to_string());
    PathBuf::from(format!("{}{}", stem, NETLIST_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_output_file() {
        let target = SynthesisTarget::new("yosys_test/counter.v", "yosys_test/counter.sdc");
        assert_eq!(target.output_file, PathBuf::from("counter_synthesized_netlist.v"));
        assert_eq!(target.design_name(), "counter");
    }

    #[test]
    fn test_with_output() {
        let target = SynthesisTarget::new("alu.v", "alu.sdc").with_output("out/alu_net.v");
        assert_eq!(target.output_file, PathBuf::from("out/alu_net.v"));
    }

    #[test]
    fn test_validate_missing_files() {
        let target = SynthesisTarget::new("/nonexistent/a.v", "/nonexistent/a.sdc");
        let err = target.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("/nonexistent/a.v"));
        assert!(msg.contains("/nonexistent/a.sdc"));
    }

    #[test]
    fn test_validate_existing_files() -> Result<()> {
        let dir = TempDir::new()?;
        let verilog = dir.path().join("counter.v");
        let sdc = dir.path().join("counter.sdc");
        std::fs::write(&verilog, "module counter(); endmodule")?;
        std::fs::write(&sdc, "create_clock -period 10 [get_ports clk]")?;

        SynthesisTarget::new(verilog, sdc).validate()
    }
}
