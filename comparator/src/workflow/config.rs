use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tgcore::{CompareConfig, RadiusSet, SelectionMode};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub compare: CompareConfig,
    /// JSON document with the parsed observation and gauge arrays.
    pub input: Option<PathBuf>,
    /// Where the JSON report is written.
    pub report: Option<PathBuf>,
    pub skip_malformed_files: bool,
    /// Settings for the synthetic scenario, used when no input is given.
    pub synthetic: Option<GeneratorConfig>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .compare
            .validate()
            .with_context(|| format!("validating workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Applies command-line overrides on top of a loaded configuration.
    pub fn apply_overrides(
        &mut self,
        mode: Option<SelectionMode>,
        window_days: Option<f64>,
        radii: Option<Vec<f64>>,
    ) {
        if let Some(mode) = mode {
            self.compare.mode = mode;
        }
        if let Some(window_days) = window_days {
            self.compare.window_days = window_days;
        }
        if let Some(radii) = radii.filter(|r| !r.is_empty()) {
            self.compare.radii = RadiusSet::List(radii);
        }
    }
}
