use crate::input::InputBundle;
use crate::report::ComparisonReport;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use log::info;
use tgcore::{ComparisonPipeline, RadiusReport};

pub struct WorkflowResult {
    pub reports: Vec<RadiusReport>,
    pub skipped_files: Vec<String>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn execute(&self, bundle: &InputBundle) -> anyhow::Result<WorkflowResult> {
        let pipeline = ComparisonPipeline::new(self.config.compare.clone())
            .context("building comparison pipeline")?;
        info!(
            "comparing {} observation files against {} gauges over {} radii",
            bundle.files.len(),
            bundle.archive.len(),
            pipeline.config().radii.count()
        );
        let reports = pipeline
            .run(&bundle.files, &bundle.archive)
            .context("running comparison over configured radii")?;
        Ok(WorkflowResult {
            reports,
            skipped_files: bundle.skipped_files.clone(),
        })
    }

    pub fn build_report(&self, result: &WorkflowResult) -> ComparisonReport {
        ComparisonReport::new(
            &self.config.compare,
            &result.reports,
            self.config.skip_malformed_files,
            result.skipped_files.clone(),
        )
    }
}
