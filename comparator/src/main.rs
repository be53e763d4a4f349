use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use generator::profile::build_scenario;
use input::InputDocument;
use log::info;
use report::{render_table, write_report};
use std::path::PathBuf;
use tgcore::SelectionMode;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod input;
mod report;
mod workflow;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Average,
    Nearest,
}

impl From<ModeArg> for SelectionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Average => SelectionMode::Average,
            ModeArg::Nearest => SelectionMode::Nearest,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Altimetry versus tide-gauge comparison over a range of radii")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// JSON document with observation files and gauge arrays
    #[arg(long)]
    input: Option<PathBuf>,
    /// Generate a synthetic scenario instead of reading input
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    #[arg(long)]
    window_days: Option<f64>,
    /// Comma separated radii in km
    #[arg(long, value_delimiter = ',')]
    radii: Option<Vec<f64>>,
    #[arg(long)]
    report: Option<PathBuf>,
    /// Write the generated synthetic document to this path
    #[arg(long)]
    emit_input: Option<PathBuf>,
    /// Skip malformed observation files instead of aborting
    #[arg(long, default_value_t = false)]
    skip_malformed: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = match &args.workflow {
        Some(path) => WorkflowConfig::load(path)?,
        None => WorkflowConfig::default(),
    };
    workflow_config.apply_overrides(args.mode.map(Into::into), args.window_days, args.radii.clone());
    workflow_config.skip_malformed_files |= args.skip_malformed;
    if args.report.is_some() {
        workflow_config.report = args.report.clone();
    }
    workflow_config
        .compare
        .validate()
        .context("validating comparison settings")?;

    let input_path = args.input.clone().or_else(|| workflow_config.input.clone());
    let document = if args.synthetic || (input_path.is_none() && workflow_config.synthetic.is_some()) {
        let mut generator = workflow_config.synthetic.clone().unwrap_or_default();
        if let Some(seed) = args.seed {
            generator.seed = seed;
        }
        info!("generating synthetic scenario with seed {}", generator.seed);
        let document = build_scenario(&generator).context("building synthetic scenario")?;
        if let Some(path) = &args.emit_input {
            document.save(path)?;
        }
        document
    } else if let Some(path) = input_path {
        InputDocument::load(path)?
    } else {
        bail!("no input given: pass --input, --synthetic, or a workflow config with one of them");
    };

    let bundle = document.into_bundle(workflow_config.skip_malformed_files)?;
    let runner = Runner::new(workflow_config);
    let result = runner.execute(&bundle)?;
    let comparison = runner.build_report(&result);

    print!("{}", render_table(&comparison.radii));
    if !result.skipped_files.is_empty() {
        println!("skipped {} malformed files", result.skipped_files.len());
    }
    if let Some(path) = &runner.config().report {
        write_report(path, &comparison)?;
        info!("report written to {}", path.display());
    }

    Ok(())
}
