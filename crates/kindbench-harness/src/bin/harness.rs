//! CLI entrypoint for the kindbench allocator comparison harness.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kindbench_harness::config::check_fraction;
use kindbench_harness::error::parse_kinds;
use kindbench_harness::scenario;
use kindbench_harness::structured_log::LogEmitter;
use kindbench_harness::{
    HarnessConfig, HarnessError, SCENARIOS, Scenario, SuiteReport, SuiteRunner, WorkloadParams,
};

/// Allocator comparison tooling for kindbench.
#[derive(Debug, Parser)]
#[command(name = "kindbench-harness")]
#[command(about = "Compare the kind allocator against the platform allocator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the registered scenarios.
    List,
    /// Run all (or the named) scenarios.
    Run {
        /// Scenario to run; repeat to select several. Defaults to all.
        #[arg(long = "scenario")]
        scenarios: Vec<String>,
        /// Tolerance fraction (overrides KINDBENCH_DELTA).
        #[arg(long)]
        delta: Option<f64>,
        /// Output report path (markdown; JSON is written alongside).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Output JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Run one ad-hoc workload compared with tolerance + confidence.
    Custom {
        /// Allocate/free pairs per iteration.
        #[arg(long)]
        operations: usize,
        /// Number of timed iterations.
        #[arg(long)]
        iterations: usize,
        /// Bytes per allocation.
        #[arg(long)]
        size: usize,
        /// Comma-separated kinds to cycle through.
        #[arg(long, default_value = "default")]
        kinds: String,
        /// Tolerance fraction (overrides KINDBENCH_TOLERANCE).
        #[arg(long)]
        tolerance: Option<f64>,
        /// Confidence margin (overrides KINDBENCH_CONFIDENCE).
        #[arg(long)]
        confidence: Option<f64>,
        /// Output report path (markdown; JSON is written alongside).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Output JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
    },
}

/// Work selected on the command line.
enum Job {
    Scenarios(Vec<&'static Scenario>),
    Custom(WorkloadParams),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (config, job, report, log) = match cli.command {
        Command::List => {
            for s in &SCENARIOS {
                println!("{:<34} {}", s.name, s.description);
            }
            return Ok(());
        }
        Command::Run {
            scenarios,
            delta,
            report,
            log,
        } => {
            let mut config = HarnessConfig::from_env()?;
            if let Some(delta) = delta {
                config.delta = check_fraction("delta", delta)?;
            }
            let selected = scenario::select(&scenarios)?;
            (config, Job::Scenarios(selected), report, log)
        }
        Command::Custom {
            operations,
            iterations,
            size,
            kinds,
            tolerance,
            confidence,
            report,
            log,
        } => {
            let mut config = HarnessConfig::from_env()?;
            if let Some(tolerance) = tolerance {
                config.tolerance = check_fraction("tolerance", tolerance)?;
            }
            if let Some(confidence) = confidence {
                config.confidence = check_fraction("confidence", confidence)?;
            }
            let params = WorkloadParams {
                operation_count: operations,
                iteration_count: iterations,
                allocation_size: size,
                kinds: parse_kinds(&kinds)?,
            };
            (config, Job::Custom(params), report, log)
        }
    };

    let runner = SuiteRunner::global(config);
    let report_doc = match log {
        Some(path) => {
            eprintln!("Writing JSONL log to {}", path.display());
            let mut emitter = LogEmitter::to_file(&path, &runner.run_id)?;
            run_job(&runner, job, &mut emitter)?
        }
        None => run_job(&runner, job, &mut LogEmitter::discard(&runner.run_id))?,
    };
    finish(&report_doc, report)
}

fn run_job<W: Write>(
    runner: &SuiteRunner<'_>,
    job: Job,
    log: &mut LogEmitter<W>,
) -> Result<SuiteReport, HarnessError> {
    let config = runner.config();
    match job {
        Job::Scenarios(selected) => {
            eprintln!(
                "Run {}: {} scenario(s), {}",
                log.run_id(),
                selected.len(),
                config.scenario_tolerance().describe()
            );
            runner.run(&selected, log)
        }
        Job::Custom(params) => {
            eprintln!(
                "Run {}: custom workload, {}",
                log.run_id(),
                config.band_tolerance().describe()
            );
            runner.run_custom("custom", params, log)
        }
    }
}

fn finish(
    report_doc: &SuiteReport,
    report: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = &report_doc.summary;
    eprintln!(
        "Comparison complete: total={}, passed={}, regressed={}, errored={}",
        summary.total, summary.passed, summary.regressed, summary.errored
    );

    if let Some(report_path) = report {
        eprintln!("Writing report to {}", report_path.display());
        std::fs::write(&report_path, report_doc.to_markdown())?;
        std::fs::write(report_path.with_extension("json"), report_doc.to_json())?;
    }

    if !report_doc.all_passed() {
        return Err("Allocator comparison failed".into());
    }
    Ok(())
}
