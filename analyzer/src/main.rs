use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use generator::profile::{build_session, GeneratorConfig};
use report::model::SessionReport;
use rfprofilecore::batch::{sort_batches, SortMode};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use workflow::config::SessionConfig;
use workflow::runner::Runner;

mod generator;
mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Aggregates RF test reports per calibration profile")]
struct Args {
    /// Load a session (limits, targets, records) from YAML
    #[arg(long)]
    session: Option<PathBuf>,
    /// Run on a synthetic session instead of a file
    #[arg(long, default_value_t = false)]
    generate: bool,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value_t = 6)]
    targets: usize,
    #[arg(long, default_value_t = 40)]
    records: usize,
    /// condition, passable, name or modification
    #[arg(long, default_value_t = SortMode::Condition)]
    sort: SortMode,
    /// Print the compensation that would center each profile
    #[arg(long, default_value_t = false)]
    suggest: bool,
    /// Apply the suggested compensation to each profile
    #[arg(long, default_value_t = false)]
    apply: bool,
    /// Write the resulting session (rated targets, applied compensation) to YAML
    #[arg(long)]
    output: Option<PathBuf>,
    /// Append a one-line summary per batch to this log
    #[arg(long)]
    report: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let session = match (&args.session, args.generate) {
        (Some(path), _) => SessionConfig::load(path)?,
        (None, true) => build_session(&GeneratorConfig {
            targets: args.targets,
            records_per_target: args.records,
            seed: args.seed,
            ..Default::default()
        })?,
        (None, false) => bail!("pass --session <file> or --generate"),
    };
    let limits = session.limits.clone();
    let records = session.records.clone();

    let runner = Runner::new(args.sort);
    let mut outcome = runner.execute(session)?;

    if args.suggest || args.apply {
        let now = Utc::now();
        for batch in outcome.batches.iter_mut() {
            let suggestion = batch.suggested_compensation();
            if args.suggest {
                println!("{} ({}):", batch.serial(), batch.name());
                for (key, deltas) in suggestion.deltas().iter() {
                    if deltas.iter().any(|&d| d != 0.0) {
                        println!(
                            "  {:<12} {:>7.3} {:>7.3} {:>7.3}",
                            key.to_string(),
                            deltas[0],
                            deltas[1],
                            deltas[2]
                        );
                    }
                }
            }
            if args.apply && !suggestion.is_empty() {
                batch.compensation_mut().copy_from(&suggestion);
                batch
                    .apply_compensation(now, "suggested compensation")
                    .with_context(|| format!("applying compensation to {}", batch.serial()))?;
                batch
                    .evaluate()
                    .with_context(|| format!("re-evaluating {}", batch.serial()))?;
            }
        }
        sort_batches(&mut outcome.batches, args.sort);
    }

    let report = SessionReport::from_outcome(&outcome, args.sort);
    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render());
    }

    if let Some(report_path) = args.report {
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .with_context(|| format!("opening report log {}", report_path.display()))?;
        for batch in &report.batches {
            let line = format!(
                "serial={} condition={} usable={} failed={} units={}\n",
                batch.serial,
                u8::from(batch.condition),
                batch.counts.usable(),
                batch.counts.failed,
                batch.counts.units
            );
            file.write_all(line.as_bytes())?;
        }
    }

    if let Some(output) = args.output {
        let updated = SessionConfig {
            limits,
            targets: outcome.into_targets(),
            records,
        };
        updated.save(&output)?;
        log::info!("session written to {}", output.display());
    }

    Ok(())
}
