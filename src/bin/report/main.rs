// Stadium Pricing Report: scenario battery, comparative statics, summary
// Prints tables to stdout; optionally writes the full report as JSON
//
// Usage:
//   cargo run --release --bin report                          # Default battery
//   cargo run --release --bin report -- --ceiling 7 --floor 15
//   cargo run --release --bin report -- --crime 5 --health 2  # Externality rates
//   cargo run --release --bin report -- --params params.json  # Parameter overrides
//   cargo run --release --bin report -- --sweep --out report.json
//   RUST_LOG=stadium_engine=debug cargo run --bin report      # Optimizer trace

mod render;

use serde::Serialize;
use stadium_engine::scenarios::{
    self, CeilingSweepRow, ComparativeStaticsRow, SummaryStatistics, CURRENT_OBSERVED,
    DEFAULT_PRICE_CEILING,
};
use stadium_engine::{
    ExternalityRates, Model, ParameterFile, ScenarioRunner, ScenarioTable,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    ceiling: f64,
    floor: Option<f64>,
    crime: Option<f64>,
    health: Option<f64>,
    params: Option<PathBuf>,
    baseline: String,
    sweep: bool,
    out: Option<PathBuf>,
}

fn parse_price(flag: &str, value: Option<&String>) -> Result<f64, String> {
    let value = value.ok_or_else(|| format!("{flag} needs a value"))?;
    value
        .trim_start_matches('$')
        .parse()
        .map_err(|_| format!("{flag}: not a number: {value}"))
}

fn parse_args() -> Result<CliArgs, String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        ceiling: DEFAULT_PRICE_CEILING,
        floor: None,
        crime: None,
        health: None,
        params: None,
        baseline: CURRENT_OBSERVED.to_string(),
        sweep: false,
        out: None,
    };

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--ceiling" => {
                i += 1;
                cli.ceiling = parse_price(flag, args.get(i))?;
            }
            "--floor" => {
                i += 1;
                cli.floor = Some(parse_price(flag, args.get(i))?);
            }
            "--crime" => {
                i += 1;
                cli.crime = Some(parse_price(flag, args.get(i))?);
            }
            "--health" => {
                i += 1;
                cli.health = Some(parse_price(flag, args.get(i))?);
            }
            "--params" => {
                i += 1;
                let path = args.get(i).ok_or("--params needs a file")?;
                cli.params = Some(PathBuf::from(path));
            }
            "--baseline" => {
                i += 1;
                cli.baseline = args.get(i).ok_or("--baseline needs a scenario name")?.clone();
            }
            "--out" => {
                i += 1;
                let path = args.get(i).ok_or("--out needs a file")?;
                cli.out = Some(PathBuf::from(path));
            }
            "--sweep" => cli.sweep = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }
    Ok(cli)
}

// ─── Report ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Report<'a> {
    version: &'static str,
    rates: ExternalityRates,
    baseline_scenario: &'a str,
    scenarios: &'a ScenarioTable,
    comparative_statics: &'a [ComparativeStaticsRow],
    summary: &'a SummaryStatistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    ceiling_sweep: Option<&'a [CeilingSweepRow]>,
}

/// Ceilings from $4 to $16 in one-dollar steps.
fn sweep_ceilings() -> Vec<f64> {
    (4..=16).map(f64::from).collect()
}

fn run(cli: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let model = match &cli.params {
        Some(path) => Model::from_parameter_file(ParameterFile::load(path)?)?,
        None => Model::with_defaults()?,
    };
    let defaults = model.default_externality_rates();
    let rates = ExternalityRates::new(
        cli.crime.unwrap_or(defaults.crime_cost_per_unit),
        cli.health.unwrap_or(defaults.health_cost_per_unit),
    );

    let runner = ScenarioRunner::new(&model);
    let table = runner.run_all_scenarios(cli.ceiling, cli.floor, &rates);
    let statics = scenarios::calculate_comparative_statics(&table, &cli.baseline)?;
    let summary = scenarios::summary_statistics(&table)?;
    let sweep = cli.sweep.then(|| runner.ceiling_sweep(&sweep_ceilings(), &rates));

    println!("\n  Stadium Pricing Report v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "  Externality: crime ${:.2}/unit, health ${:.2}/unit | Baseline: {}\n",
        rates.crime_cost_per_unit, rates.health_cost_per_unit, cli.baseline
    );
    render::scenario_table(&table);
    render::comparative_statics(&statics);
    render::summary(&summary);
    if let Some(rows) = &sweep {
        render::ceiling_sweep(rows);
    }

    if let Some(path) = &cli.out {
        let report = Report {
            version: env!("CARGO_PKG_VERSION"),
            rates,
            baseline_scenario: &cli.baseline,
            scenarios: &table,
            comparative_statics: &statics,
            summary: &summary,
            ceiling_sweep: sweep.as_deref(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("  Results saved to: {}\n", path.display());
    }
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stadium_engine=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::from(2);
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
