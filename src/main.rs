//! Risk-managed order calculator
//!
//! Reads candidate trades from a CSV file and prints entry, stop-loss, lot
//! size and take-profit levels sized against a fixed fraction of the account.

mod error;
mod input;
mod models;
mod report;
mod trading;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::report::TableRenderer;
use crate::trading::{FormulaPolicy, PipRatioTable, Preset, SystemStamps, TradeCalculator};

/// Trade calculator CLI.
#[derive(Parser)]
#[command(name = "tradecalc")]
#[command(about = "Compute stop-loss, lot size and take-profit levels from trade setups", long_about = None)]
#[command(version)]
struct Cli {
    /// Input CSV file
    #[arg(short, long, default_value = "input.csv", env = "TRADECALC_INPUT")]
    input: PathBuf,

    /// Formula preset
    #[arg(long, value_enum, default_value_t = Preset::Classic, env = "TRADECALC_PRESET")]
    preset: Preset,

    /// JSON formula policy file (overrides --preset)
    #[arg(long, env = "TRADECALC_POLICY")]
    policy: Option<PathBuf>,

    /// Abort on the first invalid row
    #[arg(long)]
    strict: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", env = "TRADECALC_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the pip ratio table
    Pairs,

    /// Show the active formula policy
    Policy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging; RUST_LOG wins over --log-level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let policy = match &cli.policy {
        Some(path) => FormulaPolicy::from_file(path)?,
        None => FormulaPolicy::preset(cli.preset),
    };
    let calculator = TradeCalculator::new(policy, PipRatioTable::standard())?;

    match cli.command {
        Some(Commands::Pairs) => {
            println!("\n{:<10} {:>8}", "PAIR", "RATIO");
            println!("{}", "-".repeat(19));
            for (pair, ratio) in calculator.pip_ratios().iter() {
                println!("{:<10} {:>8}", pair, ratio);
            }
            println!(
                "\n{} pairs listed; unlisted pairs use {}",
                calculator.pip_ratios().len(),
                trading::DEFAULT_PIP_RATIO
            );
            return Ok(ExitCode::SUCCESS);
        }

        Some(Commands::Policy) => {
            let policy = calculator.policy();
            println!("\n=== Formula Policy ===\n");
            println!("  Stop-loss buffer:     {} points", policy.stop_loss_buffer);
            println!("  Spread on entry:      {}", policy.apply_spread_to_entry);
            println!("  Lot size divisor:     {}", policy.lot_size_divisor);
            println!(
                "  TP multiples:         {}",
                policy
                    .tp_multiples
                    .iter()
                    .map(|m| format!("{}R", m))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!("  Entry == pivot:       {}", policy.equal_price_direction);
            println!("  Pip ratio overrides:  {}", policy.pip_ratios.len());
            return Ok(ExitCode::SUCCESS);
        }

        None => {}
    }

    let rows = input::read_trades(&cli.input)
        .with_context(|| format!("Could not read input CSV {}", cli.input.display()))?;

    if cli.strict {
        if let Some(err) = rows.iter().find_map(|r| r.parsed.as_ref().err()) {
            anyhow::bail!("{}", err);
        }
    }

    let batch = calculator.run_batch(rows, &mut SystemStamps);

    if cli.strict {
        if let Some(err) = batch.errors.first() {
            anyhow::bail!("{}", err);
        }
    }

    info!(
        trades = batch.trades.len(),
        failed = batch.errors.len(),
        "Batch calculated"
    );

    let color = !cli.no_color && std::env::var_os("NO_COLOR").map_or(true, |v| v.is_empty());
    let renderer = TableRenderer::new(color);

    match cli.format {
        OutputFormat::Table => {
            let tp_count = calculator.policy().tp_multiples.len();
            print!("{}", renderer.render(&batch.trades, tp_count));
            println!("{}", renderer.render_summary(&batch));
        }
        OutputFormat::Json => {
            print!("{}", report::render_json(&batch.trades)?);
        }
    }

    if batch.errors.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    warn!(failed = batch.errors.len(), "Some rows could not be calculated");
    eprint!("{}", renderer.render_errors(&batch.errors));
    Ok(ExitCode::FAILURE)
}
