//! LaunchLab CLI — replay recorded launch history through a strategy sweep.
//!
//! Commands:
//! - `run` — single simulation with base parameters
//! - `sweep` — grid sweep with constrained best-selection

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use launchlab_core::domain::{Params, QuoteBook, Snapshot};
use launchlab_core::engine::TradeSettings;
use launchlab_runner::config::{date_to_epoch, GridValue};
use launchlab_runner::{
    load_events, load_quotes, run_sweep, save_artifacts, ParamGrid, SweepConfig, SweepConstraints,
    SweepOutcome, SweepRow,
};

#[derive(Parser)]
#[command(
    name = "launchlab",
    about = "LaunchLab CLI — launch-sniping strategy backtester"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by both commands: where the recording lives and how trades
/// execute.
#[derive(Args)]
struct MarketArgs {
    /// Path to the sqlite recording, e.g. ./data/bot.sqlite.
    #[arg(long)]
    db: PathBuf,

    /// Start date (YYYY-MM-DD), inclusive.
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD), inclusive.
    #[arg(long)]
    end: Option<String>,

    /// Take-profit threshold (fraction).
    #[arg(long, default_value_t = 0.35)]
    tp: f64,

    /// Stop-loss threshold (fraction).
    #[arg(long, default_value_t = 0.25)]
    sl: f64,

    /// Max hold time in seconds.
    #[arg(long, default_value_t = 900)]
    max_hold_secs: i64,

    /// Entry size for SMALL signals (SOL).
    #[arg(long, default_value_t = 0.1)]
    size_small: f64,

    /// Entry size for APEX signals (SOL).
    #[arg(long, default_value_t = 0.4)]
    size_large: f64,

    /// Output directory for reports.
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate once with base parameters (no grid).
    Run {
        #[command(flatten)]
        market: MarketArgs,
    },
    /// Evaluate a parameter grid and select the best combination.
    Sweep {
        #[command(flatten)]
        market: MarketArgs,

        /// Inline grid as JSON, e.g. '{"ENTRY_MIN_SCORE":[55,60]}'.
        /// Scalars pin a parameter, lists sweep it.
        #[arg(long)]
        grid: Option<String>,

        /// TOML config file; supersedes the data and trade flags.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Feasibility floor on trade count.
        #[arg(long, default_value_t = 10)]
        min_trades: usize,

        /// Feasibility cap on max drawdown (fraction).
        #[arg(long, default_value_t = 0.4)]
        max_dd: f64,

        /// Disable parallel combination evaluation.
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { market } => run_cmd(market),
        Commands::Sweep {
            market,
            grid,
            config,
            min_trades,
            max_dd,
            sequential,
        } => sweep_cmd(market, grid, config, min_trades, max_dd, sequential),
    }
}

fn run_cmd(market: MarketArgs) -> Result<()> {
    let settings = market.trade_settings();
    let (events, book) = load_market(&market, &settings)?;

    let base = Params::with_defaults();
    let outcome = run_sweep(
        &ParamGrid::empty(),
        &base,
        &events,
        &book,
        &settings,
        &SweepConstraints::default(),
        false,
    );

    print_metrics(&outcome.rows[0]);
    save_artifacts(&market.out_dir, &outcome)?;
    println!("Artifacts saved to: {}", market.out_dir.display());
    Ok(())
}

fn sweep_cmd(
    market: MarketArgs,
    grid_json: Option<String>,
    config_path: Option<PathBuf>,
    min_trades: usize,
    max_dd: f64,
    sequential: bool,
) -> Result<()> {
    if grid_json.is_some() && config_path.is_some() {
        bail!("--grid and --config are mutually exclusive");
    }

    if let Some(path) = config_path {
        let config = SweepConfig::from_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?;
        let events = load_events(&config.data.db, config.start_ts(), config.end_ts())?;
        let book = QuoteBook::from_quotes(load_quotes(
            &config.data.db,
            &config.trade.size_tiers(),
        )?);
        execute_sweep(
            &config.grid,
            config.base_params(),
            &config.trade,
            config.sweep,
            &events,
            &book,
            &market.out_dir,
            !sequential,
        )
    } else {
        let grid_spec: BTreeMap<String, GridValue> = match &grid_json {
            Some(raw) => serde_json::from_str(raw).context("parsing --grid JSON")?,
            None => BTreeMap::new(),
        };
        let settings = market.trade_settings();
        let (events, book) = load_market(&market, &settings)?;
        let constraints = SweepConstraints {
            min_trades,
            max_drawdown_cap: max_dd,
        };
        execute_sweep(
            &grid_spec,
            Params::with_defaults(),
            &settings,
            constraints,
            &events,
            &book,
            &market.out_dir,
            !sequential,
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn execute_sweep(
    grid_spec: &BTreeMap<String, GridValue>,
    mut base: Params,
    settings: &TradeSettings,
    constraints: SweepConstraints,
    events: &BTreeMap<String, Vec<Snapshot>>,
    book: &QuoteBook,
    out_dir: &Path,
    parallel: bool,
) -> Result<()> {
    let grid = ParamGrid::from_spec(grid_spec, &mut base);
    println!(
        "Sweeping {} combination(s) over {} mint(s)...",
        grid.combinations(),
        events.len()
    );

    let outcome = run_sweep(&grid, &base, events, book, settings, &constraints, parallel);

    print_best(&outcome);
    save_artifacts(out_dir, &outcome)?;
    println!("Artifacts saved to: {}", out_dir.display());
    Ok(())
}

impl MarketArgs {
    fn trade_settings(&self) -> TradeSettings {
        TradeSettings {
            take_profit: self.tp,
            stop_loss: self.sl,
            max_hold_secs: self.max_hold_secs,
            size_small: self.size_small,
            size_large: self.size_large,
        }
    }
}

fn parse_date_bound(raw: Option<&str>) -> Result<Option<i64>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(date_to_epoch)
            .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
    })
    .transpose()
}

fn load_market(
    market: &MarketArgs,
    settings: &TradeSettings,
) -> Result<(BTreeMap<String, Vec<Snapshot>>, QuoteBook)> {
    let start_ts = parse_date_bound(market.start.as_deref())?;
    let end_ts = parse_date_bound(market.end.as_deref())?;

    let events = load_events(&market.db, start_ts, end_ts)
        .with_context(|| format!("loading events from {}", market.db.display()))?;
    let quotes = load_quotes(&market.db, &settings.size_tiers())
        .with_context(|| format!("loading quotes from {}", market.db.display()))?;

    Ok((events, QuoteBook::from_quotes(quotes)))
}

fn print_metrics(row: &SweepRow) {
    let m = &row.metrics;
    println!();
    println!("=== Simulation Result ===");
    println!("Trades:        {}", m.trades);
    println!("Win Rate:      {:.1}%", m.winrate() * 100.0);
    println!("Total PnL:     {:.4} SOL", m.total_pnl);
    println!("Max Drawdown:  {:.2}%", m.max_drawdown * 100.0);
    println!("Avg Hold:      {:.1}s", m.avg_hold_secs());
    for (origin, pnl) in &m.pnl_by_origin {
        println!("  {origin}: {pnl:.4} SOL");
    }
    println!();
}

fn print_best(outcome: &SweepOutcome) {
    match &outcome.best {
        Some(best) => {
            println!();
            println!("Best params:");
            println!(
                "{}",
                serde_json::to_string(&best.params).expect("Params serialization failed")
            );
            let m = &best.metrics;
            println!(
                "trades={} winrate={:.2} pnl={:.4} dd={:.3} avg_hold_secs={:.1}",
                m.trades,
                m.winrate(),
                m.total_pnl,
                m.max_drawdown,
                m.avg_hold_secs()
            );
        }
        None => {
            println!("No combinations evaluated; see summary.csv for details.");
        }
    }
}
