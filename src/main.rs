use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use frontier_rs::quant::portfolio::CalculationWindow;
use frontier_rs::quant::portfolio::CsvPriceProvider;
use frontier_rs::quant::portfolio::PortfolioCalculator;
use frontier_rs::quant::portfolio::PortfolioCalculatorConfig;
use prettytable::row;
use prettytable::Table;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Sample random portfolios over daily closes and print the efficient frontier.
#[derive(Parser, Debug)]
#[command(name = "frontier", version)]
struct Cli {
  /// Headed CSV file with `secid,name,date,close` rows; an empty close marks a missing price.
  #[arg(long)]
  prices: PathBuf,

  /// Comma separated security identifiers to combine.
  #[arg(long, value_delimiter = ',', required = true)]
  securities: Vec<String>,

  /// First day of the calculation window (YYYY-MM-DD).
  #[arg(long)]
  from: NaiveDate,

  /// Last day of the calculation window (YYYY-MM-DD).
  #[arg(long)]
  to: NaiveDate,

  /// Number of random portfolios to draw.
  #[arg(long, default_value_t = 10_000)]
  amount: usize,

  /// Decimal digits the risk is rounded to when bucketing the frontier.
  #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
  precision: i32,

  /// Seed for the random source; drawn from the OS when omitted.
  #[arg(long)]
  seed: Option<u64>,

  /// Spread the draws over all cores.
  #[arg(long)]
  parallel: bool,

  /// Stop drawing after this many milliseconds.
  #[arg(long)]
  timeout_ms: Option<u64>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let cli = Cli::parse();
  let provider = CsvPriceProvider::open(&cli.prices)?;
  let window = CalculationWindow::new(cli.from, cli.to)?;
  let config = PortfolioCalculatorConfig {
    parallel: cli.parallel,
    time_budget: cli.timeout_ms.map(Duration::from_millis),
    ..PortfolioCalculatorConfig::default()
  };

  let mut calculator =
    PortfolioCalculator::from_provider(&provider, &cli.securities, window, config)?;

  let seed = cli.seed.unwrap_or_else(rand::random);
  info!(seed, amount = cli.amount, "sampling portfolios");
  let mut rng = StdRng::seed_from_u64(seed);
  let summary = calculator.generate_portfolios(cli.amount, &mut rng)?;

  let frontier = calculator.calculate_efficient_frontier(cli.precision)?;
  info!(
    generated = summary.generated,
    frontier = frontier.len(),
    "efficient frontier selected"
  );

  let mut table = Table::new();
  table.set_titles(row!["Risk bucket", "Risk", "Expected return", "Weights"]);
  for point in frontier.points() {
    let weights = point
      .portfolio
      .weights()
      .iter()
      .map(|(id, w)| format!("{id}={w:.4}"))
      .collect::<Vec<_>>()
      .join(" ");
    table.add_row(row![
      format!("{:.*}", frontier.precision() as usize, point.risk_bucket),
      format!("{:.6}", point.portfolio.risk()),
      format!("{:.6}", point.portfolio.expected_return()),
      weights
    ]);
  }
  table.printstd();

  Ok(())
}
