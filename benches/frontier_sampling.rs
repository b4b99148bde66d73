use std::hint::black_box;
use std::time::Duration;

use chrono::Days;
use chrono::NaiveDate;
use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use frontier_rs::quant::portfolio::PortfolioCalculator;
use frontier_rs::quant::portfolio::PortfolioCalculatorConfig;
use frontier_rs::quant::portfolio::PriceObservation;
use frontier_rs::quant::portfolio::Security;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn synthetic_universe(n: usize, days: u64) -> Vec<Security> {
  let mut rng = StdRng::seed_from_u64(17);
  let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();

  (0..n)
    .map(|i| {
      let mut price = 100.0;
      let history = (0..days)
        .map(|d| {
          price *= 1.0 + rng.random_range(-0.02..0.02);
          PriceObservation::new(start + Days::new(d), Some(price))
        })
        .collect();
      Security::new(format!("S{i}"), format!("Synthetic {i}"), history)
    })
    .collect()
}

fn bench_generation(c: &mut Criterion) {
  let mut group = c.benchmark_group("PortfolioGeneration");
  group.measurement_time(Duration::from_secs(3));
  group.warm_up_time(Duration::from_millis(500));

  for &parallel in &[false, true] {
    let label = if parallel { "parallel" } else { "sequential" };
    group.bench_with_input(BenchmarkId::new(label, 10_000), &parallel, |b, &parallel| {
      let mut calc = PortfolioCalculator::new(
        synthetic_universe(20, 250),
        PortfolioCalculatorConfig {
          parallel,
          ..PortfolioCalculatorConfig::default()
        },
      )
      .unwrap();
      let mut rng = StdRng::seed_from_u64(1);
      b.iter(|| {
        calc.clear_portfolios();
        black_box(calc.generate_portfolios(10_000, &mut rng).unwrap())
      });
    });
  }

  group.finish();
}

fn bench_frontier(c: &mut Criterion) {
  let mut calc =
    PortfolioCalculator::new(synthetic_universe(20, 250), PortfolioCalculatorConfig::default())
      .unwrap();
  calc
    .generate_portfolios(100_000, &mut StdRng::seed_from_u64(2))
    .unwrap();

  c.bench_function("efficient_frontier/100k", |b| {
    b.iter(|| black_box(calc.calculate_efficient_frontier(2).unwrap().len()))
  });
}

criterion_group!(benches, bench_generation, bench_frontier);
criterion_main!(benches);
