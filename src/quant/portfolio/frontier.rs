//! # Efficient Frontier
//!
//! $$
//! F_k = \left\{\arg\max_{p:\ \lfloor 10^k\sigma_p + \frac12\rfloor = b} \mathbb E[R_p]\ :\ b \in \mathbb N\right\}
//! $$
//!
//! Reduces a sampled population to the best-return portfolio of each rounded
//! risk bucket.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use ordered_float::OrderedFloat;

use super::error::PortfolioError;
use crate::traits::PortfolioExt;

/// Finest rounding accepted; beyond this f64 cannot tell buckets apart.
pub const MAX_PRECISION: u32 = 15;

/// Round half-up to `precision` decimal digits (scale, round, descale).
pub fn round_to_precision(value: f64, precision: u32) -> Result<f64, PortfolioError> {
  let scale = 10f64.powi(precision as i32);
  let rounded = (value * scale + 0.5).floor() / scale;
  if rounded.is_finite() {
    Ok(rounded)
  } else {
    Err(PortfolioError::NonFinite("risk bucket"))
  }
}

fn validate_precision(precision: i32) -> Result<u32, PortfolioError> {
  u32::try_from(precision)
    .ok()
    .filter(|p| *p <= MAX_PRECISION)
    .ok_or(PortfolioError::InvalidPrecision {
      precision,
      max: MAX_PRECISION,
    })
}

/// Best portfolio of one risk bucket.
#[derive(Debug)]
pub struct FrontierPoint<'a, P> {
  pub risk_bucket: f64,
  pub portfolio: &'a P,
}

/// Frontier borrowed from the population it was selected from, ordered by
/// ascending risk bucket.
#[derive(Debug)]
pub struct EfficientFrontier<'a, P> {
  precision: u32,
  points: Vec<FrontierPoint<'a, P>>,
}

impl<'a, P> EfficientFrontier<'a, P> {
  pub(crate) fn empty(precision: u32) -> Self {
    Self {
      precision,
      points: Vec::new(),
    }
  }

  pub fn precision(&self) -> u32 {
    self.precision
  }

  pub fn points(&self) -> &[FrontierPoint<'a, P>] {
    &self.points
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  pub fn portfolios(&self) -> impl Iterator<Item = &'a P> + '_ {
    self.points.iter().map(|point| point.portfolio)
  }
}

/// Keep, per risk bucket, the portfolio with strictly greatest expected return.
///
/// Ties keep the first portfolio encountered. Sampled populations arrive in
/// random order, so which of two equal-return portfolios survives is not
/// stable across runs.
pub fn calculate_efficient_frontier<P: PortfolioExt>(
  population: &[P],
  precision: i32,
) -> Result<EfficientFrontier<'_, P>, PortfolioError> {
  let precision = validate_precision(precision)?;
  let mut buckets: BTreeMap<OrderedFloat<f64>, &P> = BTreeMap::new();

  for portfolio in population {
    let bucket = OrderedFloat(round_to_precision(portfolio.risk(), precision)?);
    match buckets.entry(bucket) {
      Entry::Vacant(slot) => {
        slot.insert(portfolio);
      }
      Entry::Occupied(mut slot) => {
        if portfolio.expected_return() > slot.get().expected_return() {
          slot.insert(portfolio);
        }
      }
    }
  }

  let mut frontier = EfficientFrontier::empty(precision);
  frontier.points = buckets
    .into_iter()
    .map(|(bucket, portfolio)| FrontierPoint {
      risk_bucket: bucket.into_inner(),
      portfolio,
    })
    .collect();
  Ok(frontier)
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use approx::assert_relative_eq;

  use super::*;

  #[derive(Debug, Clone, Copy, PartialEq)]
  struct Point {
    risk: f64,
    ret: f64,
  }

  impl PortfolioExt for Point {
    fn expected_return(&self) -> f64 {
      self.ret
    }

    fn risk(&self) -> f64 {
      self.risk
    }
  }

  fn p(risk: f64, ret: f64) -> Point {
    Point { risk, ret }
  }

  #[test]
  fn rounds_half_up() {
    assert_relative_eq!(round_to_precision(1.004, 2).unwrap(), 1.0);
    assert_relative_eq!(round_to_precision(1.006, 2).unwrap(), 1.01);
    assert_relative_eq!(round_to_precision(0.25, 1).unwrap(), 0.3);
    assert_relative_eq!(round_to_precision(2.5, 0).unwrap(), 3.0);
  }

  #[test]
  fn keeps_max_return_per_bucket() {
    let population = vec![p(1.04, 5.0), p(1.01, 7.0)];

    let frontier = calculate_efficient_frontier(&population, 1).unwrap();

    assert_eq!(frontier.len(), 1);
    assert_eq!(frontier.points()[0].portfolio, &p(1.01, 7.0));
    assert_relative_eq!(frontier.points()[0].risk_bucket, 1.0);
  }

  #[test]
  fn close_risks_share_a_bucket_at_two_digits() {
    let population = vec![p(1.004, 5.0), p(1.001, 7.0), p(1.006, 3.0)];

    let frontier = calculate_efficient_frontier(&population, 2).unwrap();
    let kept: Vec<_> = frontier.portfolios().copied().collect();

    assert_eq!(kept, vec![p(1.001, 7.0), p(1.006, 3.0)]);
  }

  #[test]
  fn ties_keep_first_encountered() {
    let first = p(0.51, 2.0);
    let second = p(0.49, 2.0);
    let population = vec![first, second];

    let frontier = calculate_efficient_frontier(&population, 1).unwrap();

    assert_eq!(frontier.len(), 1);
    assert!(std::ptr::eq(frontier.points()[0].portfolio, &population[0]));
  }

  #[test]
  fn buckets_are_unique_and_ordered() {
    let population: Vec<Point> = (0..200)
      .map(|i| {
        let x = i as f64;
        p((x * 0.37).sin().abs(), (x * 1.3).cos())
      })
      .collect();

    let frontier = calculate_efficient_frontier(&population, 2).unwrap();
    let buckets: Vec<f64> = frontier.points().iter().map(|pt| pt.risk_bucket).collect();

    let unique: HashSet<u64> = buckets.iter().map(|b| b.to_bits()).collect();
    assert_eq!(unique.len(), buckets.len());
    assert!(buckets.windows(2).all(|w| w[0] < w[1]));
  }

  #[test]
  fn selection_is_idempotent() {
    let population: Vec<Point> = (0..300)
      .map(|i| {
        let x = i as f64;
        p((x * 0.11).sin().abs() * 3.0, (x * 0.7).cos() * 10.0)
      })
      .collect();

    let once = calculate_efficient_frontier(&population, 1).unwrap();
    let kept: Vec<&Point> = once.portfolios().collect();
    let twice = calculate_efficient_frontier(&kept, 1).unwrap();

    let a: Vec<Point> = once.portfolios().copied().collect();
    let b: Vec<Point> = twice.portfolios().map(|pt| **pt).collect();
    assert_eq!(a, b);
  }

  #[test]
  fn empty_population_gives_empty_frontier() {
    let population: Vec<Point> = Vec::new();
    let frontier = calculate_efficient_frontier(&population, 3).unwrap();

    assert!(frontier.is_empty());
    assert_eq!(frontier.precision(), 3);
  }

  #[test]
  fn invalid_precision_is_rejected() {
    let population = vec![p(1.0, 1.0)];

    assert!(matches!(
      calculate_efficient_frontier(&population, -1),
      Err(PortfolioError::InvalidPrecision { precision: -1, .. })
    ));
    assert!(calculate_efficient_frontier(&population, 16).is_err());
    assert!(calculate_efficient_frontier(&population, 15).is_ok());
  }
}
