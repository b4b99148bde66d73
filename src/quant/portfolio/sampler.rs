//! # Portfolio Sampler
//!
//! $$
//! w_i = \frac{u_i}{\sum_j u_j},\quad u_i \sim \mathcal U[0,1)
//! $$
//!
//! Random long-only weight draws evaluated against a frozen covariance matrix.

use std::time::Instant;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rayon::prelude::*;

use super::data::CovarianceMatrix;
use super::error::PortfolioError;
use super::types::Portfolio;
use super::types::WeightVector;

const MAX_RESAMPLES: usize = 64;
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Draws portfolios from immutable per-window inputs.
///
/// Holds only shared references, so one sampler can serve any number of
/// parallel workers.
#[derive(Clone, Copy, Debug)]
pub struct PortfolioSampler<'a> {
  expected_returns: &'a Array1<f64>,
  covariance: &'a CovarianceMatrix,
}

impl<'a> PortfolioSampler<'a> {
  pub fn new(expected_returns: &'a Array1<f64>, covariance: &'a CovarianceMatrix) -> Self {
    debug_assert_eq!(expected_returns.len(), covariance.dim());
    Self {
      expected_returns,
      covariance,
    }
  }

  fn sample_weights<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Array1<f64>, PortfolioError> {
    let n = self.covariance.dim();
    for _ in 0..MAX_RESAMPLES {
      let raw = Array1::from_shape_fn(n, |_| rng.random::<f64>());
      let sum = raw.sum();
      if sum > 0.0 && sum.is_finite() {
        return Ok(raw / sum);
      }
    }
    Err(PortfolioError::DegenerateWeights(MAX_RESAMPLES))
  }

  /// Evaluate fixed weights aligned with the matrix order. Weights must lie in
  /// `[0, 1]` and sum to 1 within `1e-9`.
  pub fn evaluate(&self, weights: Array1<f64>) -> Result<Portfolio, PortfolioError> {
    let expected = self.covariance.dim();
    if weights.len() != expected {
      return Err(PortfolioError::WeightLengthMismatch {
        expected,
        found: weights.len(),
      });
    }
    let sum = weights.sum();
    let in_range = weights.iter().all(|w| (0.0..=1.0).contains(w));
    let normalized = (sum - 1.0).abs() <= WEIGHT_SUM_TOLERANCE;
    if !in_range || !normalized {
      return Err(PortfolioError::InvalidWeights { sum });
    }

    let expected_return = weights.dot(self.expected_returns);
    let variance = self.covariance.quadratic_form(&weights);
    if !variance.is_finite() {
      return Err(PortfolioError::NonFinite("portfolio variance"));
    }
    // round-off can leave a tiny negative variance for near-singular matrices
    let risk = variance.max(0.0).sqrt();

    Portfolio::new(
      WeightVector::new(self.covariance.ids().clone(), weights.to_vec()),
      expected_return,
      risk,
    )
  }

  /// One Monte Carlo draw.
  pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Portfolio, PortfolioError> {
    let weights = self.sample_weights(rng)?;
    self.evaluate(weights)
  }

  /// Sequential draws, stopping early once `deadline` has passed.
  pub fn sample<R: Rng + ?Sized>(
    &self,
    amount: usize,
    rng: &mut R,
    deadline: Option<Instant>,
  ) -> Result<Vec<Portfolio>, PortfolioError> {
    let mut out = Vec::with_capacity(amount);
    for _ in 0..amount {
      if deadline.is_some_and(|d| Instant::now() >= d) {
        break;
      }
      out.push(self.draw(rng)?);
    }
    Ok(out)
  }

  /// Parallel draws over `chunks` independent streams seeded from `rng`.
  ///
  /// Each worker fills its own partial population; the partials are
  /// concatenated in chunk order, so a seeded `rng` reproduces the same
  /// population regardless of the thread pool size.
  pub fn sample_par<R: Rng + ?Sized>(
    &self,
    amount: usize,
    chunks: usize,
    rng: &mut R,
    deadline: Option<Instant>,
  ) -> Result<Vec<Portfolio>, PortfolioError> {
    let chunks = chunks.clamp(1, amount.max(1));
    let base = amount / chunks;
    let extra = amount % chunks;

    let plan: Vec<(usize, u64)> = (0..chunks)
      .map(|i| (base + usize::from(i < extra), rng.random::<u64>()))
      .collect();

    let partials = plan
      .into_par_iter()
      .map(|(len, seed)| {
        let mut worker_rng = StdRng::seed_from_u64(seed);
        self.sample(len, &mut worker_rng, deadline)
      })
      .collect::<Result<Vec<_>, _>>()?;

    Ok(partials.into_iter().flatten().collect())
  }
}
