//! # Portfolio Engine
//!
//! $$
//! \{(\mathbf w_k, \mathbb E[R_k], \sigma_k)\}_{k=1}^{m} \mapsto F_{\text{precision}}
//! $$
//!
//! Binds a fixed security set for one calculation window, drives sampling and
//! frontier selection, and owns the accumulated population.

use std::collections::HashSet;
use std::time::Duration;
use std::time::Instant;

use ndarray::Array1;
use rand::Rng;
use tracing::info;
use tracing::warn;

use super::data::expected_returns;
use super::data::CovarianceMatrix;
use super::error::PortfolioError;
use super::frontier::calculate_efficient_frontier;
use super::frontier::EfficientFrontier;
use super::sampler::PortfolioSampler;
use super::types::CalculationWindow;
use super::types::Portfolio;
use super::types::Security;
use crate::traits::SecuritiesProvider;

/// Runtime configuration for [`PortfolioCalculator`].
#[derive(Clone, Debug)]
pub struct PortfolioCalculatorConfig {
  /// Spread draws over the rayon pool.
  pub parallel: bool,
  /// Independent RNG streams used when `parallel` is set. Fixed independently
  /// of the pool size so that seeded runs reproduce.
  pub chunks: usize,
  /// Stop drawing once this much wall time has passed within one call.
  pub time_budget: Option<Duration>,
}

impl Default for PortfolioCalculatorConfig {
  fn default() -> Self {
    Self {
      parallel: false,
      chunks: 8,
      time_budget: None,
    }
  }
}

/// Lifecycle of a calculator after construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalculatorState {
  /// Securities bound, no portfolios generated.
  Ready,
  /// At least one portfolio in the population.
  Populated,
}

/// Outcome of one [`PortfolioCalculator::generate_portfolios`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationSummary {
  pub requested: usize,
  pub generated: usize,
  /// The time budget ran out before `requested` draws completed.
  pub timed_out: bool,
}

#[derive(Debug)]
struct WindowModel {
  expected_returns: Array1<f64>,
  covariance: CovarianceMatrix,
}

impl WindowModel {
  fn estimate(securities: &[Security]) -> Result<Self, PortfolioError> {
    Ok(Self {
      expected_returns: expected_returns(securities)?,
      covariance: CovarianceMatrix::estimate(securities)?,
    })
  }
}

/// Monte Carlo portfolio calculator over one evaluation window.
#[derive(Debug)]
pub struct PortfolioCalculator {
  config: PortfolioCalculatorConfig,
  securities: Vec<Security>,
  window: Option<CalculationWindow>,
  model: Option<WindowModel>,
  portfolios: Vec<Portfolio>,
}

impl PortfolioCalculator {
  /// Bind `securities` (histories already loaded). Identifiers must be unique.
  pub fn new(
    securities: Vec<Security>,
    config: PortfolioCalculatorConfig,
  ) -> Result<Self, PortfolioError> {
    if securities.is_empty() {
      return Err(PortfolioError::EmptyUniverse);
    }
    ensure_unique(securities.iter().map(Security::id))?;

    Ok(Self {
      config,
      securities,
      window: None,
      model: None,
      portfolios: Vec::new(),
    })
  }

  /// Resolve `ids` through `provider`, loading each history for `window`.
  pub fn from_provider<P, S>(
    provider: &P,
    ids: &[S],
    window: CalculationWindow,
    config: PortfolioCalculatorConfig,
  ) -> Result<Self, PortfolioError>
  where
    P: SecuritiesProvider + ?Sized,
    S: AsRef<str>,
  {
    ensure_unique(ids.iter().map(|id| id.as_ref()))?;

    let securities = ids
      .iter()
      .map(|id| {
        let id = id.as_ref();
        provider
          .load_security(id, &window)
          .map_err(|err| PortfolioError::Provider {
            id: id.to_string(),
            reason: format!("{err:#}"),
          })
      })
      .collect::<Result<Vec<_>, _>>()?;

    let mut calculator = Self::new(securities, config)?;
    calculator.window = Some(window);
    Ok(calculator)
  }

  pub fn config(&self) -> &PortfolioCalculatorConfig {
    &self.config
  }

  pub fn securities(&self) -> &[Security] {
    &self.securities
  }

  /// Window the histories were loaded for, when built through a provider.
  pub fn window(&self) -> Option<&CalculationWindow> {
    self.window.as_ref()
  }

  pub fn state(&self) -> CalculatorState {
    if self.portfolios.is_empty() {
      CalculatorState::Ready
    } else {
      CalculatorState::Populated
    }
  }

  /// Covariance matrix of the window, once the first batch has estimated it.
  pub fn covariance_matrix(&self) -> Option<&CovarianceMatrix> {
    self.model.as_ref().map(|m| &m.covariance)
  }

  /// Draw `amount` random portfolios and append them to the population.
  ///
  /// The expected-return vector and covariance matrix are estimated on the
  /// first call and reused by every later draw in this window.
  pub fn generate_portfolios<R: Rng + ?Sized>(
    &mut self,
    amount: usize,
    rng: &mut R,
  ) -> Result<GenerationSummary, PortfolioError> {
    if amount == 0 {
      return Err(PortfolioError::InvalidAmount(amount));
    }

    let model = match &mut self.model {
      Some(model) => model,
      slot @ None => slot.insert(WindowModel::estimate(&self.securities)?),
    };

    let deadline = self
      .config
      .time_budget
      .and_then(|budget| Instant::now().checked_add(budget));
    let sampler = PortfolioSampler::new(&model.expected_returns, &model.covariance);

    let batch = if self.config.parallel {
      sampler.sample_par(amount, self.config.chunks, rng, deadline)?
    } else {
      sampler.sample(amount, rng, deadline)?
    };

    let summary = GenerationSummary {
      requested: amount,
      generated: batch.len(),
      timed_out: batch.len() < amount,
    };
    self.portfolios.extend(batch);

    if summary.timed_out {
      warn!(
        requested = summary.requested,
        generated = summary.generated,
        "time budget exhausted before all portfolios were drawn"
      );
    }
    info!(
      generated = summary.generated,
      population = self.portfolios.len(),
      parallel = self.config.parallel,
      "portfolios generated"
    );

    Ok(summary)
  }

  /// Read-only view of the accumulated population.
  pub fn portfolios(&self) -> &[Portfolio] {
    &self.portfolios
  }

  /// Drop the population. The window's covariance estimate is kept.
  pub fn clear_portfolios(&mut self) {
    self.portfolios.clear();
  }

  pub fn calculate_efficient_frontier(
    &self,
    precision: i32,
  ) -> Result<EfficientFrontier<'_, Portfolio>, PortfolioError> {
    calculate_efficient_frontier(&self.portfolios, precision)
  }
}

fn ensure_unique<'a>(ids: impl Iterator<Item = &'a str>) -> Result<(), PortfolioError> {
  let mut seen = HashSet::new();
  for id in ids {
    if !seen.insert(id) {
      return Err(PortfolioError::DuplicateSecurity(id.to_string()));
    }
  }
  Ok(())
}
