//! # Portfolio Types
//!
//! $$
//! \sum_i w_i = 1,\quad w_i \in [0, 1]
//! $$
//!
//! Securities with their loaded price history, weight vectors and the
//! immutable portfolio records produced by the sampler.

use std::sync::Arc;

use chrono::NaiveDate;
use impl_new_derive::ImplNew;

use super::error::PortfolioError;
use crate::traits::PortfolioExt;

/// A single dated close. `close` is `None` when the venue reported no close.
#[derive(ImplNew, Clone, Copy, Debug, PartialEq)]
pub struct PriceObservation {
  pub date: NaiveDate,
  pub close: Option<f64>,
}

/// A tradable security with the history loaded for the current window.
#[derive(Clone, Debug, PartialEq)]
pub struct Security {
  id: String,
  name: String,
  history: Vec<PriceObservation>,
}

impl Security {
  pub fn new(
    id: impl Into<String>,
    name: impl Into<String>,
    history: Vec<PriceObservation>,
  ) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
      history,
    }
  }

  /// Stable identifier (exchange ticker / secid).
  pub fn id(&self) -> &str {
    &self.id
  }

  /// Display name.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Observations in the order the provider loaded them.
  pub fn history(&self) -> &[PriceObservation] {
    &self.history
  }
}

/// Inclusive date range a provider uses to populate histories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalculationWindow {
  start: NaiveDate,
  end: NaiveDate,
}

impl CalculationWindow {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PortfolioError> {
    if start > end {
      return Err(PortfolioError::InvalidWindow { start, end });
    }
    Ok(Self { start, end })
  }

  pub fn start(&self) -> NaiveDate {
    self.start
  }

  pub fn end(&self) -> NaiveDate {
    self.end
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start <= date && date <= self.end
  }
}

/// Weights keyed by security identifier.
///
/// The identifier list is shared by every portfolio drawn in one window, so a
/// population of millions of draws stores only one `f64` per security each.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightVector {
  ids: Arc<[String]>,
  weights: Vec<f64>,
}

impl WeightVector {
  /// `ids` and `weights` must have equal length; identifiers are unique by
  /// construction of the calculator that owns them.
  pub(crate) fn new(ids: Arc<[String]>, weights: Vec<f64>) -> Self {
    debug_assert_eq!(ids.len(), weights.len());
    Self { ids, weights }
  }

  pub fn len(&self) -> usize {
    self.weights.len()
  }

  pub fn is_empty(&self) -> bool {
    self.weights.is_empty()
  }

  /// Weight of `id`, if the security is part of the vector.
  pub fn get(&self, id: &str) -> Option<f64> {
    self
      .ids
      .iter()
      .position(|candidate| candidate == id)
      .map(|i| self.weights[i])
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
    self
      .ids
      .iter()
      .map(String::as_str)
      .zip(self.weights.iter().copied())
  }

  /// Raw weights in security order.
  pub fn as_slice(&self) -> &[f64] {
    &self.weights
  }

  pub fn sum(&self) -> f64 {
    self.weights.iter().sum()
  }
}

/// One sampled portfolio. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Portfolio {
  weights: WeightVector,
  expected_return: f64,
  risk: f64,
}

impl Portfolio {
  /// Build a portfolio record, rejecting a negative or non-finite risk and a
  /// non-finite return.
  pub fn new(weights: WeightVector, expected_return: f64, risk: f64) -> Result<Self, PortfolioError> {
    if !expected_return.is_finite() {
      return Err(PortfolioError::NonFinite("portfolio expected return"));
    }
    if !risk.is_finite() || risk < 0.0 {
      return Err(PortfolioError::NonFinite("portfolio risk"));
    }
    Ok(Self {
      weights,
      expected_return,
      risk,
    })
  }

  pub fn weights(&self) -> &WeightVector {
    &self.weights
  }

  pub fn weight(&self, id: &str) -> Option<f64> {
    self.weights.get(id)
  }

  pub fn expected_return(&self) -> f64 {
    self.expected_return
  }

  /// Standard deviation of the portfolio under the window's covariance matrix.
  pub fn risk(&self) -> f64 {
    self.risk
  }
}

impl PortfolioExt for Portfolio {
  fn expected_return(&self) -> f64 {
    self.expected_return
  }

  fn risk(&self) -> f64 {
    self.risk
  }
}
