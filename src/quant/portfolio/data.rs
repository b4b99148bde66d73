//! # Portfolio Data Utilities
//!
//! $$
//! \operatorname{cov}(a,b)=\frac{1}{n-1}\sum_{t\in T_a\cap T_b}(a_t-\bar a)(b_t-\bar b)
//! $$
//!
//! Expected return and pairwise covariance of raw closing prices, aligned on
//! the trading days two securities share.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use ndarray::Array1;
use ndarray::Array2;
use rayon::prelude::*;
use tracing::debug;

use super::error::PortfolioError;
use super::types::Security;

fn sample_mean(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    0.0
  } else {
    xs.iter().sum::<f64>() / xs.len() as f64
  }
}

/// Unbiased sample covariance of two equally long series (n >= 2).
fn sample_covariance(x: &[f64], y: &[f64]) -> f64 {
  let mx = sample_mean(x);
  let my = sample_mean(y);

  let mut acc = 0.0;
  for (xi, yi) in x.iter().zip(y) {
    acc += (xi - mx) * (yi - my);
  }

  acc / (x.len() - 1) as f64
}

/// Present closes keyed by trade date.
struct PriceSeries<'a> {
  id: &'a str,
  closes: BTreeMap<NaiveDate, f64>,
}

impl<'a> PriceSeries<'a> {
  /// Absent closes are skipped; of several valid closes on one date the last
  /// one wins.
  fn from_security(security: &'a Security) -> Result<Self, PortfolioError> {
    let mut closes = BTreeMap::new();
    for obs in security.history() {
      let Some(close) = obs.close else {
        continue;
      };
      if !close.is_finite() {
        return Err(PortfolioError::InvalidPrice {
          id: security.id().to_string(),
          date: obs.date,
        });
      }
      closes.insert(obs.date, close);
    }

    Ok(Self {
      id: security.id(),
      closes,
    })
  }

  fn covariance(&self, other: &PriceSeries<'_>) -> Result<f64, PortfolioError> {
    // BTreeMap iteration keeps both sides in date order, so cov(a, b) and
    // cov(b, a) accumulate identical products in identical order.
    let (xs, ys): (Vec<f64>, Vec<f64>) = self
      .closes
      .iter()
      .filter_map(|(date, x)| other.closes.get(date).map(|y| (*x, *y)))
      .unzip();

    match xs.len() {
      0 => Err(PortfolioError::NoCommonTradingDays {
        a: self.id.to_string(),
        b: other.id.to_string(),
      }),
      1 => Err(PortfolioError::InsufficientObservations {
        a: self.id.to_string(),
        b: other.id.to_string(),
        found: 1,
      }),
      _ => {
        let cov = sample_covariance(&xs, &ys);
        if cov.is_finite() {
          Ok(cov)
        } else {
          Err(PortfolioError::NonFinite("covariance"))
        }
      }
    }
  }
}

/// Arithmetic mean of every present close in the loaded history.
///
/// A history without a single present close yields `0.0`.
pub fn expected_return(security: &Security) -> Result<f64, PortfolioError> {
  let mut sum = 0.0;
  let mut count = 0usize;
  for obs in security.history() {
    let Some(close) = obs.close else {
      continue;
    };
    if !close.is_finite() {
      return Err(PortfolioError::InvalidPrice {
        id: security.id().to_string(),
        date: obs.date,
      });
    }
    sum += close;
    count += 1;
  }

  if count == 0 {
    return Ok(0.0);
  }

  let mean = sum / count as f64;
  if mean.is_finite() {
    Ok(mean)
  } else {
    Err(PortfolioError::NonFinite("expected return"))
  }
}

/// Sample covariance of closing prices over the dates both securities traded.
pub fn covariance(a: &Security, b: &Security) -> Result<f64, PortfolioError> {
  let a = PriceSeries::from_security(a)?;
  let b = PriceSeries::from_security(b)?;
  a.covariance(&b)
}

pub fn variance(a: &Security) -> Result<f64, PortfolioError> {
  covariance(a, a)
}

pub fn standard_deviation(a: &Security) -> Result<f64, PortfolioError> {
  Ok(variance(a)?.max(0.0).sqrt())
}

/// Symmetric covariance matrix of a fixed, ordered security set.
///
/// Built once per calculation window and never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct CovarianceMatrix {
  ids: Arc<[String]>,
  values: Array2<f64>,
}

impl CovarianceMatrix {
  /// Estimate every pair of `securities`. Any failing pair fails the whole
  /// matrix, a missing entry would corrupt every downstream risk figure.
  pub fn estimate(securities: &[Security]) -> Result<Self, PortfolioError> {
    let series = securities
      .iter()
      .map(PriceSeries::from_security)
      .collect::<Result<Vec<_>, _>>()?;
    let n = series.len();

    let pairs: Vec<(usize, usize)> = (0..n)
      .flat_map(|i| (i..n).map(move |j| (i, j)))
      .collect();

    let entries = pairs
      .par_iter()
      .map(|&(i, j)| series[i].covariance(&series[j]).map(|c| (i, j, c)))
      .collect::<Result<Vec<_>, _>>()?;

    let mut values = Array2::<f64>::zeros((n, n));
    for (i, j, c) in entries {
      values[[i, j]] = c;
      values[[j, i]] = c;
    }

    debug!(securities = n, pairs = pairs.len(), "covariance matrix estimated");

    Ok(Self {
      ids: securities.iter().map(|s| s.id().to_string()).collect(),
      values,
    })
  }

  pub fn ids(&self) -> &Arc<[String]> {
    &self.ids
  }

  pub fn dim(&self) -> usize {
    self.ids.len()
  }

  pub fn values(&self) -> &Array2<f64> {
    &self.values
  }

  pub fn get(&self, i: usize, j: usize) -> f64 {
    self.values[[i, j]]
  }

  /// `w^T Σ w`, unclamped.
  pub fn quadratic_form(&self, weights: &Array1<f64>) -> f64 {
    weights.dot(&self.values.dot(weights))
  }
}

/// Expected return of every security, in input order.
pub fn expected_returns(securities: &[Security]) -> Result<Array1<f64>, PortfolioError> {
  securities
    .iter()
    .map(expected_return)
    .collect::<Result<Vec<_>, _>>()
    .map(Array1::from)
}
