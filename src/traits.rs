//! # Traits
//!
//! $$
//! \text{Trait contracts: }\mathcal{P}:\text{ids}\times[t_0,t_1]\to\text{histories}
//! $$
//!
use anyhow::Result;

use crate::quant::portfolio::CalculationWindow;
use crate::quant::portfolio::Security;

/// Source of securities with their price history loaded for a window.
///
/// Implementations own any I/O (exchange APIs, files, caches). The calculator
/// only ever sees the returned, fully loaded [`Security`] values.
pub trait SecuritiesProvider {
  fn load_security(&self, id: &str, window: &CalculationWindow) -> Result<Security>;
}

/// Anything exposing a return and a risk figure can be reduced to a frontier.
pub trait PortfolioExt {
  fn expected_return(&self) -> f64;

  fn risk(&self) -> f64;
}

impl<T: PortfolioExt + ?Sized> PortfolioExt for &T {
  fn expected_return(&self) -> f64 {
    (**self).expected_return()
  }

  fn risk(&self) -> f64 {
    (**self).risk()
  }
}
