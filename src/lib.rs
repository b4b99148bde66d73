//! # frontier-rs
//!
//! $$
//! \sigma_p = \sqrt{\mathbf{w}^\top \Sigma \mathbf{w}}
//! $$
//!
//! Monte Carlo portfolio sampling over daily price histories and approximate
//! efficient frontier extraction.
//!
//! The core performs no I/O: securities arrive with their histories already
//! loaded, either directly or through a [`traits::SecuritiesProvider`].

pub mod quant;
pub mod traits;

pub use quant::portfolio::CalculatorState;
pub use quant::portfolio::EfficientFrontier;
pub use quant::portfolio::GenerationSummary;
pub use quant::portfolio::Portfolio;
pub use quant::portfolio::PortfolioCalculator;
pub use quant::portfolio::PortfolioCalculatorConfig;
pub use quant::portfolio::PortfolioError;
pub use quant::portfolio::Security;
