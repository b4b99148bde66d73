//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Covariance estimation, Monte Carlo weight sampling and efficient frontier
//! selection over a fixed set of securities.

pub mod data;
pub mod engine;
pub mod error;
pub mod frontier;
pub mod provider;
pub mod sampler;
pub mod types;

pub use data::covariance;
pub use data::expected_return;
pub use data::expected_returns;
pub use data::standard_deviation;
pub use data::variance;
pub use data::CovarianceMatrix;
pub use engine::CalculatorState;
pub use engine::GenerationSummary;
pub use engine::PortfolioCalculator;
pub use engine::PortfolioCalculatorConfig;
pub use error::PortfolioError;
pub use frontier::calculate_efficient_frontier;
pub use frontier::round_to_precision;
pub use frontier::EfficientFrontier;
pub use frontier::FrontierPoint;
pub use frontier::MAX_PRECISION;
pub use provider::CsvPriceProvider;
pub use sampler::PortfolioSampler;
pub use types::CalculationWindow;
pub use types::Portfolio;
pub use types::PriceObservation;
pub use types::Security;
pub use types::WeightVector;
