use chrono::NaiveDate;
use thiserror::Error;

/// Failures raised by covariance estimation, sampling and frontier selection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
  #[error("security `{0}` appears more than once in the calculation set")]
  DuplicateSecurity(String),

  #[error("a portfolio calculator needs at least one security")]
  EmptyUniverse,

  #[error("securities `{a}` and `{b}` share no trading days")]
  NoCommonTradingDays { a: String, b: String },

  #[error("securities `{a}` and `{b}` share {found} trading day(s), at least 2 are required")]
  InsufficientObservations { a: String, b: String, found: usize },

  #[error("portfolio amount must be positive, got {0}")]
  InvalidAmount(usize),

  #[error("frontier precision must be within 0..={max}, got {precision}")]
  InvalidPrecision { precision: i32, max: u32 },

  #[error("security `{id}` has a non-finite close on {date}")]
  InvalidPrice { id: String, date: NaiveDate },

  #[error("non-finite value produced while computing {0}")]
  NonFinite(&'static str),

  #[error("expected {expected} weights, got {found}")]
  WeightLengthMismatch { expected: usize, found: usize },

  #[error("weights must lie in [0, 1] and sum to 1, got sum {sum}")]
  InvalidWeights { sum: f64 },

  #[error("random weights summed to zero after {0} attempts")]
  DegenerateWeights(usize),

  #[error("calculation window starts on {start} after it ends on {end}")]
  InvalidWindow { start: NaiveDate, end: NaiveDate },

  #[error("failed to load security `{id}`: {reason}")]
  Provider { id: String, reason: String },
}
