//! # Quant
//!
//! $$
//! \mathbb E[R_p] = \mathbf{w}^\top \boldsymbol\mu
//! $$
//!
pub mod portfolio;
