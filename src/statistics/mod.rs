//! Statistical reductions and significance testing
//!
//! # Organization
//!
//! - [`operations`]: the per-sample reductions (mean, standard deviation)
//! - [`parallel`]: multi-axis reductions of fields on the rayon pool
//! - [`reduction`]: composite mean/std in the two named modes
//! - [`welch`]: Welch's unequal-variance t-test
//! - [`significance`]: the grid-cell p-value field between two composites

pub mod operations;
pub mod parallel;
pub mod reduction;
pub mod significance;
pub mod welch;

pub use operations::StatOperation;
pub use parallel::reduce_over;
pub use reduction::{mean_std, ReductionMode};
pub use significance::welch_pvalues;
pub use welch::{welch_t_test, WelchResult};
