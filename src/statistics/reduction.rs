//! Composite mean and standard deviation
//!
//! Two standard-deviation semantics exist and are kept apart on purpose:
//! per-member spread over time and longitude, or spread that also pools the
//! ensemble members.

use super::operations::StatOperation;
use super::parallel::reduce_over;
use crate::errors::Result;
use crate::field::Field;

/// How the standard deviation treats the ensemble axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReductionMode {
    /// Mean and std both collapse only the collapse dims; std keeps one value
    /// per ensemble member
    #[default]
    PerMember,
    /// Std additionally collapses the ensemble axis
    EnsembleSpread,
}

impl ReductionMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerMember => "per-member",
            Self::EnsembleSpread => "ensemble-spread",
        }
    }
}

/// Mean and standard deviation of one composite
///
/// # Errors
///
/// Returns an error if any of `collapse_dims` (or `ensemble_dim` in
/// [`ReductionMode::EnsembleSpread`]) is not a dimension of `field`.
pub fn mean_std(
    field: &Field,
    collapse_dims: &[String],
    ensemble_dim: &str,
    mode: ReductionMode,
) -> Result<(Field, Field)> {
    let mut dims: Vec<&str> = collapse_dims.iter().map(String::as_str).collect();
    let mean = reduce_over(field, &dims, StatOperation::Mean)?;

    if mode == ReductionMode::EnsembleSpread {
        dims.push(ensemble_dim);
    }
    let std = reduce_over(field, &dims, StatOperation::Std)?;

    Ok((mean, std))
}
