//! Grid-cell significance between two composites
//!
//! The Welch test runs along the ensemble axis independently at every
//! combination of the remaining coordinates. Raw p-values are reported; no
//! multiple-comparison correction is applied.

use super::parallel::values_with_axes_last;
use super::welch::welch_t_test;
use crate::errors::{EnsoError, Result};
use crate::field::{Attributes, Field};
use ndarray::{ArrayD, IxDyn};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Dims and lengths of `field` without `ensemble_dim`, plus the ensemble size
fn grid_without(field: &Field, ensemble_dim: &str) -> Result<(Vec<(String, usize)>, usize)> {
    let members = field.dim_len(ensemble_dim)?;
    let grid = field
        .sizes()
        .into_iter()
        .filter(|(dim, _)| dim != ensemble_dim)
        .collect();
    Ok((grid, members))
}

/// p-value field of Welch's t-test between composites `a` and `b`
///
/// Both fields must carry `ensemble_dim` (their member counts may differ)
/// and agree on every other dimension, in order. The result has those other
/// dimensions and the coordinates of `a`.
///
/// # Errors
///
/// Returns an error if either field lacks the ensemble dimension or their
/// remaining grids differ.
pub fn welch_pvalues(a: &Field, b: &Field, ensemble_dim: &str) -> Result<Field> {
    let (grid, members_a) = grid_without(a, ensemble_dim)?;
    let (grid_b, members_b) = grid_without(b, ensemble_dim)?;
    if grid != grid_b {
        return Err(EnsoError::DimensionMismatch {
            message: format!("cannot test {grid:?} against {grid_b:?}"),
        });
    }

    let (_, values_a) = values_with_axes_last(&a.data, &[a.axis_of(ensemble_dim)?]);
    let (_, values_b) = values_with_axes_last(&b.data, &[b.axis_of(ensemble_dim)?]);

    let cells: usize = grid.iter().map(|(_, len)| len).product();
    println!(
        "⚡ Running {cells} Welch tests ({members_a} vs {members_b} members) across {} threads",
        rayon::current_num_threads()
    );

    let p_values: Vec<f64> = (0..cells)
        .into_par_iter()
        .map(|cell| {
            let sample_a = &values_a[cell * members_a..(cell + 1) * members_a];
            let sample_b = &values_b[cell * members_b..(cell + 1) * members_b];
            welch_t_test(sample_a, sample_b).p_value
        })
        .collect();

    let (dims, shape): (Vec<String>, Vec<usize>) = grid.into_iter().unzip();
    let coords: BTreeMap<_, _> = a
        .coords
        .iter()
        .filter(|(dim, _)| dims.contains(*dim))
        .map(|(dim, coord)| (dim.clone(), coord.clone()))
        .collect();

    let mut attrs = Attributes::new();
    attrs.insert("long_name".to_string(), "Welch t-test p-value".to_string());
    attrs.insert("units".to_string(), "1".to_string());

    Ok(Field {
        name: "p_value".to_string(),
        dims,
        data: ArrayD::from_shape_vec(IxDyn(&shape), p_values)?,
        attrs,
        coords,
    })
}
