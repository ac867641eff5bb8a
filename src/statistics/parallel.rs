//! Parallel multi-axis reductions over fields
//!
//! The reduced axes are moved to the end of the array so that every output
//! cell owns one contiguous run of samples; rayon then reduces the runs
//! independently.

use super::operations::StatOperation;
use crate::errors::Result;
use crate::field::Field;
use ndarray::{ArrayD, IxDyn};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Split an array into `(kept_axes, reduced_axes)` and return its values
/// laid out with the reduced axes innermost
pub(crate) fn values_with_axes_last(data: &ArrayD<f64>, reduced_axes: &[usize]) -> (Vec<usize>, Vec<f64>) {
    let kept_axes: Vec<usize> = (0..data.ndim()).filter(|a| !reduced_axes.contains(a)).collect();
    let mut order = kept_axes.clone();
    order.extend_from_slice(reduced_axes);
    let values = data.view().permuted_axes(order).iter().copied().collect();
    (kept_axes, values)
}

/// Reduce `field` over all of `dims` at once
///
/// Attributes are kept and the reduction is appended to `cell_methods`
/// (e.g. `time: lon: mean`). Coordinates of surviving dimensions are kept,
/// and repeated dimension names are reduced once.
///
/// # Errors
///
/// Returns an error if a dimension is not on the field.
pub fn reduce_over(field: &Field, dims: &[&str], operation: StatOperation) -> Result<Field> {
    let mut reduced_axes = Vec::with_capacity(dims.len());
    let mut method = String::new();
    for dim in dims {
        let axis = field.axis_of(dim)?;
        if !reduced_axes.contains(&axis) {
            reduced_axes.push(axis);
            method.push_str(&format!("{dim}: "));
        }
    }
    method.push_str(operation.as_str());

    let shape = field.shape();
    let run_len: usize = reduced_axes.iter().map(|&a| shape[a]).product();
    let (kept_axes, values) = values_with_axes_last(&field.data, &reduced_axes);
    let kept_shape: Vec<usize> = kept_axes.iter().map(|&a| shape[a]).collect();
    let output_len: usize = kept_shape.iter().product();

    let reduced: Vec<f64> = if run_len == 0 {
        vec![f64::NAN; output_len]
    } else {
        values
            .par_chunks(run_len)
            .map(|run| operation.apply(run))
            .collect()
    };

    let kept_dims: Vec<String> = kept_axes.iter().map(|&a| field.dims[a].clone()).collect();
    let coords: BTreeMap<_, _> = field
        .coords
        .iter()
        .filter(|(dim, _)| kept_dims.contains(*dim))
        .map(|(dim, coord)| (dim.clone(), coord.clone()))
        .collect();

    let mut attrs = field.attrs.clone();
    let cell_methods = match attrs.get("cell_methods") {
        Some(previous) => format!("{previous} {method}"),
        None => method,
    };
    attrs.insert("cell_methods".to_string(), cell_methods);

    Ok(Field {
        name: field.name.clone(),
        dims: kept_dims,
        data: ArrayD::from_shape_vec(IxDyn(&kept_shape), reduced)?,
        attrs,
        coords,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Coordinate;
    use ndarray::Array3;

    fn cube() -> Field {
        // (time=2, lev=3, lon=4), value = 100*t + 10*l + x
        let data = Array3::from_shape_fn((2, 3, 4), |(t, l, x)| (100 * t + 10 * l + x) as f64);
        Field::new("tem", vec!["time".into(), "lev".into(), "lon".into()], data.into_dyn())
            .unwrap()
            .with_attr("units", "K")
            .with_coord(Coordinate::new("lev", vec![10.0, 20.0, 30.0]))
            .unwrap()
    }

    #[test]
    fn reduces_non_adjacent_axes() {
        let mean = reduce_over(&cube(), &["time", "lon"], StatOperation::Mean).unwrap();
        assert_eq!(mean.dims, vec!["lev"]);
        assert_eq!(mean.shape(), &[3]);
        // mean over t of 100t is 50, mean over x of 0..4 is 1.5
        assert!((mean.data[[1]] - 61.5).abs() < 1e-12);
        assert_eq!(mean.units(), Some("K"));
        assert_eq!(mean.attrs["cell_methods"], "time: lon: mean");
        assert!(mean.coord("lev").is_some());
    }

    #[test]
    fn cell_methods_accumulate() {
        let std = reduce_over(&cube(), &["time", "time"], StatOperation::Std).unwrap();
        assert_eq!(std.attrs["cell_methods"], "time: std");
        let mean = reduce_over(&std, &["lon"], StatOperation::Mean).unwrap();
        assert_eq!(mean.attrs["cell_methods"], "time: std lon: mean");
    }

    #[test]
    fn reducing_everything_gives_a_scalar() {
        let mean = reduce_over(&cube(), &["time", "lev", "lon"], StatOperation::Mean).unwrap();
        assert_eq!(mean.ndim(), 0);
        assert!(mean.coords.is_empty());
    }

    #[test]
    fn unknown_dimension_is_an_error() {
        assert!(reduce_over(&cube(), &["lat"], StatOperation::Std).is_err());
    }
}
