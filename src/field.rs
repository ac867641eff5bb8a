//! Labeled multi-dimensional arrays
//!
//! A [`Field`] is an `ArrayD<f64>` whose axes carry names, optional 1-D
//! coordinate values, and a bag of string attributes (`units`, `long_name`).
//! Operations never mutate their input; reductions and arithmetic build new
//! fields.

use crate::errors::{EnsoError, Result};
use ndarray::{ArrayD, IxDyn};
use std::collections::BTreeMap;

/// String attributes attached to a field or coordinate
pub type Attributes = BTreeMap<String, String>;

/// 1-D coordinate values for one named dimension
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub name: String,
    pub values: Vec<f64>,
    pub attrs: Attributes,
}

impl Coordinate {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            attrs: Attributes::new(),
        }
    }

    #[must_use]
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.to_string(), value.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Human-readable axis label, `long_name [units]` when available
    pub fn label(&self) -> String {
        let name = self.attrs.get("long_name").unwrap_or(&self.name);
        match self.attrs.get("units") {
            Some(units) => format!("{name} [{units}]"),
            None => name.clone(),
        }
    }
}

/// A named array with named dimensions
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub dims: Vec<String>,
    pub data: ArrayD<f64>,
    pub attrs: Attributes,
    /// Coordinates keyed by the dimension they label
    pub coords: BTreeMap<String, Coordinate>,
}

impl Field {
    /// Create a field, checking that every axis has exactly one name
    pub fn new(name: impl Into<String>, dims: Vec<String>, data: ArrayD<f64>) -> Result<Self> {
        let name = name.into();
        if dims.len() != data.ndim() {
            return Err(EnsoError::DimensionMismatch {
                message: format!(
                    "field '{}' has {} dimension names for a {}-dimensional array",
                    name,
                    dims.len(),
                    data.ndim()
                ),
            });
        }
        Ok(Self {
            name,
            dims,
            data,
            attrs: Attributes::new(),
            coords: BTreeMap::new(),
        })
    }

    #[must_use]
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.to_string(), value.to_string());
        self
    }

    /// Attach a coordinate to the dimension of the same name
    pub fn with_coord(mut self, coord: Coordinate) -> Result<Self> {
        let len = self.dim_len(&coord.name)?;
        if coord.len() != len {
            return Err(EnsoError::DimensionMismatch {
                message: format!(
                    "coordinate '{}' has {} values but dimension has length {}",
                    coord.name,
                    coord.len(),
                    len
                ),
            });
        }
        self.coords.insert(coord.name.clone(), coord);
        Ok(self)
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn has_dim(&self, dim: &str) -> bool {
        self.dims.iter().any(|d| d == dim)
    }

    /// Axis index of a named dimension
    pub fn axis_of(&self, dim: &str) -> Result<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .ok_or_else(|| EnsoError::DimensionNotFound {
                field: self.name.clone(),
                dim: dim.to_string(),
            })
    }

    pub fn dim_len(&self, dim: &str) -> Result<usize> {
        Ok(self.data.shape()[self.axis_of(dim)?])
    }

    pub fn coord(&self, dim: &str) -> Option<&Coordinate> {
        self.coords.get(dim)
    }

    pub fn units(&self) -> Option<&str> {
        self.attrs.get("units").map(String::as_str)
    }

    /// `(name, length)` pairs in axis order
    pub fn sizes(&self) -> Vec<(String, usize)> {
        self.dims
            .iter()
            .cloned()
            .zip(self.data.shape().iter().copied())
            .collect()
    }

    /// Copy of the field with dimension `from` called `to`; unchanged if
    /// `from` is absent
    pub fn renamed_dim(&self, from: &str, to: &str) -> Field {
        let mut renamed = self.clone();
        for dim in &mut renamed.dims {
            if dim.as_str() == from {
                *dim = to.to_string();
            }
        }
        if let Some(mut coord) = renamed.coords.remove(from) {
            coord.name = to.to_string();
            renamed.coords.insert(to.to_string(), coord);
        }
        renamed
    }

    /// Element-wise `self - other`. Both fields must have identical dims and
    /// shape; the result carries no attributes.
    pub fn difference(&self, other: &Field) -> Result<Field> {
        if self.sizes() != other.sizes() {
            return Err(EnsoError::DimensionMismatch {
                message: format!(
                    "cannot subtract {:?} from {:?}",
                    other.sizes(),
                    self.sizes()
                ),
            });
        }
        let data = &self.data - &other.data;
        Ok(Field {
            name: self.name.clone(),
            dims: self.dims.clone(),
            data,
            attrs: Attributes::new(),
            coords: self.coords.clone(),
        })
    }

    /// Stack same-shaped members along a new leading dimension
    ///
    /// Coordinates and attributes come from the first member.
    pub fn stack(members: &[Field], dim: &str) -> Result<Field> {
        let first = members.first().ok_or_else(|| EnsoError::EmptyEnsemble {
            dim: dim.to_string(),
        })?;

        let sizes = first.sizes();
        let mut values = Vec::with_capacity(first.data.len() * members.len());
        for member in members {
            if member.sizes() != sizes {
                return Err(EnsoError::DimensionMismatch {
                    message: format!(
                        "ensemble member has dims {:?}, expected {:?}",
                        member.sizes(),
                        sizes
                    ),
                });
            }
            values.extend(member.data.iter().copied());
        }

        let mut shape = vec![members.len()];
        shape.extend_from_slice(first.shape());
        let mut dims = vec![dim.to_string()];
        dims.extend(first.dims.iter().cloned());

        let data = ArrayD::from_shape_vec(IxDyn(&shape), values)?;
        Ok(Field {
            name: first.name.clone(),
            dims,
            data,
            attrs: first.attrs.clone(),
            coords: first.coords.clone(),
        })
    }

    /// Finite `(min, max)` of the data, or `None` if nothing is finite
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn grid(name: &str, offset: f64) -> Field {
        let data = Array2::from_shape_fn((2, 3), |(i, j)| offset + (i * 3 + j) as f64).into_dyn();
        Field::new(name, vec!["lev".into(), "lat".into()], data)
            .unwrap()
            .with_attr("units", "K")
    }

    #[test]
    fn stack_adds_leading_dimension() {
        let stacked = Field::stack(&[grid("tem", 0.0), grid("tem", 10.0)], "year_ens").unwrap();
        assert_eq!(stacked.dims, vec!["year_ens", "lev", "lat"]);
        assert_eq!(stacked.shape(), &[2, 2, 3]);
        assert_eq!(stacked.data[[1, 0, 0]], 10.0);
        assert_eq!(stacked.units(), Some("K"));
    }

    #[test]
    fn stack_of_nothing_is_an_empty_ensemble() {
        assert!(matches!(
            Field::stack(&[], "year_ens"),
            Err(EnsoError::EmptyEnsemble { .. })
        ));
    }

    #[test]
    fn difference_drops_attributes() {
        let diff = grid("tem", 5.0).difference(&grid("tem", 2.0)).unwrap();
        assert!(diff.attrs.is_empty());
        assert!(diff.data.iter().all(|&v| v == 3.0));
    }

    #[test]
    fn coordinate_length_is_checked() {
        let err = grid("tem", 0.0).with_coord(Coordinate::new("lat", vec![0.0, 1.0]));
        assert!(err.is_err());
        assert!(Coordinate::new("lat", Vec::new()).is_empty());
        let ok = grid("tem", 0.0)
            .with_coord(Coordinate::new("lat", vec![-30.0, 0.0, 30.0]).with_attr("long_name", "latitude"))
            .unwrap();
        assert_eq!(ok.coord("lat").unwrap().label(), "latitude");
    }
}
