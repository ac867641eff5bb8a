//! NetCDF I/O: loading ensemble members and writing results
//!
//! Each member file is read into a [`Field`], preprocessed (coordinate
//! variables promoted and renamed to canonical names, CF packing and fill
//! values decoded), and the members are stacked along a new ensemble
//! dimension. Results can be written back with [`NetCDFWriter`].

use crate::errors::{EnsoError, Result};
use crate::field::{Attributes, Coordinate, Field};
use chrono::Utc;
use ndarray::{ArrayD, IxDyn};
use netcdf::{AttributeValue, Variable};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Attributes consumed by CF decoding and not carried on the field
const ENCODING_ATTRIBUTES: [&str; 4] = ["_FillValue", "missing_value", "scale_factor", "add_offset"];

/// Promote a source variable to the coordinate of a canonical dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateRule {
    pub source: String,
    pub target: String,
    pub long_name: String,
}

impl CoordinateRule {
    pub fn new(source: &str, target: &str, long_name: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            long_name: long_name.to_string(),
        }
    }
}

/// Per-file preprocessing applied before members are stacked
#[derive(Debug, Clone)]
pub struct Preprocess {
    pub rules: Vec<CoordinateRule>,
}

impl Default for Preprocess {
    /// MUAM output stores its axes as `levs`, `lats` and `lons`
    fn default() -> Self {
        Self {
            rules: vec![
                CoordinateRule::new("levs", "lev", "altitude"),
                CoordinateRule::new("lats", "lat", "latitude"),
                CoordinateRule::new("lons", "lon", "longitude"),
            ],
        }
    }
}

impl Preprocess {
    /// Canonical name for a dimension or variable name
    pub fn rename<'a>(&'a self, name: &'a str) -> &'a str {
        self.rules
            .iter()
            .find(|r| r.source == name)
            .map_or(name, |r| r.target.as_str())
    }

    fn rule_for_target(&self, target: &str) -> Option<&CoordinateRule> {
        self.rules.iter().find(|r| r.target == target)
    }

    /// Variables that may hold the coordinate of `target`, in preference order
    fn coordinate_candidates<'a>(&'a self, source_dim: &'a str, target: &'a str) -> Vec<&'a str> {
        let mut candidates = Vec::with_capacity(3);
        if let Some(rule) = self.rule_for_target(target) {
            candidates.push(rule.source.as_str());
        }
        for name in [source_dim, target] {
            if !candidates.contains(&name) {
                candidates.push(name);
            }
        }
        candidates
    }
}

/// CF packing and missing-value conventions of one variable
#[derive(Debug, Clone, PartialEq)]
struct CfDecoding {
    missing: Vec<f64>,
    scale_factor: f64,
    add_offset: f64,
}

impl CfDecoding {
    fn from_variable(var: &Variable) -> Self {
        let numeric = |name: &str| {
            var.attribute(name)
                .and_then(|attr| attr.value().ok())
                .and_then(|value| attribute_as_f64(&value))
        };
        Self {
            missing: ["_FillValue", "missing_value"]
                .into_iter()
                .filter_map(numeric)
                .collect(),
            scale_factor: numeric("scale_factor").unwrap_or(1.0),
            add_offset: numeric("add_offset").unwrap_or(0.0),
        }
    }

    fn apply(&self, values: Vec<f64>) -> Vec<f64> {
        values
            .into_iter()
            .map(|v| {
                if self.missing.iter().any(|&m| m == v) {
                    f64::NAN
                } else {
                    v * self.scale_factor + self.add_offset
                }
            })
            .collect()
    }
}

fn attribute_as_f64(value: &AttributeValue) -> Option<f64> {
    match value {
        AttributeValue::Double(v) => Some(*v),
        AttributeValue::Float(v) => Some(f64::from(*v)),
        AttributeValue::Int(v) => Some(f64::from(*v)),
        AttributeValue::Short(v) => Some(f64::from(*v)),
        AttributeValue::Schar(v) => Some(f64::from(*v)),
        AttributeValue::Uchar(v) => Some(f64::from(*v)),
        AttributeValue::Doubles(v) => v.first().copied(),
        AttributeValue::Floats(v) => v.first().map(|&x| f64::from(x)),
        AttributeValue::Ints(v) => v.first().map(|&x| f64::from(x)),
        AttributeValue::Shorts(v) => v.first().map(|&x| f64::from(x)),
        _ => None,
    }
}

fn attribute_as_string(value: &AttributeValue) -> Option<String> {
    match value {
        AttributeValue::Str(s) => Some(s.clone()),
        AttributeValue::Strs(v) => Some(v.join(", ")),
        other => attribute_as_f64(other).map(|v| v.to_string()),
    }
}

/// String view of a variable's attributes, minus the CF encoding ones
fn read_attributes(var: &Variable) -> Attributes {
    let mut attrs = Attributes::new();
    for attr in var.attributes() {
        let name = attr.name().to_string();
        if ENCODING_ATTRIBUTES.contains(&name.as_str()) {
            continue;
        }
        match attr.value() {
            Ok(value) => {
                if let Some(text) = attribute_as_string(&value) {
                    attrs.insert(name, text);
                }
            }
            Err(_) => println!("⚠ Skipped unreadable attribute '{}' on '{}'", name, var.name()),
        }
    }
    attrs
}

fn read_decoded(var: &Variable) -> Result<Vec<f64>> {
    let raw = var.get_values::<f64, _>(..)?;
    Ok(CfDecoding::from_variable(var).apply(raw))
}

/// Read one ensemble member and apply the preprocessing rules
///
/// # Errors
///
/// Returns an error if the file cannot be opened, the variable is missing,
/// or its data does not match its declared shape.
pub fn read_member(path: &Path, variable: &str, preprocess: &Preprocess) -> Result<Field> {
    let file = netcdf::open(path)?;
    let var = file
        .variable(variable)
        .ok_or_else(|| EnsoError::VariableNotFound {
            var: variable.to_string(),
            path: path.to_path_buf(),
        })?;

    let source_dims: Vec<String> = var
        .dimensions()
        .iter()
        .map(|d| d.name().to_string())
        .collect();
    let shape: Vec<usize> = var.dimensions().iter().map(netcdf::Dimension::len).collect();

    let data = ArrayD::from_shape_vec(IxDyn(&shape), read_decoded(&var)?)?;
    let dims = source_dims
        .iter()
        .map(|d| preprocess.rename(d).to_string())
        .collect();

    let mut field = Field::new(variable, dims, data)?;
    field.attrs = read_attributes(&var);

    for (source_dim, &len) in source_dims.iter().zip(&shape) {
        let target = preprocess.rename(source_dim);
        let coord_var = preprocess
            .coordinate_candidates(source_dim, target)
            .into_iter()
            .filter_map(|name| file.variable(name))
            .find(|v| v.dimensions().len() == 1 && v.dimensions()[0].len() == len);

        let Some(coord_var) = coord_var else {
            continue;
        };

        let mut coord = Coordinate::new(target, read_decoded(&coord_var)?);
        coord.attrs = read_attributes(&coord_var);
        if let Some(rule) = preprocess.rule_for_target(target) {
            coord.attrs.insert("long_name".to_string(), rule.long_name.clone());
        }
        field = field.with_coord(coord)?;
    }

    Ok(field)
}

/// Load all member files of one composite and stack them along `ensemble_dim`
///
/// Members keep the order of `paths`. With `parallel` set the files are read
/// on the rayon pool.
///
/// # Errors
///
/// Returns [`EnsoError::EmptyEnsemble`] for an empty path list, a
/// dimension-mismatch error if members disagree in shape, or the first
/// read error encountered.
pub fn load_ensemble(
    paths: &[PathBuf],
    variable: &str,
    ensemble_dim: &str,
    preprocess: &Preprocess,
    parallel: bool,
) -> Result<Field> {
    if paths.is_empty() {
        return Err(EnsoError::EmptyEnsemble {
            dim: ensemble_dim.to_string(),
        });
    }

    let members: Vec<Field> = if parallel {
        paths
            .par_iter()
            .map(|p| read_member(p, variable, preprocess))
            .collect::<Result<_>>()?
    } else {
        paths
            .iter()
            .map(|p| read_member(p, variable, preprocess))
            .collect::<Result<_>>()?
    };

    Field::stack(&members, ensemble_dim)
}

/// Writes a set of named fields, with their coordinates, to one NetCDF file
pub struct NetCDFWriter<'a> {
    output_path: &'a Path,
}

impl<'a> NetCDFWriter<'a> {
    pub fn new(output_path: &'a Path) -> Self {
        Self { output_path }
    }

    /// Write `(output name, field)` pairs, replacing any existing file
    ///
    /// Dimensions shared between fields must have the same length.
    pub fn write_fields(&self, fields: &[(String, &Field)]) -> Result<()> {
        if self.output_path.exists() {
            fs::remove_file(self.output_path)?;
        }

        let mut file = netcdf::create(self.output_path)?;

        let mut dim_lens: BTreeMap<String, usize> = BTreeMap::new();
        for (name, field) in fields {
            for (dim, len) in field.sizes() {
                match dim_lens.get(&dim) {
                    Some(&existing) if existing != len => {
                        return Err(EnsoError::DimensionMismatch {
                            message: format!(
                                "'{name}' has {dim}={len} but the file already defines {dim}={existing}"
                            ),
                        });
                    }
                    Some(_) => {}
                    None => {
                        file.add_dimension(&dim, len)?;
                        dim_lens.insert(dim, len);
                    }
                }
            }
        }

        let mut written_coords = BTreeSet::new();
        for (_, field) in fields {
            for (dim, coord) in &field.coords {
                if !written_coords.insert(dim.clone()) {
                    continue;
                }
                let mut var = file.add_variable::<f64>(dim, &[dim.as_str()])?;
                for (key, value) in &coord.attrs {
                    var.put_attribute(key, value.as_str())?;
                }
                var.put_values(&coord.values, ..)?;
            }
        }

        for (name, field) in fields {
            let dim_refs: Vec<&str> = field.dims.iter().map(String::as_str).collect();
            let mut var = file.add_variable::<f64>(name, &dim_refs)?;
            for (key, value) in &field.attrs {
                var.put_attribute(key, value.as_str())?;
            }
            let values: Vec<f64> = field.data.iter().copied().collect();
            var.put_values(&values, ..)?;
        }

        file.add_attribute(
            "history",
            format!("Created by muam_enso on {}", Utc::now().to_rfc3339()),
        )?;

        Ok(())
    }
}
