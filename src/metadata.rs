//! Member file inspection and field summaries
//!
//! Used by verbose runs to show what a member file contains before loading,
//! and what each computed field looks like afterwards.

use crate::errors::Result;
use crate::field::Field;
use crate::statistics::operations::finite_mean;
use std::path::Path;

/// Information about a NetCDF dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionInfo {
    pub name: String,
    pub length: usize,
    pub is_unlimited: bool,
}

/// Names, dims and shapes of everything in one member file
#[derive(Debug, Clone)]
pub struct SourceFileInfo {
    pub dimensions: Vec<DimensionInfo>,
    /// `(variable, [dimension names])`, sorted by variable name
    pub variables: Vec<(String, Vec<String>)>,
}

/// Collect dimensions and variables of a NetCDF file, both sorted by name
pub fn inspect_source_file(path: &Path) -> Result<SourceFileInfo> {
    let file = netcdf::open(path)?;

    let mut dimensions: Vec<DimensionInfo> = file
        .dimensions()
        .map(|d| DimensionInfo {
            name: d.name().to_string(),
            length: d.len(),
            is_unlimited: d.is_unlimited(),
        })
        .collect();
    dimensions.sort_by(|a, b| a.name.cmp(&b.name));

    let mut variables: Vec<(String, Vec<String>)> = file
        .variables()
        .map(|v| {
            let dims = v.dimensions().iter().map(|d| d.name().to_string()).collect();
            (v.name().to_string(), dims)
        })
        .collect();
    variables.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(SourceFileInfo {
        dimensions,
        variables,
    })
}

/// Lists all variables and dimensions of a member file
pub fn print_source_file(path: &Path) -> Result<()> {
    let info = inspect_source_file(path)?;

    println!("\n Member file: {}", path.display());
    println!("==============");
    if info.dimensions.is_empty() {
        println!("   (No dimensions found)");
    }
    for dim in &info.dimensions {
        if dim.is_unlimited {
            println!("    {} = {} (unlimited)", dim.name, dim.length);
        } else {
            println!("    {} = {}", dim.name, dim.length);
        }
    }
    for (name, dims) in &info.variables {
        if dims.is_empty() {
            println!("    {}: scalar", name);
        } else {
            println!("    {}: [{}]", name, dims.join(", "));
        }
    }

    Ok(())
}

/// Finite-value statistics of a field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub valid: usize,
    pub total: usize,
}

/// Min/mean/max of the finite values; `None` if the field has none
pub fn summarize_field(field: &Field) -> Option<FieldSummary> {
    let (min, max) = field.finite_range()?;
    let values: Vec<f64> = field.data.iter().copied().collect();
    let (mean, valid) = finite_mean(&values)?;
    Some(FieldSummary {
        min,
        max,
        mean,
        valid,
        total: values.len(),
    })
}

pub fn print_field_summary(label: &str, field: &Field) {
    let dims: Vec<String> = field
        .sizes()
        .iter()
        .map(|(name, len)| format!("{name}[{len}]"))
        .collect();
    println!("\n {label}: {} ({})", field.name, dims.join(", "));
    for (key, value) in &field.attrs {
        println!("    {key}: {value}");
    }
    match summarize_field(field) {
        Some(s) => println!(
            "    min {:.3}  mean {:.3}  max {:.3}  ({} / {} valid)",
            s.min, s.mean, s.max, s.valid, s.total
        ),
        None => println!("    ⚠ No valid (finite) data"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn summary_ignores_nan() {
        let field = Field::new("p", vec!["lat".into()], arr1(&[0.5, f64::NAN, 0.1]).into_dyn()).unwrap();
        let summary = summarize_field(&field).unwrap();
        assert_eq!(summary.valid, 2);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.min, 0.1);
        assert!((summary.mean - 0.3).abs() < 1e-12);
    }
}
