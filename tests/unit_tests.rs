//! Unit tests for loading, selection and error reporting against real files
//!
//! Pure numeric behaviour is covered by the `#[cfg(test)]` modules next to
//! the code; these tests need NetCDF files or directories on disk.

mod common;

use muam_enso::config::{AnalysisConfig, EnsoPhase};
use muam_enso::errors::EnsoError;
use muam_enso::metadata::inspect_source_file;
use muam_enso::netcdf_io::{load_ensemble, read_member, CoordinateRule, Preprocess};
use muam_enso::selector::{list_run_directories, select_ensemble_files};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_error_display() {
    let err = EnsoError::DimensionNotFound {
        field: "tem".to_string(),
        dim: "lon".to_string(),
    };
    assert_eq!(format!("{}", err), "Dimension 'lon' not found in field 'tem'");

    let err = EnsoError::EmptyEnsemble {
        dim: "year_ens".to_string(),
    };
    assert!(format!("{}", err).contains("No files to open"));

    let err = EnsoError::NetCDFError(netcdf::Error::NotFound("tem".to_string()));
    assert!(format!("{}", err).contains("NetCDF error"));
}

#[test]
fn test_read_member_renames_and_labels_axes() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = common::member_path(temp_dir.path(), 1983, "Jan");
    common::write_member(&path, &common::LATS, |t, l, y, x| {
        (1000 * t + 100 * l + 10 * y + x) as f32
    })
    .expect("Failed to write member");

    let field = read_member(&path, "tem", &Preprocess::default()).expect("Failed to read member");

    assert_eq!(field.dims, vec!["time", "lev", "lat", "lon"]);
    assert_eq!(field.shape(), &[2, 3, 4, 2]);
    assert_eq!(field.data[[1, 2, 3, 1]], 1231.0);
    assert_eq!(field.attrs["units"], "K");
    assert!(!field.attrs.contains_key("_FillValue"));

    let lev = field.coord("lev").expect("lev coordinate");
    assert_eq!(lev.values, vec![0.0, 20.0, 40.0]);
    assert_eq!(lev.attrs["long_name"], "altitude");
    assert_eq!(lev.attrs["units"], "km");
    assert_eq!(lev.label(), "altitude [km]");
    assert_eq!(field.coord("lon").unwrap().attrs["long_name"], "longitude");
    // plain dimension coordinates are attached too
    assert_eq!(field.coord("time").unwrap().values, vec![0.0, 15.0]);
}

#[test]
fn test_fill_values_become_nan() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("member.nc");
    common::write_member(&path, &common::LATS, |t, l, y, x| {
        if (t, l, y, x) == (0, 0, 0, 0) {
            -999.0
        } else {
            250.0
        }
    })
    .expect("Failed to write member");

    let field = read_member(&path, "tem", &Preprocess::default()).expect("Failed to read member");
    assert!(field.data[[0, 0, 0, 0]].is_nan());
    assert_eq!(field.data[[0, 0, 0, 1]], 250.0);
}

#[test]
fn test_custom_coordinate_rules() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("member.nc");
    common::write_member(&path, &common::LATS, |_, _, _, _| 1.0).expect("Failed to write member");

    let preprocess = Preprocess {
        rules: vec![CoordinateRule::new("levs", "altitude", "height above ground")],
    };
    let field = read_member(&path, "tem", &preprocess).expect("Failed to read member");
    assert_eq!(field.dims, vec!["time", "altitude", "lats", "lons"]);
    assert_eq!(field.coord("altitude").unwrap().attrs["long_name"], "height above ground");
    // without a rule the source variable still labels its own dimension
    assert!(field.coord("lats").is_some());
}

#[test]
fn test_missing_variable() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("member.nc");
    common::write_member(&path, &common::LATS, |_, _, _, _| 1.0).expect("Failed to write member");

    match read_member(&path, "u", &Preprocess::default()) {
        Err(EnsoError::VariableNotFound { var, .. }) => assert_eq!(var, "u"),
        other => panic!("Expected VariableNotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_load_ensemble_stacks_in_input_order() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let paths: Vec<_> = [3.0_f32, 1.0, 2.0]
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let path = temp_dir.path().join(format!("member_{i}.nc"));
            common::write_member(&path, &common::LATS, |_, _, _, _| value).expect("Failed to write member");
            path
        })
        .collect();

    for parallel in [true, false] {
        let field = load_ensemble(&paths, "tem", "year_ens", &Preprocess::default(), parallel)
            .expect("Failed to load ensemble");
        assert_eq!(field.dims, vec!["year_ens", "time", "lev", "lat", "lon"]);
        assert_eq!(field.shape()[0], 3);
        assert_eq!(field.data[[0, 0, 0, 0, 0]], 3.0);
        assert_eq!(field.data[[1, 0, 0, 0, 0]], 1.0);
        assert_eq!(field.data[[2, 1, 2, 3, 1]], 2.0);
    }
}

#[test]
fn test_load_ensemble_rejects_mismatched_members() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let a = temp_dir.path().join("a.nc");
    let b = temp_dir.path().join("b.nc");
    common::write_member(&a, &common::LATS, |_, _, _, _| 1.0).expect("Failed to write member");
    common::write_member(&b, &[-45.0, 0.0, 45.0], |_, _, _, _| 1.0).expect("Failed to write member");

    let result = load_ensemble(&[a, b], "tem", "year_ens", &Preprocess::default(), true);
    assert!(matches!(result, Err(EnsoError::DimensionMismatch { .. })));

    let empty = load_ensemble(&[], "tem", "year_ens", &Preprocess::default(), true);
    assert!(matches!(empty, Err(EnsoError::EmptyEnsemble { .. })));
}

#[test]
fn test_selector_on_directory_tree() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let root = temp_dir.path();
    for name in ["run_2010_Jan", "run_1983_Jan", "run_1989_Jan", "run_1983_Feb", "run_1984_Jan"] {
        fs::create_dir(root.join(name)).expect("Failed to create dir");
    }
    fs::write(root.join("anything_2003_Jan"), "").expect("Failed to write file");

    let dirs = list_run_directories(root).expect("Failed to list root");
    assert_eq!(dirs.len(), 5);
    assert!(dirs.windows(2).all(|w| w[0] < w[1]));

    let config = AnalysisConfig {
        root: root.to_path_buf(),
        ..AnalysisConfig::default()
    };
    let selected = select_ensemble_files(&config).expect("Selection failed");
    assert_eq!(
        selected.for_phase(EnsoPhase::ElNino),
        &[
            root.join("run_1983_Jan/nc/muam_Jan330.nc"),
            root.join("run_2010_Jan/nc/muam_Jan330.nc"),
        ]
    );
    assert_eq!(selected.la_nina, vec![root.join("run_1989_Jan/nc/muam_Jan330.nc")]);
}

#[test]
fn test_inspect_source_file() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("member.nc");
    common::write_member(&path, &common::LATS, |_, _, _, _| 1.0).expect("Failed to write member");

    let info = inspect_source_file(&path).expect("Failed to inspect");
    let dims: Vec<(&str, usize)> = info
        .dimensions
        .iter()
        .map(|d| (d.name.as_str(), d.length))
        .collect();
    assert_eq!(dims, vec![("lats", 4), ("levs", 3), ("lons", 2), ("time", 2)]);

    let tem = info.variables.iter().find(|(name, _)| name == "tem").expect("tem listed");
    assert_eq!(tem.1, vec!["time", "levs", "lats", "lons"]);
}
