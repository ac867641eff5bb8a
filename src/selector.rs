//! Run directory discovery
//!
//! MUAM runs live in directories named `<prefix>_<year>_<month>`. A run
//! belongs to a composite when its name ends with `{year}_{month}` for one of
//! the composite's years; its member file sits at a fixed relative path
//! inside the directory.

use crate::config::{AnalysisConfig, EnsoPhase};
use crate::errors::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Member files for both composites
#[derive(Debug, Clone, Default)]
pub struct SelectedFiles {
    pub el_nino: Vec<PathBuf>,
    pub la_nina: Vec<PathBuf>,
}

impl SelectedFiles {
    pub fn for_phase(&self, phase: EnsoPhase) -> &[PathBuf] {
        match phase {
            EnsoPhase::ElNino => &self.el_nino,
            EnsoPhase::LaNina => &self.la_nina,
        }
    }
}

/// List the subdirectories of `root`, sorted by name
///
/// # Errors
///
/// Returns an I/O error if `root` cannot be read.
pub fn list_run_directories(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// True if the directory name ends with `{year}_{month}` for any listed year
pub fn matches_run(dir: &Path, years: &[i32], month: &str) -> bool {
    let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    years
        .iter()
        .any(|year| name.ends_with(&format!("{year}_{month}")))
}

/// Filter `dirs` to the runs of `years` and map each to its member file
///
/// Input order is preserved.
pub fn select_files(dirs: &[PathBuf], years: &[i32], month: &str, data_file: &str) -> Vec<PathBuf> {
    dirs.iter()
        .filter(|dir| matches_run(dir, years, month))
        .map(|dir| dir.join(data_file))
        .collect()
}

/// Scan the configured root once and select member files for both phases
///
/// No check is made that any run matched; an empty selection surfaces as an
/// empty-ensemble error when loading.
///
/// # Errors
///
/// Returns an I/O error if the root directory cannot be read.
pub fn select_ensemble_files(config: &AnalysisConfig) -> Result<SelectedFiles> {
    let dirs = list_run_directories(&config.root)?;
    let data_file = config.data_file_for_month();

    Ok(SelectedFiles {
        el_nino: select_files(&dirs, config.years(EnsoPhase::ElNino), &config.month, &data_file),
        la_nina: select_files(&dirs, config.years(EnsoPhase::LaNina), &config.month, &data_file),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_name_suffix_selects_year_and_month() {
        let dir = Path::new("/data/anything_1983_Jan");
        assert!(matches_run(dir, &[1983, 1992], "Jan"));
        assert!(!matches_run(dir, &[1983], "Feb"));
        assert!(!matches_run(dir, &[1984], "Jan"));
        assert!(!matches_run(Path::new("/data/anything_1983_Jan_old"), &[1983], "Jan"));
    }

    #[test]
    fn selected_files_point_inside_run_directories() {
        let dirs = vec![
            PathBuf::from("/r/muam_1983_Jan"),
            PathBuf::from("/r/muam_1989_Jan"),
            PathBuf::from("/r/muam_1992_Jan"),
        ];
        let files = select_files(&dirs, &[1992, 1983], "Jan", "nc/muam_Jan330.nc");
        assert_eq!(
            files,
            vec![
                PathBuf::from("/r/muam_1983_Jan/nc/muam_Jan330.nc"),
                PathBuf::from("/r/muam_1992_Jan/nc/muam_Jan330.nc"),
            ]
        );
    }
}
