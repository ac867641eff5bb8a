//! Analysis configuration
//!
//! Defaults reproduce the January MUAM composite: five El Niño and five
//! La Niña years, the `tem` variable, and the `nc/muam_<month>330.nc`
//! member file layout.

use crate::errors::{EnsoError, Result};
use crate::statistics::ReductionMode;
use std::collections::BTreeSet;
use std::path::PathBuf;

pub const DEFAULT_ROOT: &str = "/projekt5/hochatm/muam_mstober/";
pub const EL_NINO_YEARS: [i32; 5] = [1983, 1992, 1998, 2003, 2010];
pub const LA_NINA_YEARS: [i32; 5] = [1989, 1999, 2000, 2008, 2013];
pub const DEFAULT_MONTH: &str = "Jan";
pub const DEFAULT_VARIABLE: &str = "tem";
pub const DEFAULT_DATA_FILE: &str = "nc/muam_{month}330.nc";
pub const DEFAULT_ENSEMBLE_DIM: &str = "year_ens";
pub const DEFAULT_COLLAPSE_DIMS: [&str; 2] = ["time", "lon"];

/// The two climate phases being composited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsoPhase {
    ElNino,
    LaNina,
}

impl EnsoPhase {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ElNino => "El Niño",
            Self::LaNina => "La Niña",
        }
    }

    /// Identifier used in output variable names
    pub const fn slug(self) -> &'static str {
        match self {
            Self::ElNino => "el_nino",
            Self::LaNina => "la_nina",
        }
    }
}

/// Everything the pipeline needs to select, load and reduce the composites
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub root: PathBuf,
    pub month: String,
    pub variable: String,
    pub el_nino_years: Vec<i32>,
    pub la_nina_years: Vec<i32>,
    /// Member file path relative to each run directory; `{month}` is substituted
    pub data_file: String,
    pub ensemble_dim: String,
    pub collapse_dims: Vec<String>,
    pub mode: ReductionMode,
    pub parallel_load: bool,
    pub verbose: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            month: DEFAULT_MONTH.to_string(),
            variable: DEFAULT_VARIABLE.to_string(),
            el_nino_years: EL_NINO_YEARS.to_vec(),
            la_nina_years: LA_NINA_YEARS.to_vec(),
            data_file: DEFAULT_DATA_FILE.to_string(),
            ensemble_dim: DEFAULT_ENSEMBLE_DIM.to_string(),
            collapse_dims: DEFAULT_COLLAPSE_DIMS.iter().map(|d| d.to_string()).collect(),
            mode: ReductionMode::PerMember,
            parallel_load: true,
            verbose: false,
        }
    }
}

impl AnalysisConfig {
    pub fn years(&self, phase: EnsoPhase) -> &[i32] {
        match phase {
            EnsoPhase::ElNino => &self.el_nino_years,
            EnsoPhase::LaNina => &self.la_nina_years,
        }
    }

    /// Member file path relative to a run directory
    pub fn data_file_for_month(&self) -> String {
        self.data_file.replace("{month}", &self.month)
    }

    /// Check the configuration before touching the filesystem
    ///
    /// # Errors
    ///
    /// Returns [`EnsoError::InvalidConfig`] for empty or overlapping year
    /// lists, an empty month label, or an ensemble dimension that is also
    /// collapsed.
    pub fn validate(&self) -> Result<()> {
        if self.el_nino_years.is_empty() || self.la_nina_years.is_empty() {
            return Err(EnsoError::InvalidConfig(
                "both El Niño and La Niña year lists must be non-empty".to_string(),
            ));
        }

        let el: BTreeSet<i32> = self.el_nino_years.iter().copied().collect();
        let overlap: Vec<i32> = self
            .la_nina_years
            .iter()
            .copied()
            .filter(|y| el.contains(y))
            .collect();
        if !overlap.is_empty() {
            return Err(EnsoError::InvalidConfig(format!(
                "years {overlap:?} are listed as both El Niño and La Niña"
            )));
        }

        if self.month.trim().is_empty() {
            return Err(EnsoError::InvalidConfig("month label is empty".to_string()));
        }

        if self.collapse_dims.iter().any(|d| d == &self.ensemble_dim) {
            return Err(EnsoError::InvalidConfig(format!(
                "ensemble dimension '{}' cannot also be collapsed",
                self.ensemble_dim
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AnalysisConfig::default();
        config.validate().unwrap();
        assert_eq!(config.data_file_for_month(), "nc/muam_Jan330.nc");
        assert_eq!(config.years(EnsoPhase::LaNina), &LA_NINA_YEARS);
    }

    #[test]
    fn overlapping_years_are_rejected() {
        let config = AnalysisConfig {
            la_nina_years: vec![1989, 1998],
            ..AnalysisConfig::default()
        };
        match config.validate() {
            Err(EnsoError::InvalidConfig(msg)) => assert!(msg.contains("1998")),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn collapsing_the_ensemble_dim_is_rejected() {
        let config = AnalysisConfig {
            collapse_dims: vec!["time".into(), "year_ens".into()],
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
