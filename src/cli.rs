//! Command-line interface for the composite analysis

use crate::config::{self, AnalysisConfig};
use crate::parallel::ParallelConfig;
use crate::statistics::ReductionMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Standard-deviation semantics selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Std over time and longitude, one value per ensemble member
    PerMember,
    /// Std also pooled over the ensemble members
    EnsembleSpread,
}

impl From<ModeArg> for ReductionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::PerMember => ReductionMode::PerMember,
            ModeArg::EnsembleSpread => ReductionMode::EnsembleSpread,
        }
    }
}

/// El Niño / La Niña composite analysis of MUAM runs
#[derive(Parser, Debug)]
#[command(
    name = "muam_enso",
    version,
    about = "Compare El Niño and La Niña MUAM composites with Welch's t-test"
)]
pub struct Args {
    /// Directory containing the <prefix>_<year>_<month> run directories
    #[arg(short, long, default_value = config::DEFAULT_ROOT)]
    pub root: PathBuf,

    /// Month label used in run directory names
    #[arg(short, long, default_value = config::DEFAULT_MONTH)]
    pub month: String,

    /// Variable to analyse
    #[arg(long = "variable", default_value = config::DEFAULT_VARIABLE)]
    pub variable: String,

    /// El Niño years, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = config::EL_NINO_YEARS)]
    pub el_nino_years: Vec<i32>,

    /// La Niña years, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = config::LA_NINA_YEARS)]
    pub la_nina_years: Vec<i32>,

    /// Member file inside each run directory; {month} is substituted
    #[arg(long, default_value = config::DEFAULT_DATA_FILE)]
    pub data_file: String,

    /// Name of the ensemble-member dimension created when stacking runs
    #[arg(long, default_value = config::DEFAULT_ENSEMBLE_DIM)]
    pub ensemble_dim: String,

    /// Dimensions averaged out before testing, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = config::DEFAULT_COLLAPSE_DIMS.map(String::from))]
    pub collapse_dims: Vec<String>,

    /// How the standard deviation treats ensemble members
    #[arg(long, value_enum, default_value_t = ModeArg::PerMember)]
    pub mode: ModeArg,

    /// Output image (.png or .svg). Defaults to enso_<month>.png
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Also write means, stds, difference and p-values to this NetCDF file
    #[arg(long)]
    pub output_netcdf: Option<PathBuf>,

    /// Number of threads to use for parallel processing. Defaults to rayon's
    /// pool size; 0 uses every detected CPU core.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Read member files one after another instead of in parallel
    #[arg(long, default_value_t = false)]
    pub sequential: bool,

    /// Enable verbose output.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            root: self.root.clone(),
            month: self.month.clone(),
            variable: self.variable.clone(),
            el_nino_years: self.el_nino_years.clone(),
            la_nina_years: self.la_nina_years.clone(),
            data_file: self.data_file.clone(),
            ensemble_dim: self.ensemble_dim.clone(),
            collapse_dims: self.collapse_dims.clone(),
            mode: self.mode.into(),
            parallel_load: !self.sequential,
            verbose: self.verbose,
        }
    }

    pub fn parallel_config(&self) -> ParallelConfig {
        match self.threads {
            Some(0) => ParallelConfig::all_cores(),
            threads => ParallelConfig::new(threads),
        }
    }

    pub fn plot_path(&self) -> PathBuf {
        self.plot
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("enso_{}.png", self.month)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_analysis_defaults() {
        let args = Args::parse_from(["muam_enso"]);
        let config = args.analysis_config();
        let defaults = AnalysisConfig::default();
        assert_eq!(config.el_nino_years, defaults.el_nino_years);
        assert_eq!(config.la_nina_years, defaults.la_nina_years);
        assert_eq!(config.collapse_dims, defaults.collapse_dims);
        assert_eq!(config.mode, ReductionMode::PerMember);
        assert!(config.parallel_load);
        assert_eq!(args.plot_path(), PathBuf::from("enso_Jan.png"));
    }

    #[test]
    fn year_lists_and_mode_parse() {
        let args = Args::parse_from([
            "muam_enso",
            "--month",
            "Feb",
            "--el-nino-years",
            "1983,1998",
            "--mode",
            "ensemble-spread",
            "--sequential",
        ]);
        let config = args.analysis_config();
        assert_eq!(config.el_nino_years, vec![1983, 1998]);
        assert_eq!(config.mode, ReductionMode::EnsembleSpread);
        assert!(!config.parallel_load);
        assert_eq!(config.data_file_for_month(), "nc/muam_Feb330.nc");
    }

    #[test]
    fn zero_threads_means_all_cores() {
        let args = Args::parse_from(["muam_enso", "--threads", "0"]);
        assert_eq!(args.parallel_config().num_threads, Some(num_cpus::get()));

        let args = Args::parse_from(["muam_enso", "-t", "3"]);
        assert_eq!(args.parallel_config().num_threads, Some(3));
        assert_eq!(Args::parse_from(["muam_enso"]).parallel_config().num_threads, None);
    }
}
