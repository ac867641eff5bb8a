//! muam_enso: ENSO composites of MUAM temperature fields
//!
//! Loads simulation output for El Niño and La Niña years, averages each
//! composite over time and longitude, tests the difference between the two
//! composites with Welch's t-test at every altitude/latitude cell, and draws
//! the result with significance hatching.
//!
//! ## Module Organization
//!
//! - [`config`]: analysis settings and the default year classification
//! - [`selector`]: run directory discovery and member file mapping
//! - [`field`]: labeled multi-dimensional arrays
//! - [`netcdf_io`]: member loading/preprocessing and NetCDF export
//! - [`statistics`]: parallel reductions, Welch's t-test, p-value fields
//! - [`pipeline`]: the end-to-end analysis
//! - [`render`]: contour maps with hatching
//! - [`metadata`]: member file inspection and field summaries
//! - [`parallel`]: thread pool configuration
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use muam_enso::prelude::*;
//!
//! let config = AnalysisConfig {
//!     root: "/data/muam".into(),
//!     ..AnalysisConfig::default()
//! };
//! let analysis = run_analysis(&config, &Preprocess::default()).unwrap();
//! render_comparison(&analysis, &RenderOptions::new("enso_Jan.png")).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod field;
pub mod metadata;
pub mod netcdf_io;
pub mod parallel;
pub mod pipeline;
pub mod render;
pub mod selector;
pub mod statistics;

pub use errors::{EnsoError, Result};

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::config::{AnalysisConfig, EnsoPhase};
    pub use crate::errors::{EnsoError, Result};
    pub use crate::field::{Coordinate, Field};
    pub use crate::netcdf_io::{load_ensemble, CoordinateRule, Preprocess};
    pub use crate::parallel::ParallelConfig;
    pub use crate::pipeline::{run_analysis, Composite, CompositeAnalysis};
    pub use crate::render::{render_comparison, RenderOptions};
    pub use crate::statistics::{mean_std, welch_pvalues, welch_t_test, ReductionMode};
}
