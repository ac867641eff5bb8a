//! Centralized error handling for muam_enso
//!
//! Every stage of the pipeline returns [`Result`], so a failure anywhere
//! (missing files, mismatched grids, unreadable NetCDF) propagates to `main`
//! with enough context to tell which stage broke.

use std::fmt;
use std::path::PathBuf;

/// Main error type for muam_enso operations
#[derive(Debug)]
pub enum EnsoError {
    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// Variable not found in a NetCDF file
    VariableNotFound { var: String, path: PathBuf },

    /// Dimension not found on a field
    DimensionNotFound { field: String, dim: String },

    /// No input files were selected for an ensemble
    EmptyEnsemble { dim: String },

    /// Two fields that must share a grid do not
    DimensionMismatch { message: String },

    /// Invalid analysis configuration
    InvalidConfig(String),

    /// Plot rendering errors
    RenderError(String),

    /// Thread pool configuration error
    ThreadPoolError(String),
}

impl fmt::Display for EnsoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnsoError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            EnsoError::IoError(e) => write!(f, "I/O error: {}", e),
            EnsoError::ArrayError(e) => write!(f, "Array error: {}", e),
            EnsoError::VariableNotFound { var, path } => {
                write!(f, "Variable '{}' not found in {}", var, path.display())
            }
            EnsoError::DimensionNotFound { field, dim } => {
                write!(f, "Dimension '{}' not found in field '{}'", dim, field)
            }
            EnsoError::EmptyEnsemble { dim } => {
                write!(f, "No files to open for ensemble along '{}'", dim)
            }
            EnsoError::DimensionMismatch { message } => write!(f, "Dimension mismatch: {}", message),
            EnsoError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            EnsoError::RenderError(msg) => write!(f, "Rendering error: {}", msg),
            EnsoError::ThreadPoolError(msg) => write!(f, "Thread pool error: {}", msg),
        }
    }
}

impl std::error::Error for EnsoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EnsoError::NetCDFError(e) => Some(e),
            EnsoError::IoError(e) => Some(e),
            EnsoError::ArrayError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for EnsoError {
    fn from(error: netcdf::Error) -> Self {
        EnsoError::NetCDFError(error)
    }
}

impl From<std::io::Error> for EnsoError {
    fn from(error: std::io::Error) -> Self {
        EnsoError::IoError(error)
    }
}

impl From<ndarray::ShapeError> for EnsoError {
    fn from(error: ndarray::ShapeError) -> Self {
        EnsoError::ArrayError(error)
    }
}

/// Result type alias for muam_enso operations
pub type Result<T> = std::result::Result<T, EnsoError>;
