//! Rayon thread pool configuration
//!
//! Member loading, reductions and the per-cell t-tests all run on the global
//! rayon pool; this module sizes it once at startup.

use crate::errors::{EnsoError, Result};
use rayon::ThreadPoolBuilder;

/// Configuration for parallel processing
#[derive(Debug, Clone, Default)]
pub struct ParallelConfig {
    /// `None` keeps rayon's default (one thread per logical CPU)
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    pub fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Use every detected CPU core
    pub fn all_cores() -> Self {
        Self {
            num_threads: Some(num_cpus::get()),
        }
    }

    /// Build the global pool
    ///
    /// # Errors
    ///
    /// Returns [`EnsoError::ThreadPoolError`] for a zero thread count or if
    /// the global pool was already initialised.
    pub fn setup_global_pool(&self) -> Result<()> {
        let Some(num_threads) = self.num_threads else {
            println!("✅ Using default thread pool ({} threads)", rayon::current_num_threads());
            return Ok(());
        };

        if num_threads == 0 {
            return Err(EnsoError::ThreadPoolError(
                "thread count must be at least 1".to_string(),
            ));
        }

        ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| {
                EnsoError::ThreadPoolError(format!(
                    "Failed to initialize thread pool with {} threads: {}",
                    num_threads, e
                ))
            })?;

        println!("✅ Configured parallel processing with {} threads", num_threads);
        Ok(())
    }
}

/// Threads in the current pool and detected physical resources
#[derive(Debug, Clone)]
pub struct ParallelInfo {
    pub current_threads: usize,
    pub available_cores: usize,
}

pub fn get_parallel_info() -> ParallelInfo {
    ParallelInfo {
        current_threads: rayon::current_num_threads(),
        available_cores: num_cpus::get(),
    }
}

impl ParallelInfo {
    pub fn print_info(&self) {
        println!("📊 Parallel processing: {} threads on {} CPU cores", self.current_threads, self.available_cores);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_threads_is_rejected() {
        let err = ParallelConfig::new(Some(0)).setup_global_pool();
        assert!(matches!(err, Err(EnsoError::ThreadPoolError(_))));
    }

    #[test]
    fn all_cores_detects_at_least_one() {
        assert!(ParallelConfig::all_cores().num_threads.unwrap() > 0);
        assert!(get_parallel_info().current_threads > 0);
    }
}
