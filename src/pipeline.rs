//! The composite analysis pipeline
//!
//! file selection → load → reduce → Welch test. Rendering and export take
//! the resulting [`CompositeAnalysis`].

use crate::config::{AnalysisConfig, EnsoPhase};
use crate::errors::Result;
use crate::field::Field;
use crate::metadata::{print_field_summary, print_source_file};
use crate::netcdf_io::{load_ensemble, NetCDFWriter, Preprocess};
use crate::selector::select_ensemble_files;
use crate::statistics::{mean_std, welch_pvalues, ReductionMode};
use std::path::{Path, PathBuf};

/// Mean and standard deviation of one phase's ensemble
#[derive(Debug, Clone)]
pub struct Composite {
    pub phase: EnsoPhase,
    pub files: Vec<PathBuf>,
    pub mean: Field,
    pub std: Field,
}

/// Everything computed for one month
#[derive(Debug, Clone)]
pub struct CompositeAnalysis {
    pub month: String,
    pub ensemble_dim: String,
    pub mode: ReductionMode,
    pub el_nino: Composite,
    pub la_nina: Composite,
    /// El Niño minus La Niña mean, per ensemble member
    pub difference: Field,
    pub p_values: Field,
}

fn build_composite(
    config: &AnalysisConfig,
    preprocess: &Preprocess,
    phase: EnsoPhase,
    files: Vec<PathBuf>,
) -> Result<Composite> {
    println!("🚀 Loading {} {} members", files.len(), phase.label());
    for file in &files {
        println!("   {}", file.display());
    }
    if config.verbose {
        if let Some(first) = files.first() {
            print_source_file(first)?;
        }
    }

    let ensemble = load_ensemble(
        &files,
        &config.variable,
        &config.ensemble_dim,
        preprocess,
        config.parallel_load,
    )?;
    println!("   combined shape {:?} over {:?}", ensemble.shape(), ensemble.dims);

    let (mean, std) = mean_std(&ensemble, &config.collapse_dims, &config.ensemble_dim, config.mode)?;
    Ok(Composite {
        phase,
        files,
        mean,
        std,
    })
}

/// Run selection, loading, reduction and the significance test
///
/// # Errors
///
/// Fails on an invalid configuration, an unreadable root directory, an
/// empty ensemble, unreadable member files, or grids that differ between
/// the two composites. The difference is taken member by member, so both
/// phases must select the same number of runs.
pub fn run_analysis(config: &AnalysisConfig, preprocess: &Preprocess) -> Result<CompositeAnalysis> {
    config.validate()?;

    let selected = select_ensemble_files(config)?;
    println!(
        "✅ Selected {} El Niño and {} La Niña runs for {} under {}",
        selected.el_nino.len(),
        selected.la_nina.len(),
        config.month,
        config.root.display()
    );

    let build = |phase| build_composite(config, preprocess, phase, selected.for_phase(phase).to_vec());
    let el_nino = build(EnsoPhase::ElNino)?;
    let la_nina = build(EnsoPhase::LaNina)?;

    let p_values = welch_pvalues(&el_nino.mean, &la_nina.mean, &config.ensemble_dim)?;

    let units = el_nino.mean.units().unwrap_or("K").to_string();
    let difference = el_nino
        .mean
        .difference(&la_nina.mean)?
        .with_attr("units", &units)
        .with_attr("long_name", "ENSO difference");

    if config.verbose {
        print_field_summary("El Niño mean", &el_nino.mean);
        print_field_summary("La Niña mean", &la_nina.mean);
        print_field_summary("El Niño std", &el_nino.std);
        print_field_summary("La Niña std", &la_nina.std);
        print_field_summary("Difference", &difference);
        print_field_summary("p-values", &p_values);
    }

    Ok(CompositeAnalysis {
        month: config.month.clone(),
        ensemble_dim: config.ensemble_dim.clone(),
        mode: config.mode,
        el_nino,
        la_nina,
        difference,
        p_values,
    })
}

impl CompositeAnalysis {
    /// Write means, stds, difference and p-values to one NetCDF file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write_netcdf(&self, output_path: &Path) -> Result<()> {
        let var = &self.el_nino.mean.name;
        let mut owned: Vec<(String, Field)> = Vec::new();
        for composite in [&self.el_nino, &self.la_nina] {
            // the members of each phase are different years
            let slug = composite.phase.slug();
            let member_dim = format!("{}_{slug}", self.ensemble_dim);
            owned.push((
                format!("{var}_mean_{slug}"),
                composite.mean.renamed_dim(&self.ensemble_dim, &member_dim),
            ));
            owned.push((
                format!("{var}_std_{slug}"),
                composite.std.renamed_dim(&self.ensemble_dim, &member_dim),
            ));
        }
        owned.push((format!("{var}_difference"), self.difference.clone()));
        owned.push(("p_value".to_string(), self.p_values.clone()));

        let fields: Vec<(String, &Field)> = owned.iter().map(|(name, field)| (name.clone(), field)).collect();
        NetCDFWriter::new(output_path).write_fields(&fields)
    }
}
