//! Entry point for muam_enso.
//! Parses the CLI, runs the composite analysis, and writes the plot and
//! optional NetCDF export.

use clap::Parser;
use muam_enso::cli::Args;
use muam_enso::netcdf_io::Preprocess;
use muam_enso::parallel::get_parallel_info;
use muam_enso::pipeline::run_analysis;
use muam_enso::render::{render_comparison, RenderOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!(
        r#"
------------------------------------------------------------------
              MUAM ENSO composites · Welch significance
------------------------------------------------------------------
"#
    );

    args.parallel_config().setup_global_pool()?;
    if args.verbose {
        get_parallel_info().print_info();
    }

    let config = args.analysis_config();
    let analysis = run_analysis(&config, &Preprocess::default())?;

    render_comparison(&analysis, &RenderOptions::new(args.plot_path()))?;

    if let Some(output_path) = &args.output_netcdf {
        analysis.write_netcdf(output_path)?;
        println!("✅ Saved results to {}", output_path.display());
    }

    Ok(())
}
