//! Creates a synthetic MUAM run tree for trying out muam_enso.
//!
//! Writes one `<root>/muam_<year>_Jan/nc/muam_Jan330.nc` file per default
//! El Niño and La Niña year. El Niño runs carry a warm anomaly in the
//! southern middle atmosphere so the significance hatching has something
//! to show.
//!
//! Usage: `cargo run --example create_test_ensemble -- [root]`

use muam_enso::config::{EL_NINO_YEARS, LA_NINA_YEARS};
use netcdf::create;
use std::f32::consts::PI;
use std::path::{Path, PathBuf};

const MONTH: &str = "Jan";
const N_TIME: usize = 30;
const N_LEV: usize = 25;
const N_LAT: usize = 36;
const N_LON: usize = 16;

fn write_run(root: &Path, year: i32, member: usize, anomaly: f32) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let run_dir = root.join(format!("muam_{year}_{MONTH}")).join("nc");
    std::fs::create_dir_all(&run_dir)?;
    let path = run_dir.join(format!("muam_{MONTH}330.nc"));
    if path.exists() {
        std::fs::remove_file(&path)?
    }

    let mut file = create(&path)?;
    file.add_attribute("title", "Synthetic MUAM run")?;
    file.add_attribute("created_by", "create_test_ensemble.rs")?;

    file.add_dimension("time", N_TIME)?;
    file.add_dimension("levs", N_LEV)?;
    file.add_dimension("lats", N_LAT)?;
    file.add_dimension("lons", N_LON)?;

    let levs: Vec<f32> = (0..N_LEV).map(|i| i as f32 * 5.0).collect();
    let lats: Vec<f32> = (0..N_LAT).map(|i| -87.5 + i as f32 * 5.0).collect();
    let lons: Vec<f32> = (0..N_LON).map(|i| i as f32 * 360.0 / N_LON as f32).collect();

    {
        let mut var = file.add_variable::<f64>("time", &["time"])?;
        var.put_attribute("units", "hours since 2000-01-01")?;
        let times: Vec<f64> = (0..N_TIME).map(|i| i as f64 * 2.0).collect();
        var.put_values(&times, ..)?;
    }
    {
        let mut var = file.add_variable::<f32>("levs", &["levs"])?;
        var.put_attribute("units", "km")?;
        var.put_values(&levs, ..)?;
    }
    {
        let mut var = file.add_variable::<f32>("lats", &["lats"])?;
        var.put_attribute("units", "degrees_north")?;
        var.put_values(&lats, ..)?;
    }
    {
        let mut var = file.add_variable::<f32>("lons", &["lons"])?;
        var.put_attribute("units", "degrees_east")?;
        var.put_values(&lons, ..)?;
    }

    // Simple seeded noise so every member differs but reruns are reproducible
    let mut state = (year as u64).wrapping_mul(6364136223846793005).wrapping_add(member as u64);
    let mut noise = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((state >> 33) as f32 / (1u64 << 31) as f32) - 0.5
    };

    let mut data = Vec::with_capacity(N_TIME * N_LEV * N_LAT * N_LON);
    for t in 0..N_TIME {
        for (l, &z) in levs.iter().enumerate() {
            for &lat in &lats {
                for &lon in &lons {
                    let base = 220.0 + 40.0 * (z / 40.0 - 1.5).powi(2) / 2.0 - 30.0 * (lat * PI / 180.0).cos();
                    let wave = 2.0 * (lon * PI / 180.0 + t as f32 * 0.2).sin();
                    let bump = if (-60.0..=-30.0).contains(&lat) && (50.0..=90.0).contains(&z) {
                        anomaly
                    } else {
                        0.0
                    };
                    data.push(base + wave + bump + 1.5 * noise() + 0.01 * l as f32);
                }
            }
        }
    }

    let mut tem = file.add_variable::<f32>("tem", &["time", "levs", "lats", "lons"])?;
    tem.put_attribute("units", "K")?;
    tem.put_attribute("long_name", "temperature")?;
    tem.put_values(&data, ..)?;

    Ok(path)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("muam_test_runs"));

    println!("🔨 Creating synthetic MUAM runs under {}", root.display());

    for (member, &year) in EL_NINO_YEARS.iter().enumerate() {
        let path = write_run(&root, year, member, 4.0)?;
        println!("  🔥 El Niño {}: {}", year, path.display());
    }
    for (member, &year) in LA_NINA_YEARS.iter().enumerate() {
        let path = write_run(&root, year, member, 0.0)?;
        println!("  ❄️  La Niña {}: {}", year, path.display());
    }

    println!("✅ Done. Try: muam_enso --root {} --plot enso_Jan.png", root.display());
    Ok(())
}
