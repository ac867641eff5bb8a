//! Synthetic MUAM run directories for tests

use netcdf::create;
use std::fs;
use std::path::{Path, PathBuf};

pub const TIMES: usize = 2;
pub const LEVS: [f32; 3] = [0.0, 20.0, 40.0];
pub const LATS: [f32; 4] = [-60.0, -20.0, 20.0, 60.0];
pub const LONS: [f32; 2] = [0.0, 180.0];

/// Write a MUAM-style member file with `tem(time, levs, lats, lons)`
///
/// `value(t, lev, lat, lon)` gives each grid value by index.
pub fn write_member<F>(path: &Path, lats: &[f32], value: F) -> Result<(), netcdf::Error>
where
    F: Fn(usize, usize, usize, usize) -> f32,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create run directory");
    }
    let mut file = create(path)?;

    file.add_dimension("time", TIMES)?;
    file.add_dimension("levs", LEVS.len())?;
    file.add_dimension("lats", lats.len())?;
    file.add_dimension("lons", LONS.len())?;

    {
        let mut var = file.add_variable::<f64>("time", &["time"])?;
        var.put_attribute("units", "days since 2000-01-01")?;
        var.put_values(&[0.0, 15.0], ..)?;
    }
    {
        let mut var = file.add_variable::<f32>("levs", &["levs"])?;
        var.put_attribute("units", "km")?;
        var.put_values(&LEVS, ..)?;
    }
    {
        let mut var = file.add_variable::<f32>("lats", &["lats"])?;
        var.put_attribute("units", "degrees_north")?;
        var.put_values(lats, ..)?;
    }
    {
        let mut var = file.add_variable::<f32>("lons", &["lons"])?;
        var.put_attribute("units", "degrees_east")?;
        var.put_values(&LONS, ..)?;
    }

    let mut data = Vec::with_capacity(TIMES * LEVS.len() * lats.len() * LONS.len());
    for t in 0..TIMES {
        for l in 0..LEVS.len() {
            for y in 0..lats.len() {
                for x in 0..LONS.len() {
                    data.push(value(t, l, y, x));
                }
            }
        }
    }

    let mut tem = file.add_variable::<f32>("tem", &["time", "levs", "lats", "lons"])?;
    tem.put_attribute("units", "K")?;
    tem.put_attribute("long_name", "temperature")?;
    tem.put_attribute("_FillValue", -999.0f32)?;
    tem.put_values(&data, ..)?;

    Ok(())
}

/// Member file path of a run directory under `root`
pub fn member_path(root: &Path, year: i32, month: &str) -> PathBuf {
    root.join(format!("muam_{year}_{month}"))
        .join("nc")
        .join(format!("muam_{month}330.nc"))
}

/// Three El Niño and three La Niña January runs
///
/// Both phases share member noise `0.1 * k`; El Niño is 5 K warmer at the
/// southernmost latitude only.
pub fn write_run_tree(root: &Path) -> Result<(), netcdf::Error> {
    for (k, year) in [1983, 1992, 1998].into_iter().enumerate() {
        write_member(&member_path(root, year, "Jan"), &LATS, |t, l, y, _| {
            let shift = if y == 0 { 5.0 } else { 0.0 };
            250.0 + 10.0 * l as f32 + shift + 0.1 * k as f32 + 0.01 * t as f32
        })?;
    }
    for (k, year) in [1989, 1999, 2000].into_iter().enumerate() {
        write_member(&member_path(root, year, "Jan"), &LATS, |t, l, _, _| {
            250.0 + 10.0 * l as f32 + 0.1 * k as f32 + 0.01 * t as f32
        })?;
    }

    // distractors: wrong month, and a plain file with a matching name
    fs::create_dir_all(root.join("muam_1983_Feb")).expect("Failed to create run directory");
    fs::write(root.join("notes_1992_Jan"), "not a run").expect("Failed to write file");
    Ok(())
}
