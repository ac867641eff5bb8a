//! Contour maps of the composites with significance hatching
//!
//! Every panel is a 2-D field (altitude × latitude after zonal averaging)
//! drawn as filled, discretised contour levels. The difference panel is
//! overlaid with hatching wherever the Welch p-value falls below each
//! configured threshold. PNG and SVG output are chosen by file extension.

use crate::errors::{EnsoError, Result};
use crate::field::Field;
use crate::pipeline::CompositeAnalysis;
use crate::statistics::{reduce_over, StatOperation};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::PathBuf;

fn render_error<E: std::fmt::Display>(error: E) -> EnsoError {
    EnsoError::RenderError(error.to_string())
}

/// Orientation of hatch lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HatchDirection {
    /// `\\` lines, falling left to right
    Backward,
    /// `//` lines, rising left to right
    Forward,
}

/// Hatch cells whose p-value is below `threshold`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignificanceHatch {
    pub threshold: f64,
    pub direction: HatchDirection,
    /// Lines per grid cell
    pub density: usize,
}

/// Plot settings
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub contour_levels: usize,
    /// Drawn in order, later hatches on top
    pub hatches: Vec<SignificanceHatch>,
}

impl RenderOptions {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            width: 1600,
            height: 1500,
            contour_levels: 10,
            hatches: vec![
                SignificanceHatch {
                    threshold: 0.05,
                    direction: HatchDirection::Backward,
                    density: 2,
                },
                SignificanceHatch {
                    threshold: 0.01,
                    direction: HatchDirection::Forward,
                    density: 4,
                },
            ],
        }
    }

    fn validate(&self) -> Result<()> {
        if self.contour_levels == 0 {
            return Err(EnsoError::InvalidConfig("at least one contour level is required".into()));
        }
        if let Some(h) = self.hatches.iter().find(|h| !(h.threshold > 0.0 && h.threshold < 1.0)) {
            return Err(EnsoError::InvalidConfig(format!(
                "significance threshold {} is outside (0, 1)",
                h.threshold
            )));
        }
        Ok(())
    }
}

/// Colour ramp for filled contours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    /// Dark blue to yellow, for one-signed fields
    Sequential,
    /// Blue through white to red, for differences around zero
    Diverging,
}

impl Palette {
    const SEQUENTIAL: [(u8, u8, u8); 5] = [
        (68, 1, 84),
        (59, 82, 139),
        (33, 145, 140),
        (94, 201, 98),
        (253, 231, 37),
    ];
    const DIVERGING: [(u8, u8, u8); 5] = [
        (5, 48, 97),
        (67, 147, 195),
        (247, 247, 247),
        (214, 96, 77),
        (103, 0, 31),
    ];

    /// Colour at position `t` in [0, 1]
    pub fn color(self, t: f64) -> RGBColor {
        let stops = match self {
            Self::Sequential => &Self::SEQUENTIAL,
            Self::Diverging => &Self::DIVERGING,
        };
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t * (stops.len() - 1) as f64;
        let i = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - i as f64;
        let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * frac).round() as u8;
        let (a, b) = (stops[i], stops[i + 1]);
        RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
    }
}

/// Evenly spaced contour level edges
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLevels {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

impl ContourLevels {
    /// Levels covering the finite values of all `fields`; symmetric around
    /// zero when `symmetric` is set
    pub fn spanning(fields: &[&Field], count: usize, symmetric: bool) -> Self {
        let range = fields
            .iter()
            .filter_map(|f| f.finite_range())
            .reduce(|(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)));

        let (mut lo, mut hi) = range.unwrap_or((0.0, 1.0));
        if symmetric {
            let m = lo.abs().max(hi.abs());
            let m = if m > 0.0 { m } else { 1.0 };
            lo = -m;
            hi = m;
        } else if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        Self {
            lo,
            hi,
            count: count.max(1),
        }
    }

    /// Index of the level band containing `value`
    pub fn band(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }
        let t = (value - self.lo) / (self.hi - self.lo);
        let band = (t * self.count as f64).floor();
        Some((band.max(0.0) as usize).min(self.count - 1))
    }

    /// `(lower, upper)` value of a band
    pub fn band_bounds(&self, band: usize) -> (f64, f64) {
        let step = (self.hi - self.lo) / self.count as f64;
        let lower = self.lo + step * band as f64;
        (lower, lower + step)
    }

    pub fn band_color(&self, band: usize, palette: Palette) -> RGBColor {
        palette.color((band as f64 + 0.5) / self.count as f64)
    }
}

/// Cell edges around coordinate centres, extrapolating half a step at the ends
pub fn cell_bounds(centres: &[f64]) -> Vec<(f64, f64)> {
    match centres {
        [] => Vec::new(),
        [only] => vec![(only - 0.5, only + 0.5)],
        _ => {
            let n = centres.len();
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(centres[0] - (centres[1] - centres[0]) / 2.0);
            for pair in centres.windows(2) {
                edges.push((pair[0] + pair[1]) / 2.0);
            }
            edges.push(centres[n - 1] + (centres[n - 1] - centres[n - 2]) / 2.0);
            edges.windows(2).map(|e| (e[0], e[1])).collect()
        }
    }
}

/// Hatch line segments clipped to the cell `[x0, x1] × [y0, y1]`
pub fn hatch_segments(
    direction: HatchDirection,
    density: usize,
    (x0, x1): (f64, f64),
    (y0, y1): (f64, f64),
) -> Vec<[(f64, f64); 2]> {
    let to_cell = |(u, v): (f64, f64)| (x0 + u * (x1 - x0), y0 + v * (y1 - y0));
    (0..density)
        .map(|i| {
            let step = (i + 1) as f64 / (density + 1) as f64;
            let (a, b) = match direction {
                // x - y = c, c in (-1, 1)
                HatchDirection::Forward => {
                    let c = -1.0 + 2.0 * step;
                    if c >= 0.0 {
                        ((c, 0.0), (1.0, 1.0 - c))
                    } else {
                        ((0.0, -c), (1.0 + c, 1.0))
                    }
                }
                // x + y = c, c in (0, 2)
                HatchDirection::Backward => {
                    let c = 2.0 * step;
                    if c <= 1.0 {
                        ((0.0, c), (c, 0.0))
                    } else {
                        ((c - 1.0, 1.0), (1.0, c - 1.0))
                    }
                }
            };
            [to_cell(a), to_cell(b)]
        })
        .collect()
}

/// Average out the ensemble axis if present and require a 2-D result
pub fn display_field(field: &Field, ensemble_dim: &str) -> Result<Field> {
    let field = if field.has_dim(ensemble_dim) {
        reduce_over(field, &[ensemble_dim], StatOperation::Mean)?
    } else {
        field.clone()
    };
    if field.ndim() != 2 {
        return Err(EnsoError::RenderError(format!(
            "cannot map '{}' with dims {:?}; expected two dimensions",
            field.name, field.dims
        )));
    }
    Ok(field)
}

/// Centres along one axis: coordinate values, or indices if there are none
fn axis_centres(field: &Field, axis: usize) -> (Vec<f64>, String) {
    let dim = &field.dims[axis];
    match field.coord(dim) {
        Some(coord) => (coord.values.clone(), coord.label()),
        None => ((0..field.shape()[axis]).map(|i| i as f64).collect(), dim.clone()),
    }
}

fn span(bounds: &[(f64, f64)]) -> (f64, f64) {
    bounds.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(a, b)| {
        (lo.min(a).min(b), hi.max(a).max(b))
    })
}

struct MapPanel<'a> {
    title: String,
    field: Field,
    levels: ContourLevels,
    palette: Palette,
    p_values: Option<&'a Field>,
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    levels: &ContourLevels,
    palette: Palette,
    units: &str,
) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .margin_top(40)
        .margin_bottom(40)
        .margin_right(10)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0_f64..1.0_f64, levels.lo..levels.hi)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(0)
        .y_desc(units)
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series((0..levels.count).map(|band| {
            let (lower, upper) = levels.band_bounds(band);
            Rectangle::new(
                [(0.0, lower), (1.0, upper)],
                levels.band_color(band, palette).filled(),
            )
        }))
        .map_err(render_error)?;
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &MapPanel,
    hatches: &[SignificanceHatch],
) -> Result<()> {
    let (width, _) = area.dim_in_pixel();
    let (map_area, bar_area) = area.split_horizontally((width as i32 - 110).max(1));

    // y is the first dimension (altitude), x the second (latitude)
    let (y_centres, y_label) = axis_centres(&panel.field, 0);
    let (x_centres, x_label) = axis_centres(&panel.field, 1);
    let y_bounds = cell_bounds(&y_centres);
    let x_bounds = cell_bounds(&x_centres);
    let (x_lo, x_hi) = span(&x_bounds);
    let (y_lo, y_hi) = span(&y_bounds);

    let mut chart = ChartBuilder::on(&map_area)
        .caption(&panel.title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .draw()
        .map_err(render_error)?;

    let mut cells = Vec::new();
    for (row, &(y0, y1)) in y_bounds.iter().enumerate() {
        for (col, &(x0, x1)) in x_bounds.iter().enumerate() {
            if let Some(band) = panel.levels.band(panel.field.data[[row, col]]) {
                let color = panel.levels.band_color(band, panel.palette);
                cells.push(Rectangle::new([(x0, y0), (x1, y1)], color.filled()));
            }
        }
    }
    chart.draw_series(cells).map_err(render_error)?;

    if let Some(p_values) = panel.p_values {
        for hatch in hatches {
            let mut lines = Vec::new();
            for (row, &y_cell) in y_bounds.iter().enumerate() {
                for (col, &x_cell) in x_bounds.iter().enumerate() {
                    let p = p_values.data[[row, col]];
                    if p.is_finite() && p < hatch.threshold {
                        for segment in hatch_segments(hatch.direction, hatch.density, x_cell, y_cell) {
                            lines.push(PathElement::new(segment.to_vec(), BLACK.stroke_width(1)));
                        }
                    }
                }
            }
            let direction = hatch.direction;
            chart
                .draw_series(lines)
                .map_err(render_error)?
                .label(format!("p < {}", hatch.threshold))
                .legend(move |(x, y)| {
                    let points = match direction {
                        HatchDirection::Backward => vec![(x, y - 6), (x + 12, y + 6)],
                        HatchDirection::Forward => vec![(x, y + 6), (x + 12, y - 6)],
                    };
                    PathElement::new(points, BLACK.stroke_width(1))
                });
        }
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_error)?;
    }

    let units = panel.field.units().unwrap_or("");
    draw_colorbar(&bar_area, &panel.levels, panel.palette, units)
}

fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    panels: &[MapPanel],
    hatches: &[SignificanceHatch],
) -> Result<()> {
    root.fill(&WHITE).map_err(render_error)?;

    let (_, height) = root.dim_in_pixel();
    let (top, bottom) = root.split_vertically((height as i32) * 3 / 5);

    let grid = top.split_evenly((2, 2));
    let (composites, rest) = panels.split_at(panels.len().min(4));
    for (area, panel) in grid.iter().zip(composites) {
        draw_panel(area, panel, hatches)?;
    }
    if let Some(panel) = rest.first() {
        draw_panel(&bottom, panel, hatches)?;
    }

    root.present().map_err(render_error)?;
    Ok(())
}

fn build_panels<'a>(analysis: &'a CompositeAnalysis, contour_levels: usize) -> Result<Vec<MapPanel<'a>>> {
    let dim = &analysis.ensemble_dim;
    let var = &analysis.el_nino.mean.name;
    let mean_el = display_field(&analysis.el_nino.mean, dim)?;
    let mean_la = display_field(&analysis.la_nina.mean, dim)?;
    let std_el = display_field(&analysis.el_nino.std, dim)?;
    let std_la = display_field(&analysis.la_nina.std, dim)?;
    let difference = display_field(&analysis.difference, dim)?;

    if analysis.p_values.shape() != difference.shape() {
        return Err(EnsoError::DimensionMismatch {
            message: format!(
                "p-values {:?} do not cover difference {:?}",
                analysis.p_values.sizes(),
                difference.sizes()
            ),
        });
    }

    let mean_levels = ContourLevels::spanning(&[&mean_el, &mean_la], contour_levels, false);
    let std_levels = ContourLevels::spanning(&[&std_el, &std_la], contour_levels, false);
    let diff_levels = ContourLevels::spanning(&[&difference], contour_levels, true);

    let std_title = |label: &str| format!("{label} {var} std ({})", analysis.mode.as_str());
    let mean_panel = |label: &str, field: Field| MapPanel {
        title: format!("{label} {var} mean"),
        field,
        levels: mean_levels.clone(),
        palette: Palette::Sequential,
        p_values: None,
    };

    Ok(vec![
        mean_panel(analysis.el_nino.phase.label(), mean_el),
        mean_panel(analysis.la_nina.phase.label(), mean_la),
        MapPanel {
            title: std_title(analysis.el_nino.phase.label()),
            field: std_el,
            levels: std_levels.clone(),
            palette: Palette::Sequential,
            p_values: None,
        },
        MapPanel {
            title: std_title(analysis.la_nina.phase.label()),
            field: std_la,
            levels: std_levels,
            palette: Palette::Sequential,
            p_values: None,
        },
        MapPanel {
            title: format!(
                "Zonally averaged temperature diff. between El-Nino and La-Nina in {}",
                analysis.month
            ),
            field: difference,
            levels: diff_levels,
            palette: Palette::Diverging,
            p_values: Some(&analysis.p_values),
        },
    ])
}

/// Draw means, standard deviations and the hatched difference to one image
///
/// # Errors
///
/// Returns an error for invalid options, fields that are not 2-D after
/// averaging out the ensemble axis, or any drawing/backend failure.
pub fn render_comparison(analysis: &CompositeAnalysis, options: &RenderOptions) -> Result<()> {
    options.validate()?;
    let panels = build_panels(analysis, options.contour_levels)?;
    let size = (options.width, options.height);

    let is_svg = options
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));

    if is_svg {
        let root = SVGBackend::new(&options.output, size).into_drawing_area();
        draw_figure(&root, &panels, &options.hatches)?;
    } else {
        let root = BitMapBackend::new(&options.output, size).into_drawing_area();
        draw_figure(&root, &panels, &options.hatches)?;
    }

    println!("✅ Saved plot to {}", options.output.display());
    Ok(())
}
