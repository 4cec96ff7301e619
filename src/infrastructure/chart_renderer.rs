// Chart rendering with plotters
//
// `.svg` targets go through the SVG backend, which keeps text as markup. Every other
// extension is rendered as a bitmap and encoded by extension (PNG in practice).
// Glyphs come from an embedded DejaVu Sans registered as "sans-serif", so rendering
// does not depend on fonts installed on the host.
use crate::domain::chart::{CategorySeries, ChartStyle};
use crate::error::{AnalysisError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::register_font;
use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

const FONT_FAMILY: &str = "sans-serif";
static EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static FONT_REGISTERED: OnceLock<bool> = OnceLock::new();

fn ensure_font() -> std::result::Result<(), String> {
    let registered = *FONT_REGISTERED
        .get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, EMBEDDED_FONT).is_ok());

    if registered {
        Ok(())
    } else {
        Err("embedded DejaVu Sans font could not be loaded".to_string())
    }
}

/// Draw one line per category and write the figure to `path`.
pub fn render_chart(series: &[CategorySeries], style: &ChartStyle, path: &Path) -> Result<()> {
    ensure_font().map_err(|reason| AnalysisError::ChartRender {
        path: path.to_path_buf(),
        reason,
    })?;

    let size = (style.width_px, style.height_px);
    let is_svg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

    let drawn = if is_svg {
        draw_chart(SVGBackend::new(path, size).into_drawing_area(), series, style)
    } else {
        draw_chart(BitMapBackend::new(path, size).into_drawing_area(), series, style)
    };

    drawn.map_err(|reason| AnalysisError::ChartRender {
        path: path.to_path_buf(),
        reason,
    })
}

fn draw_chart<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    series: &[CategorySeries],
    style: &ChartStyle,
) -> std::result::Result<(), String> {
    root.fill(&WHITE).map_err(|e| e.to_string())?;

    let (years, counts) = axis_ranges(series);

    let mut chart = ChartBuilder::on(&root)
        .caption(&style.title, (FONT_FAMILY, 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(years, counts)
        .map_err(|e| e.to_string())?;

    let background = parse_color(&style.background).unwrap_or_else(|| {
        tracing::warn!("Unknown plot color '{}', using white", style.background);
        WHITE
    });
    chart
        .plotting_area()
        .fill(&background)
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .x_desc(style.x_title.as_str())
        .y_desc(style.y_title.as_str())
        .axis_desc_style((FONT_FAMILY, 14))
        .bold_line_style(BLACK.mix(0.4))
        .light_line_style(BLACK.mix(0.1))
        .draw()
        .map_err(|e| e.to_string())?;

    // Swatch-less first legend row acting as the legend title
    chart
        .draw_series(std::iter::empty::<PathElement<(i32, u32)>>())
        .map_err(|e| e.to_string())?
        .label(style.legend_title.clone());

    for (idx, category) in series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart
            .draw_series(LineSeries::new(
                category.points.iter().map(|p| (p.year, p.count)),
                color.stroke_width(2),
            ))
            .map_err(|e| e.to_string())?
            .label(category.category.clone())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .label_font((FONT_FAMILY, 13))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| e.to_string())?;

    root.present().map_err(|e| e.to_string())?;

    Ok(())
}

/// Year range covering every point and a count range with some headroom.
fn axis_ranges(series: &[CategorySeries]) -> (Range<i32>, Range<u32>) {
    let points = series.iter().flat_map(|s| s.points.iter());

    let (min_year, max_year, max_count) = points.fold(
        (i32::MAX, i32::MIN, 0u32),
        |(lo, hi, top), p| (lo.min(p.year), hi.max(p.year), top.max(p.count)),
    );

    let years = if min_year > max_year {
        0..1
    } else if min_year == max_year {
        min_year..min_year + 1
    } else {
        min_year..max_year
    };

    let headroom = (max_count / 10).max(1);
    (years, 0..max_count + headroom)
}

/// Named colours and `#rrggbb` hex strings.
fn parse_color(raw: &str) -> Option<RGBColor> {
    let raw = raw.trim().to_ascii_lowercase();

    if let Some(hex) = raw.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(RGBColor(channel(0)?, channel(2)?, channel(4)?));
    }

    let color = match raw.as_str() {
        "white" => WHITE,
        "black" => BLACK,
        "blue" => BLUE,
        "red" => RED,
        "green" => GREEN,
        "yellow" => YELLOW,
        "cyan" => CYAN,
        "magenta" => MAGENTA,
        "gray" | "grey" => RGBColor(128, 128, 128),
        "lightgray" | "lightgrey" => RGBColor(211, 211, 211),
        _ => return None,
    };
    Some(color)
}
