// Static snapshot of a figure's current state, drawn with plotters

use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::data::{RecordSet, Value};
use crate::figure::{Figure, Glyph, Renderer};
use crate::kind::{ColorMapper, MarkerShape};
use crate::palette;

const DEFAULT_MARKER_SIZE: f64 = 6.0;
const DEFAULT_LINE_WIDTH: f64 = 1.0;
/// Largest bitmap the PNG snapshot will allocate (8192 x 8192)
pub const MAX_CANVAS_PIXELS: usize = 8192 * 8192;

/// Bitmap canvas a figure is rasterized onto
pub struct Canvas {
    buffer: Vec<u8>,
    width: u32,
    height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            anyhow::bail!("Cannot create a {}x{} canvas", width, height);
        }
        let pixels = (width as usize)
            .checked_mul(height as usize)
            .filter(|&n| n <= MAX_CANVAS_PIXELS)
            .with_context(|| {
                format!(
                    "A {}x{} canvas exceeds the {} pixel limit",
                    width, height, MAX_CANVAS_PIXELS
                )
            })?;
        Ok(Canvas {
            buffer: vec![0u8; pixels * 3],
            width,
            height,
        })
    }

    /// Draw every renderer of `figure` with its currently bound data
    pub fn draw(&mut self, figure: &Figure) -> Result<()> {
        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        draw_figure(&root, figure)?;
        root.present().context("Failed to present drawing")?;
        Ok(())
    }

    /// Finalize and encode the canvas as PNG
    pub fn render(self) -> Result<Vec<u8>> {
        let mut png_bytes = Vec::new();
        {
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder
                .write_image(&self.buffer, self.width, self.height, image::ColorType::Rgb8)
                .context("Failed to encode PNG")?;
        }

        Ok(png_bytes)
    }
}

/// Render `figure` to PNG bytes
pub fn render_png(figure: &Figure, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut canvas = Canvas::new(width, height)?;
    canvas.draw(figure)?;
    canvas.render()
}

/// Render `figure` to an SVG document
pub fn render_svg(figure: &Figure, width: u32, height: u32) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw_figure(&root, figure)?;
        root.present().context("Failed to present drawing")?;
    }
    Ok(svg)
}

fn draw_figure<DB>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    let ((x0, x1), (y0, y1)) = figure.bounds();
    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(&figure.config().title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x0..x1, y0..y1)
        .context("Failed to build chart")?;

    chart
        .configure_mesh()
        .x_labels(figure.config().x_ticker.desired_ticks())
        .y_labels(figure.config().y_ticker.desired_ticks())
        .draw()
        .context("Failed to draw mesh")?;

    for renderer in figure.renderers() {
        match renderer.glyph() {
            Glyph::Line => draw_line(&mut chart, renderer)?,
            Glyph::Scatter { marker } => draw_markers(&mut chart, renderer, *marker)?,
            Glyph::Bar { width } => draw_bars(&mut chart, renderer, *width)?,
            Glyph::Image { mapper } => draw_image(&mut chart, renderer, mapper)?,
        }
    }

    Ok(())
}

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn draw_line<DB>(chart: &mut Chart<'_, DB>, renderer: &Renderer) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let data = renderer.data();
    let points = xy_points(data, "x", "y");
    let color = style_color(renderer);
    let width = renderer.style().line_width.unwrap_or(DEFAULT_LINE_WIDTH).max(1.0) as u32;

    chart
        .draw_series(LineSeries::new(points, color.stroke_width(width)))
        .context("Failed to draw line series")?;
    Ok(())
}

fn draw_markers<DB>(chart: &mut Chart<'_, DB>, renderer: &Renderer, marker: MarkerShape) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let data = renderer.data();
    let base_color = style_color(renderer);
    let base_size = renderer.style().size.unwrap_or(DEFAULT_MARKER_SIZE);

    for (idx, (x, y)) in indexed_points(data, "x", "y") {
        let color = row_color(data, idx, renderer).unwrap_or(base_color);
        let size = cell(data, "size", idx).and_then(Value::as_f64).unwrap_or(base_size);
        let shape = cell(data, "marker", idx)
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<MarkerShape>().ok())
            .unwrap_or(marker);
        let r = ((size / 2.0).round() as i32).max(1);
        let filled = color.filled();
        let stroke = color.stroke_width(1);

        let drawn = match shape {
            MarkerShape::Circle | MarkerShape::Dot => chart
                .draw_series(std::iter::once(Circle::new((x, y), r, filled))),
            MarkerShape::Square => chart.draw_series(std::iter::once(
                EmptyElement::at((x, y)) + Rectangle::new([(-r, -r), (r, r)], filled),
            )),
            MarkerShape::Triangle => chart
                .draw_series(std::iter::once(TriangleMarker::new((x, y), r, filled))),
            MarkerShape::InvertedTriangle => chart.draw_series(std::iter::once(
                EmptyElement::at((x, y)) + Polygon::new(vec![(-r, -r), (r, -r), (0, r)], filled),
            )),
            MarkerShape::Diamond => chart.draw_series(std::iter::once(
                EmptyElement::at((x, y)) + Polygon::new(vec![(0, -r), (r, 0), (0, r), (-r, 0)], filled),
            )),
            MarkerShape::X => chart.draw_series(std::iter::once(Cross::new((x, y), r, stroke))),
            MarkerShape::Cross => chart.draw_series(std::iter::once(
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(-r, 0), (r, 0)], stroke)
                    + PathElement::new(vec![(0, -r), (0, r)], stroke),
            )),
            MarkerShape::Asterisk => chart.draw_series(std::iter::once(
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(-r, 0), (r, 0)], stroke)
                    + PathElement::new(vec![(0, -r), (0, r)], stroke)
                    + PathElement::new(vec![(-r, -r), (r, r)], stroke)
                    + PathElement::new(vec![(-r, r), (r, -r)], stroke),
            )),
        };
        drawn.context("Failed to draw marker")?;
    }
    Ok(())
}

fn draw_bars<DB>(chart: &mut Chart<'_, DB>, renderer: &Renderer, width: f64) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let data = renderer.data();
    let base_color = style_color(renderer);

    for (idx, (x, top)) in indexed_points(data, "x", "top") {
        let color = row_color(data, idx, renderer).unwrap_or(base_color);
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(x - width / 2.0, 0.0), (x + width / 2.0, top)],
                color.filled(),
            )))
            .context("Failed to draw bar")?;
    }
    Ok(())
}

fn draw_image<DB>(chart: &mut Chart<'_, DB>, renderer: &Renderer, mapper: &ColorMapper) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let data = renderer.data();
    let alpha = renderer.style().alpha.unwrap_or(1.0);

    for idx in 0..data.len() {
        let Some(grid) = cell(data, "image", idx).and_then(Value::as_grid) else {
            continue;
        };
        let num = |name: &str| cell(data, name, idx).and_then(Value::as_f64).unwrap_or(0.0);
        let (x0, y0, dw, dh) = (num("x"), num("y"), num("dw"), num("dh"));

        let rows = grid.len();
        let cols = grid.first().map_or(0, |r| r.len());
        if rows == 0 || cols == 0 {
            continue;
        }
        let (lo, hi) = grid
            .iter()
            .flatten()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        let cell_w = dw / cols as f64;
        let cell_h = dh / rows as f64;

        // Row 0 sits at the bottom of the image
        let cells = grid.iter().enumerate().flat_map(|(r, row)| {
            row.iter().enumerate().filter_map(move |(c, &v)| {
                let slot = mapper.slot(v, lo, hi)?;
                let color = mapper.palette().get(slot).map(|hex| to_rgb(hex))?;
                let left = x0 + c as f64 * cell_w;
                let bottom = y0 + r as f64 * cell_h;
                Some(Rectangle::new(
                    [(left, bottom), (left + cell_w, bottom + cell_h)],
                    color.mix(alpha).filled(),
                ))
            })
        });
        chart.draw_series(cells).context("Failed to draw image")?;
    }
    Ok(())
}

fn xy_points(data: &RecordSet, x: &str, y: &str) -> Vec<(f64, f64)> {
    indexed_points(data, x, y).into_iter().map(|(_, p)| p).collect()
}

/// Finite numeric points paired with the row they came from
fn indexed_points(data: &RecordSet, x: &str, y: &str) -> Vec<(usize, (f64, f64))> {
    match (data.column(x), data.column(y)) {
        (Some(xs), Some(ys)) => xs
            .iter()
            .zip(ys)
            .enumerate()
            .filter_map(|(idx, (x, y))| Some((idx, (x.as_f64()?, y.as_f64()?))))
            .filter(|(_, (x, y))| x.is_finite() && y.is_finite())
            .collect(),
        _ => Vec::new(),
    }
}

fn cell<'a>(data: &'a RecordSet, column: &str, idx: usize) -> Option<&'a Value> {
    data.column(column).and_then(|c| c.get(idx))
}

fn style_color(renderer: &Renderer) -> RGBAColor {
    let style = renderer.style();
    let color = style.color.as_deref().map(to_rgb).unwrap_or(BLUE);
    color.mix(style.alpha.unwrap_or(1.0))
}

fn row_color(data: &RecordSet, idx: usize, renderer: &Renderer) -> Option<RGBAColor> {
    let hex = cell(data, "color", idx)?.as_str()?;
    Some(to_rgb(hex).mix(renderer.style().alpha.unwrap_or(1.0)))
}

fn to_rgb(color: &str) -> RGBColor {
    match palette::parse_rgb(color) {
        Some((r, g, b)) => RGBColor(r, g, b),
        None => BLUE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{image, plot};
    use crate::figure::FigureConfig;
    use crate::kind::PlotKind;
    use crate::options::PlotOptions;
    use crate::palette::ColorCycle;

    fn is_valid_png(bytes: &[u8]) -> bool {
        bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
    }

    fn sample_figure() -> Figure {
        let mut fig = Figure::new(FigureConfig::titled("Snapshot"));
        let mut cycle = ColorCycle::default();
        plot(&mut fig, &mut cycle, PlotKind::Line, vec![0.0, 1.0, 2.0], vec![1.0, 3.0, 2.0], PlotOptions::new())
            .unwrap();
        plot(
            &mut fig,
            &mut cycle,
            PlotKind::Marker(MarkerShape::Diamond),
            vec![0.0, 1.0, 2.0],
            vec![2.0, 1.0, 3.0],
            PlotOptions::new()
                .color_indices(vec![1, 2, 1])
                .markers(vec![MarkerShape::Square, MarkerShape::Asterisk, MarkerShape::InvertedTriangle]),
        )
        .unwrap();
        plot(&mut fig, &mut cycle, PlotKind::Bar, vec![0.0, 1.0], vec![1.0, 2.0], PlotOptions::new().width(0.5))
            .unwrap();
        fig
    }

    #[test]
    fn test_to_rgb_fallback() {
        assert_eq!(to_rgb("#ff0000"), RGBColor(255, 0, 0));
        assert_eq!(to_rgb("not a color"), BLUE);
    }

    #[test]
    fn test_xy_points_skips_non_numeric() {
        let mut data = RecordSet::new();
        data.insert("x", vec![Value::from(1.0), Value::from("a"), Value::from(3.0)]).unwrap();
        data.insert("y", vec![Value::from(1.0), Value::from(2.0), Value::from(f64::NAN)]).unwrap();
        assert_eq!(xy_points(&data, "x", "y"), vec![(1.0, 1.0)]);
        assert!(indexed_points(&data, "x", "missing").is_empty());
    }

    #[test]
    fn test_canvas_rejects_zero_size() {
        assert!(Canvas::new(0, 10).is_err());
    }

    #[test]
    fn test_oversized_canvas_fails_cleanly() {
        assert!(Canvas::new(70000, 70000).is_err());
        assert!(Canvas::new(u32::MAX, u32::MAX).is_err());
        let err = render_png(&sample_figure(), 70000, 70000).unwrap_err();
        assert!(err.to_string().contains("pixel limit"));
    }

    #[test]
    fn test_render_png() {
        let png = render_png(&sample_figure(), 320, 240).unwrap();
        assert!(is_valid_png(&png));
    }

    #[test]
    fn test_render_svg_with_image() {
        let mut fig = Figure::new(FigureConfig::default());
        image(&mut fig, vec![vec![0.0, 1.0], vec![2.0, 3.0]], PlotOptions::new()).unwrap();
        let svg = render_svg(&fig, 200, 200).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<rect"));
    }
}
