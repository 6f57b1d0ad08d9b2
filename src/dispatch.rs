// Plot dispatcher: normalize column data into a record set and route it to
// the renderer for the requested kind.

use crate::data::{RecordSet, Value};
use crate::error::{PlotError, PlotResult};
use crate::figure::{Figure, Glyph, GlyphStyle, RendererId};
use crate::kind::PlotKind;
use crate::options::{Channel, ColorSpec, PlotOptions};
use crate::palette::{palette_color, ColorCycle};

pub const DEFAULT_BAR_WIDTH: f64 = 1.0;

// Option names that have typed fields and must not leak through `style`
const RECOGNIZED_KEYS: [&str; 3] = ["color", "marker", "size"];

/// Plot `x`/`y` data as a line, bar or marker glyph.
///
/// For bars `y` is the bar height and is bound as the `top` column. When no
/// color is given the next color of `cycle` is used; the cycle only advances
/// if the call succeeds.
pub fn plot(
    figure: &mut Figure,
    cycle: &mut ColorCycle,
    kind: PlotKind,
    x: Vec<f64>,
    y: Vec<f64>,
    options: PlotOptions,
) -> PlotResult<RendererId> {
    let n = x.len();
    let y_column = match kind {
        PlotKind::Bar => "top",
        _ => "y",
    };
    check_len(y_column, n, y.len())?;

    let PlotOptions {
        color,
        marker,
        size,
        width,
        line_width,
        alpha,
        legend,
        color_mapper: _,
        style: mut extra,
    } = options;

    let glyph = match kind {
        PlotKind::Line => Glyph::Line,
        PlotKind::Bar => Glyph::Bar {
            width: width.unwrap_or(DEFAULT_BAR_WIDTH),
        },
        PlotKind::Marker(shape) => match &marker {
            Some(Channel::Fixed(fixed)) => Glyph::Scatter { marker: *fixed },
            _ => Glyph::Scatter { marker: shape },
        },
        PlotKind::Image => return Err(PlotError::unsupported("glyph for x/y data", "image")),
    };

    if !matches!(kind, PlotKind::Marker(_)) && matches!(marker, Some(Channel::Fixed(_))) {
        return Err(PlotError::unsupported("marker for glyph", kind.to_string()));
    }
    if kind != PlotKind::Bar && width.is_some() {
        return Err(PlotError::unsupported("bar width for glyph", kind.to_string()));
    }

    let mut data = RecordSet::new();
    data.insert("x", numbers(x))?;
    data.insert(y_column, numbers(y))?;

    for key in RECOGNIZED_KEYS {
        if extra.remove(key).is_some() {
            log::warn!(target: "plotwire", "ignoring '{}' in passthrough style; use the typed option", key);
        }
    }

    let mut style = GlyphStyle {
        line_width,
        alpha,
        legend,
        extra,
        ..GlyphStyle::default()
    };

    if let Some(Channel::PerPoint(shapes)) = marker {
        if !matches!(kind, PlotKind::Marker(_)) {
            return Err(PlotError::unsupported("per-point marker for glyph", kind.to_string()));
        }
        check_len("marker", n, shapes.len())?;
        data.insert("marker", shapes.iter().map(|s| Value::from(s.name())).collect())?;
    }

    match size {
        Some(Channel::Fixed(s)) => style.size = Some(s),
        Some(Channel::PerPoint(sizes)) => {
            check_len("size", n, sizes.len())?;
            data.insert("size", numbers(sizes))?;
        }
        None => {}
    }

    let mut next_cycle = cycle.clone();
    match color {
        Some(ColorSpec::Fixed(c)) => style.color = Some(c),
        Some(ColorSpec::Indexed(indices)) => {
            check_len("color", n, indices.len())?;
            data.insert("color", resolve_color_indices(&indices)?)?;
        }
        None => style.color = Some(next_cycle.next_color()),
    }

    let id = figure.add_glyph(glyph, data, style)?;
    *cycle = next_cycle;

    log::debug!(target: "plotwire", "plot {} -> {} ({} points)", kind, id, n);
    Ok(id)
}

/// Plot by glyph name, e.g. `"line"`, `"vbar"` or `"circle"`
pub fn plot_named(
    figure: &mut Figure,
    cycle: &mut ColorCycle,
    name: &str,
    x: Vec<f64>,
    y: Vec<f64>,
    options: PlotOptions,
) -> PlotResult<RendererId> {
    let kind: PlotKind = name.parse()?;
    plot(figure, cycle, kind, x, y, options)
}

/// Plot a single 2-D grid as an image anchored at the origin.
///
/// The record set has one row: the grid itself, origin `(0, 0)` and extents
/// equal to the grid's column and row counts.
pub fn image(figure: &mut Figure, grid: Vec<Vec<f64>>, options: PlotOptions) -> PlotResult<RendererId> {
    let (rows, cols) = grid_shape(&grid)?;

    let PlotOptions {
        color,
        marker,
        size,
        width,
        line_width,
        alpha,
        legend,
        color_mapper,
        style: extra,
    } = options;

    // Image colors come from the mapper only
    match color {
        Some(ColorSpec::Indexed(_)) => return Err(PlotError::unsupported("image option", "per-point color")),
        Some(ColorSpec::Fixed(_)) => return Err(PlotError::unsupported("image option", "color")),
        None => {}
    }
    if width.is_some() {
        return Err(PlotError::unsupported("image option", "width"));
    }
    if line_width.is_some() {
        return Err(PlotError::unsupported("image option", "line width"));
    }
    if marker.is_some() {
        return Err(PlotError::unsupported("image option", "marker"));
    }
    if size.is_some() {
        return Err(PlotError::unsupported("image option", "size"));
    }

    let mut data = RecordSet::new();
    data.insert("image", vec![Value::Grid(grid)])?;
    data.insert("x", vec![Value::Number(0.0)])?;
    data.insert("y", vec![Value::Number(0.0)])?;
    data.insert("dw", vec![Value::from(cols)])?;
    data.insert("dh", vec![Value::from(rows)])?;

    let style = GlyphStyle {
        alpha,
        legend,
        extra,
        ..GlyphStyle::default()
    };
    let glyph = Glyph::Image {
        mapper: color_mapper.unwrap_or_default(),
    };

    let id = figure.add_glyph(glyph, data, style)?;
    log::debug!(target: "plotwire", "image {}x{} -> {}", cols, rows, id);
    Ok(id)
}

/// Shape of a rectangular, non-empty grid as (rows, cols)
pub(crate) fn grid_shape(grid: &[Vec<f64>]) -> PlotResult<(usize, usize)> {
    let cols = grid
        .first()
        .map(|row| row.len())
        .ok_or_else(|| PlotError::InvalidGrid("grid has no rows".to_string()))?;
    if cols == 0 {
        return Err(PlotError::InvalidGrid("grid has no columns".to_string()));
    }
    if let Some((idx, row)) = grid.iter().enumerate().find(|(_, row)| row.len() != cols) {
        return Err(PlotError::InvalidGrid(format!(
            "row {} has {} values, expected {}",
            idx,
            row.len(),
            cols
        )));
    }
    Ok((grid.len(), cols))
}

/// Map 1-based category indices through a palette sized to the largest index.
///
/// Colors are computed per index, so a huge index costs no more than a small one.
pub fn resolve_color_indices(indices: &[usize]) -> PlotResult<Vec<Value>> {
    let max = indices.iter().copied().max().unwrap_or(0);

    indices
        .iter()
        .enumerate()
        .map(|(position, &index)| {
            index
                .checked_sub(1)
                .and_then(|slot| palette_color(max, slot))
                .map(Value::Text)
                .ok_or(PlotError::InvalidColorIndex { position, index })
        })
        .collect()
}

fn check_len(column: &str, expected: usize, actual: usize) -> PlotResult<()> {
    if expected != actual {
        return Err(PlotError::ColumnLengthMismatch {
            column: column.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn numbers(values: Vec<f64>) -> Vec<Value> {
    values.into_iter().map(Value::Number).collect()
}
