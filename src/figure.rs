// Figure (canvas) model: the renderers glyphs are drawn with and the data
// each one is bound to.

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

use crate::data::{RecordSet, Value};
use crate::error::{PlotError, PlotResult};
use crate::kind::{ColorMapper, MarkerShape, PlotKind, Ticker};

/// Figure-level settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    pub x_ticker: Ticker,
    pub y_ticker: Ticker,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            width: 640,
            height: 640,
            x_range: None,
            y_range: None,
            x_ticker: Ticker::default(),
            y_ticker: Ticker::default(),
        }
    }
}

impl FigureConfig {
    pub fn titled<S: Into<String>>(title: S) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Handle to a renderer on a figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RendererId(usize);

impl RendererId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RendererId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "renderer-{}", self.0)
    }
}

/// The visual mark a renderer draws, with its glyph-specific parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Glyph {
    Line,
    Bar { width: f64 },
    Scatter { marker: MarkerShape },
    Image { mapper: ColorMapper },
}

impl Glyph {
    pub fn kind(&self) -> PlotKind {
        match self {
            Glyph::Line => PlotKind::Line,
            Glyph::Bar { .. } => PlotKind::Bar,
            Glyph::Scatter { marker } => PlotKind::Marker(*marker),
            Glyph::Image { .. } => PlotKind::Image,
        }
    }
}

/// Scalar styling applied to every point of a renderer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlyphStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Renderer {
    id: RendererId,
    glyph: Glyph,
    data: RecordSet,
    style: GlyphStyle,
    /// Bumped every time the bound data changes; consumers redraw on change
    revision: u64,
}

impl Renderer {
    pub fn id(&self) -> RendererId {
        self.id
    }

    pub fn glyph(&self) -> &Glyph {
        &self.glyph
    }

    pub fn data(&self) -> &RecordSet {
        &self.data
    }

    pub fn style(&self) -> &GlyphStyle {
        &self.style
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Swap in replacement columns and signal a redraw
    pub(crate) fn replace_columns(&mut self, columns: Vec<(String, Vec<Value>)>) {
        self.data.replace_columns(columns);
        self.revision += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    config: FigureConfig,
    renderers: Vec<Renderer>,
    #[serde(skip)]
    controls_issued: usize,
}

impl Figure {
    pub fn new(config: FigureConfig) -> Self {
        Self {
            config,
            renderers: Vec::new(),
            controls_issued: 0,
        }
    }

    /// Allocate an id for a control attached to this figure
    pub(crate) fn issue_control_id(&mut self) -> usize {
        let id = self.controls_issued;
        self.controls_issued += 1;
        id
    }

    pub fn config(&self) -> &FigureConfig {
        &self.config
    }

    pub fn renderers(&self) -> &[Renderer] {
        &self.renderers
    }

    pub fn renderer(&self, id: RendererId) -> PlotResult<&Renderer> {
        self.renderers
            .get(id.0)
            .ok_or(PlotError::UnknownRenderer(id.0))
    }

    pub(crate) fn renderer_mut(&mut self, id: RendererId) -> PlotResult<&mut Renderer> {
        self.renderers
            .get_mut(id.0)
            .ok_or(PlotError::UnknownRenderer(id.0))
    }

    /// Attach a glyph bound to `data`. Every column the glyph draws from must
    /// already be present.
    pub fn add_glyph(&mut self, glyph: Glyph, data: RecordSet, style: GlyphStyle) -> PlotResult<RendererId> {
        for column in glyph.kind().required_columns() {
            data.require(column)?;
        }

        let id = RendererId(self.renderers.len());
        self.renderers.push(Renderer {
            id,
            glyph,
            data,
            style,
            revision: 0,
        });
        Ok(id)
    }

    /// Axis ranges: configured ranges win, otherwise the padded extent of all
    /// numeric data currently bound.
    pub fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        let mut x = Extent::default();
        let mut y = Extent::default();

        for renderer in &self.renderers {
            let data = &renderer.data;
            let nums = |name: &str| -> Vec<f64> {
                data.column(name)
                    .map(|c| c.iter().filter_map(Value::as_f64).collect())
                    .unwrap_or_default()
            };
            match &renderer.glyph {
                Glyph::Line | Glyph::Scatter { .. } => {
                    nums("x").into_iter().for_each(|v| x.include(v));
                    nums("y").into_iter().for_each(|v| y.include(v));
                }
                Glyph::Bar { width } => {
                    for v in nums("x") {
                        x.include(v - width / 2.0);
                        x.include(v + width / 2.0);
                    }
                    y.include(0.0);
                    nums("top").into_iter().for_each(|v| y.include(v));
                }
                Glyph::Image { .. } => {
                    for (x0, dw) in nums("x").into_iter().zip(nums("dw")) {
                        x.include(x0);
                        x.include(x0 + dw);
                    }
                    for (y0, dh) in nums("y").into_iter().zip(nums("dh")) {
                        y.include(y0);
                        y.include(y0 + dh);
                    }
                }
            }
        }

        (
            self.config.x_range.unwrap_or_else(|| x.padded()),
            self.config.y_range.unwrap_or_else(|| y.padded()),
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Extent {
    min: f64,
    max: f64,
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Extent {
    fn include(&mut self, v: f64) {
        if v.is_finite() {
            self.min = self.min.min(v);
            self.max = self.max.max(v);
        }
    }

    fn padded(self) -> (f64, f64) {
        if self.min > self.max {
            return (0.0, 1.0);
        }
        if self.min == self.max {
            (self.min - 1.0, self.max + 1.0)
        } else {
            let padding = (self.max - self.min) * 0.05;
            (self.min - padding, self.max + padding)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy(x: Vec<f64>, y: Vec<f64>) -> RecordSet {
        RecordSet::from_columns(vec![("x", x), ("y", y)]).unwrap()
    }

    #[test]
    fn test_default_figure_size() {
        let config = FigureConfig::titled("Test Plot");
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 640);
        assert_eq!(config.title, "Test Plot");
    }

    #[test]
    fn test_add_glyph_requires_columns() {
        let mut fig = Figure::new(FigureConfig::default());
        let data = RecordSet::from_columns(vec![("x", vec![1.0])]).unwrap();
        let err = fig.add_glyph(Glyph::Line, data, GlyphStyle::default()).unwrap_err();
        assert_eq!(err, PlotError::MissingColumn("y".to_string()));
        assert!(fig.renderers().is_empty());
    }

    #[test]
    fn test_renderer_lookup() {
        let mut fig = Figure::new(FigureConfig::default());
        let id = fig
            .add_glyph(Glyph::Line, xy(vec![0.0], vec![1.0]), GlyphStyle::default())
            .unwrap();
        assert_eq!(fig.renderer(id).unwrap().id(), id);
        assert_eq!(
            fig.renderer(RendererId(7)).unwrap_err(),
            PlotError::UnknownRenderer(7)
        );
    }

    #[test]
    fn test_bounds_padding() {
        let mut fig = Figure::new(FigureConfig::default());
        fig.add_glyph(Glyph::Line, xy(vec![0.0, 10.0], vec![5.0, 5.0]), GlyphStyle::default())
            .unwrap();
        let ((x0, x1), (y0, y1)) = fig.bounds();
        assert_eq!((x0, x1), (-0.5, 10.5));
        assert_eq!((y0, y1), (4.0, 6.0));
    }

    #[test]
    fn test_configured_range_wins() {
        let config = FigureConfig {
            x_range: Some((0.0, 100.0)),
            ..FigureConfig::default()
        };
        let mut fig = Figure::new(config);
        fig.add_glyph(Glyph::Line, xy(vec![3.0], vec![4.0]), GlyphStyle::default())
            .unwrap();
        assert_eq!(fig.bounds().0, (0.0, 100.0));
    }

    #[test]
    fn test_empty_figure_bounds() {
        let fig = Figure::new(FigureConfig::default());
        assert_eq!(fig.bounds(), ((0.0, 1.0), (0.0, 1.0)));
    }

    #[test]
    fn test_replace_columns_bumps_revision() {
        let mut fig = Figure::new(FigureConfig::default());
        let id = fig
            .add_glyph(Glyph::Line, xy(vec![0.0], vec![1.0]), GlyphStyle::default())
            .unwrap();
        fig.renderer_mut(id)
            .unwrap()
            .replace_columns(vec![("y".to_string(), vec![Value::Number(2.0)])]);
        let renderer = fig.renderer(id).unwrap();
        assert_eq!(renderer.revision(), 1);
        assert_eq!(renderer.data().numbers("y").unwrap(), vec![2.0]);
    }
}
