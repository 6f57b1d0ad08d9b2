use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::kind::{ColorMapper, MarkerShape};

/// Color for a glyph: one fixed color, or a 1-based palette index per point
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpec {
    Fixed(String),
    Indexed(Vec<usize>),
}

/// A visual channel that is either constant or given per point
#[derive(Debug, Clone, PartialEq)]
pub enum Channel<T> {
    Fixed(T),
    PerPoint(Vec<T>),
}

/// Recognized plot options. Anything else goes in `style` and is forwarded
/// to the renderer untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotOptions {
    pub color: Option<ColorSpec>,
    pub marker: Option<Channel<MarkerShape>>,
    pub size: Option<Channel<f64>>,
    /// Bar width in data units (bars only, defaults to 1)
    pub width: Option<f64>,
    pub line_width: Option<f64>,
    pub alpha: Option<f64>,
    pub legend: Option<String>,
    /// Image color mapper (images only)
    pub color_mapper: Option<ColorMapper>,
    pub style: BTreeMap<String, JsonValue>,
}

impl PlotOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color<S: Into<String>>(mut self, color: S) -> Self {
        self.color = Some(ColorSpec::Fixed(color.into()));
        self
    }

    pub fn color_indices(mut self, indices: Vec<usize>) -> Self {
        self.color = Some(ColorSpec::Indexed(indices));
        self
    }

    pub fn marker(mut self, shape: MarkerShape) -> Self {
        self.marker = Some(Channel::Fixed(shape));
        self
    }

    pub fn markers(mut self, shapes: Vec<MarkerShape>) -> Self {
        self.marker = Some(Channel::PerPoint(shapes));
        self
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = Some(Channel::Fixed(size));
        self
    }

    pub fn sizes(mut self, sizes: Vec<f64>) -> Self {
        self.size = Some(Channel::PerPoint(sizes));
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn line_width(mut self, width: f64) -> Self {
        self.line_width = Some(width);
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn legend<S: Into<String>>(mut self, legend: S) -> Self {
        self.legend = Some(legend.into());
        self
    }

    pub fn color_mapper(mut self, mapper: ColorMapper) -> Self {
        self.color_mapper = Some(mapper);
        self
    }

    pub fn style<S: Into<String>, V: Into<JsonValue>>(mut self, key: S, value: V) -> Self {
        self.style.insert(key.into(), value.into());
        self
    }
}
