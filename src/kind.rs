// Closed tag sets: glyph kinds, marker shapes, tickers and color mappers.
//
// Each set is parsed through a static lookup table; an unknown name is an
// `UnsupportedKind` error rather than a silently missing object.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::PlotError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    Circle,
    Square,
    Triangle,
    InvertedTriangle,
    Diamond,
    Cross,
    X,
    Asterisk,
    Dot,
}

const MARKER_TABLE: &[(&str, MarkerShape)] = &[
    ("circle", MarkerShape::Circle),
    ("square", MarkerShape::Square),
    ("triangle", MarkerShape::Triangle),
    ("inverted_triangle", MarkerShape::InvertedTriangle),
    ("diamond", MarkerShape::Diamond),
    ("cross", MarkerShape::Cross),
    ("x", MarkerShape::X),
    ("asterisk", MarkerShape::Asterisk),
    ("dot", MarkerShape::Dot),
];

impl MarkerShape {
    pub fn name(self) -> &'static str {
        MARKER_TABLE
            .iter()
            .find(|(_, shape)| *shape == self)
            .map(|(name, _)| *name)
            .unwrap_or("circle")
    }

    pub fn all() -> impl Iterator<Item = MarkerShape> {
        MARKER_TABLE.iter().map(|(_, shape)| *shape)
    }
}

impl FromStr for MarkerShape {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MARKER_TABLE
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, shape)| *shape)
            .ok_or_else(|| PlotError::unsupported("marker", s))
    }
}

impl fmt::Display for MarkerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which renderer a plot call routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "marker", rename_all = "snake_case")]
pub enum PlotKind {
    Line,
    Bar,
    Marker(MarkerShape),
    Image,
}

impl PlotKind {
    /// Columns a record set must carry for this kind
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            PlotKind::Line | PlotKind::Marker(_) => &["x", "y"],
            PlotKind::Bar => &["x", "top"],
            PlotKind::Image => &["image", "x", "y", "dw", "dh"],
        }
    }
}

impl FromStr for PlotKind {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(PlotKind::Line),
            // vbar is the vertical bar glyph, never a line
            "bar" | "vbar" => Ok(PlotKind::Bar),
            "image" => Ok(PlotKind::Image),
            other => other
                .parse::<MarkerShape>()
                .map(PlotKind::Marker)
                .map_err(|_| PlotError::unsupported("glyph", other)),
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotKind::Line => f.write_str("line"),
            PlotKind::Bar => f.write_str("bar"),
            PlotKind::Marker(shape) => write!(f, "{}", shape),
            PlotKind::Image => f.write_str("image"),
        }
    }
}

/// Axis tick placement strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Ticker {
    Basic { desired_num_ticks: usize },
    Fixed { ticks: Vec<f64> },
    Log { base: f64 },
    Datetime,
    Categorical,
}

impl Default for Ticker {
    fn default() -> Self {
        Ticker::Basic {
            desired_num_ticks: 6,
        }
    }
}

const TICKER_TABLE: &[(&str, fn() -> Ticker)] = &[
    ("basic", Ticker::default),
    ("fixed", || Ticker::Fixed { ticks: Vec::new() }),
    ("log", || Ticker::Log { base: 10.0 }),
    ("datetime", || Ticker::Datetime),
    ("categorical", || Ticker::Categorical),
];

impl Ticker {
    /// Label count a static renderer should aim for on this axis
    pub fn desired_ticks(&self) -> usize {
        match self {
            Ticker::Basic { desired_num_ticks } => *desired_num_ticks,
            Ticker::Fixed { ticks } if !ticks.is_empty() => ticks.len(),
            _ => 6,
        }
    }

    pub fn from_name(name: &str) -> Result<Self, PlotError> {
        TICKER_TABLE
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, make)| make())
            .ok_or_else(|| PlotError::unsupported("ticker", name))
    }
}

/// Maps scalar image values onto palette colors
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColorMapper {
    Linear { palette: Vec<String> },
    Log { palette: Vec<String> },
    Categorical { palette: Vec<String> },
}

const MAPPER_TABLE: &[(&str, fn(Vec<String>) -> ColorMapper)] = &[
    ("linear", |palette| ColorMapper::Linear { palette }),
    ("log", |palette| ColorMapper::Log { palette }),
    ("categorical", |palette| ColorMapper::Categorical { palette }),
];

impl Default for ColorMapper {
    fn default() -> Self {
        ColorMapper::Linear {
            palette: crate::palette::ColorPalette::viridis(256).colors().to_vec(),
        }
    }
}

impl ColorMapper {
    pub fn from_name(name: &str, palette: Vec<String>) -> Result<Self, PlotError> {
        MAPPER_TABLE
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, make)| make(palette))
            .ok_or_else(|| PlotError::unsupported("color mapper", name))
    }

    pub fn palette(&self) -> &[String] {
        match self {
            ColorMapper::Linear { palette }
            | ColorMapper::Log { palette }
            | ColorMapper::Categorical { palette } => palette,
        }
    }

    /// Palette slot for `value` given the data range `[lo, hi]`
    pub fn slot(&self, value: f64, lo: f64, hi: f64) -> Option<usize> {
        let n = self.palette().len();
        if n == 0 || value.is_nan() {
            return None;
        }
        let t = match self {
            ColorMapper::Linear { .. } => normalize(value, lo, hi),
            ColorMapper::Log { .. } => {
                let lo = lo.max(f64::MIN_POSITIVE);
                let v = value.max(lo);
                normalize(v.ln(), lo.ln(), hi.max(lo).ln())
            }
            ColorMapper::Categorical { .. } => {
                return Some((value.max(0.0) as usize) % n);
            }
        };
        Some(((t * (n - 1) as f64).round() as usize).min(n - 1))
    }
}

fn normalize(v: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        ((v - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
