// Abstract Syntax Tree for the plotwire script DSL

/// A parsed script: optional figure settings plus steps in source order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub figure: Option<FigureArgs>,
    pub steps: Vec<Step>,
}

/// Anything after the figure, executed in order. A slider binds the glyph or
/// image most recently added before it.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Glyph(GlyphCall),
    Image(ImageCall),
    Slider(SliderCall),
}

/// A value that is either fixed for every point or read from a data column
#[derive(Debug, Clone, PartialEq)]
pub enum Source<T> {
    Fixed(T),
    Column(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FigureArgs {
    pub title: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    pub x_ticker: Option<String>,
    pub y_ticker: Option<String>,
}

/// `name(...)` where `name` is any glyph kind the dispatcher knows
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphCall {
    pub name: String,
    pub x: Option<String>,
    /// Height column; `top:` is accepted as an alias for bars
    pub y: Option<String>,
    pub color: Option<Source<String>>,
    pub size: Option<Source<f64>>,
    pub marker: Option<Source<String>>,
    /// Bar width for bars, stroke width otherwise
    pub width: Option<f64>,
    pub alpha: Option<f64>,
    pub legend: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageCall {
    /// Columns read side by side; data row i becomes grid row i
    pub columns: Vec<String>,
    pub mapper: Option<String>,
    pub alpha: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SliderCall {
    pub label: Option<String>,
    /// Renderer column each frame replaces
    pub column: String,
    /// Data columns holding the successive frames
    pub frames: Vec<String>,
    /// Playback interval in milliseconds; no play button when absent
    pub play: Option<f64>,
}
