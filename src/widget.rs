// Widget binder: attach a slider (and optional play button) to a renderer so
// that moving the slider swaps in one of a fixed set of column frames.
//
// The binding is plain data (`SwapRule`). The exported page carries a single
// interpreter that executes these rules; nothing is templated per binding.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::data::{RecordSet, Value};
use crate::dispatch::grid_shape;
use crate::error::{PlotError, PlotResult};
use crate::figure::{Figure, Glyph, Renderer, RendererId};

/// Default delay between playback steps, in milliseconds
pub const DEFAULT_PLAY_INTERVAL_MS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ControlId(usize);

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control-{}", self.0)
    }
}

/// One alternate set of column values.
///
/// For ordinary glyphs each entry is a `Value::List` holding the full column.
/// For images each entry is the bare value (usually a grid), wrapped into a
/// one-row column when swapped in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Frame {
    columns: BTreeMap<String, Value>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a full column of values
    pub fn with_column<S, I, V>(mut self, name: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let list = values.into_iter().map(Into::into).collect();
        self.columns.insert(name.into(), Value::List(list));
        self
    }

    /// Add a single value, e.g. an image grid
    pub fn with_value<S: Into<String>, V: Into<Value>>(mut self, name: S, value: V) -> Self {
        self.columns.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for Frame {
    fn from(columns: BTreeMap<String, Value>) -> Self {
        Self { columns }
    }
}

/// Ordered, immutable frames selected by slider index
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FrameSet {
    frames: Vec<Frame>,
}

impl FrameSet {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slider {
    pub id: ControlId,
    pub label: String,
    pub start: usize,
    pub end: usize,
    pub step: usize,
    pub value: usize,
}

/// Playback request for `bind_frames`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playback {
    pub interval_ms: u64,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_PLAY_INTERVAL_MS,
        }
    }
}

/// Button that steps its slider from start to end
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayButton {
    pub id: ControlId,
    pub label: String,
    pub target: ControlId,
    pub interval_ms: u64,
}

impl PlayButton {
    /// `(slider value, delay from click in ms)` for every playback step
    pub fn schedule(&self, slider: &Slider) -> Vec<(usize, u64)> {
        (slider.start..=slider.end)
            .step_by(slider.step.max(1))
            .map(|value| (value, self.interval_ms * (value - slider.start) as u64))
            .collect()
    }
}

/// Declarative "slider value i selects frame i" binding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapRule {
    pub control: ControlId,
    pub renderer: RendererId,
    pub frames: Rc<FrameSet>,
    /// Image renderers take each swapped value as a one-element column
    pub wrap_single: bool,
}

impl SwapRule {
    /// Replace the renderer's columns with those of frame `index`, all at
    /// once, then signal a redraw. Nothing changes on error.
    pub fn apply(&self, figure: &mut Figure, index: usize) -> PlotResult<()> {
        let frame = self.frames.get(index).ok_or(PlotError::FrameIndexOutOfRange {
            index,
            max: self.frames.len().saturating_sub(1),
        })?;
        let replacements = frame_columns(index, frame, self.wrap_single)?;

        let renderer = figure.renderer_mut(self.renderer)?;
        // Another control may have resized the data since binding
        swapped_len(renderer.data(), &replacements)?;
        renderer.replace_columns(replacements);

        log::trace!(target: "plotwire", "{} swapped frame {} into {}", self.control, index, self.renderer);
        Ok(())
    }
}

/// A bound control: the slider, its optional play button and the swap rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlNode {
    pub slider: Slider,
    pub play: Option<PlayButton>,
    pub rule: SwapRule,
}

impl ControlNode {
    /// Move the slider and apply the matching frame
    pub fn set_value(&mut self, figure: &mut Figure, index: usize) -> PlotResult<()> {
        self.rule.apply(figure, index)?;
        self.slider.value = index;
        Ok(())
    }
}

/// Bind `frames` to `renderer` through a new slider labelled `label`.
///
/// Every frame may only name columns the renderer is already bound to, and
/// swapping any frame in must leave all columns the same length.
pub fn bind_frames(
    figure: &mut Figure,
    renderer: RendererId,
    label: &str,
    frames: Vec<Frame>,
    playback: Option<Playback>,
) -> PlotResult<ControlNode> {
    if frames.is_empty() {
        return Err(PlotError::EmptyFrameSet);
    }

    let target = figure.renderer(renderer)?;
    let wrap_single = matches!(target.glyph(), Glyph::Image { .. });
    // Every frame must leave the renderer with the same row count, so frames
    // can be swapped in any order
    let mut rows: Option<usize> = None;
    for (idx, frame) in frames.iter().enumerate() {
        let len = validate_frame(target, idx, frame, wrap_single)?;
        match rows {
            Some(expected) if expected != len => {
                return Err(PlotError::ColumnLengthMismatch {
                    column: frame.names().next().unwrap_or_default().to_string(),
                    expected,
                    actual: len,
                });
            }
            _ => rows = Some(len),
        }
    }

    let slider = Slider {
        id: ControlId(figure.issue_control_id()),
        label: label.to_string(),
        start: 0,
        end: frames.len() - 1,
        step: 1,
        value: 0,
    };

    let play = playback.map(|p| PlayButton {
        id: ControlId(figure.issue_control_id()),
        label: "Play".to_string(),
        target: slider.id,
        interval_ms: p.interval_ms,
    });

    log::debug!(
        target: "plotwire",
        "bound {} frames to {} via {} (play: {})",
        frames.len(),
        renderer,
        slider.id,
        play.is_some()
    );

    Ok(ControlNode {
        rule: SwapRule {
            control: slider.id,
            renderer,
            frames: Rc::new(FrameSet { frames }),
            wrap_single,
        },
        slider,
        play,
    })
}

/// Row count the renderer would have after swapping `frame` in
fn validate_frame(renderer: &Renderer, idx: usize, frame: &Frame, wrap_single: bool) -> PlotResult<usize> {
    let data = renderer.data();
    if let Some(column) = frame.names().find(|name| !data.contains(name)) {
        return Err(PlotError::FrameColumnMismatch {
            frame: idx,
            column: column.to_string(),
        });
    }

    let replacements = frame_columns(idx, frame, wrap_single)?;

    if wrap_single {
        if let Some(Value::Grid(grid)) = frame.get("image") {
            check_image_frame(data, idx, frame, grid)?;
        }
    }

    swapped_len(data, &replacements)
}

/// A swapped grid keeps the bound extents, so it must have the bound grid's
/// shape unless the frame also sets `dw` and `dh`
fn check_image_frame(data: &RecordSet, idx: usize, frame: &Frame, grid: &[Vec<f64>]) -> PlotResult<()> {
    let shape = grid_shape(grid)?;
    if frame.get("dw").is_some() && frame.get("dh").is_some() {
        return Ok(());
    }
    let bound = data
        .column("image")
        .and_then(|c| c.first())
        .and_then(Value::as_grid)
        .map(|g| grid_shape(g))
        .transpose()?;
    match bound {
        Some(bound) if bound != shape => Err(PlotError::InvalidGrid(format!(
            "frame {} grid is {}x{} but the bound image is {}x{}; set dw and dh to resize",
            idx, shape.0, shape.1, bound.0, bound.1
        ))),
        _ => Ok(()),
    }
}

/// Column length after replacing `replacements` in `data`; all columns must agree
fn swapped_len(data: &RecordSet, replacements: &[(String, Vec<Value>)]) -> PlotResult<usize> {
    let mut lengths = data.names().map(|name| {
        let len = replacements
            .iter()
            .find(|(replaced, _)| replaced == name)
            .map(|(_, values)| values.len())
            .unwrap_or_else(|| data.column(name).map_or(0, |c| c.len()));
        (name, len)
    });
    let Some((_, expected)) = lengths.next() else {
        return Ok(0);
    };
    if let Some((column, actual)) = lengths.find(|(_, len)| *len != expected) {
        return Err(PlotError::ColumnLengthMismatch {
            column: column.to_string(),
            expected,
            actual,
        });
    }
    Ok(expected)
}

fn frame_columns(idx: usize, frame: &Frame, wrap_single: bool) -> PlotResult<Vec<(String, Vec<Value>)>> {
    frame
        .columns
        .iter()
        .map(|(name, value)| {
            let column = match value {
                _ if wrap_single => vec![value.clone()],
                Value::List(items) => items.clone(),
                _ => {
                    return Err(PlotError::FrameValueNotList {
                        frame: idx,
                        column: name.clone(),
                    })
                }
            };
            Ok((name.clone(), column))
        })
        .collect()
}
