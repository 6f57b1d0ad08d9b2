// Error taxonomy for plot dispatch and widget binding

use thiserror::Error;

/// Validation failures raised by the dispatcher and the widget binder.
///
/// Every variant is produced before any record set is touched, so a failed
/// call leaves the figure exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlotError {
    #[error("unsupported {category} '{name}'")]
    UnsupportedKind { category: &'static str, name: String },

    #[error("column '{column}' has {actual} values, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("frame {frame} sets column '{column}' which the renderer is not bound to")]
    FrameColumnMismatch { frame: usize, column: String },

    #[error("frame {frame} column '{column}' must be a list of values")]
    FrameValueNotList { frame: usize, column: String },

    #[error("cannot bind a control to an empty frame set")]
    EmptyFrameSet,

    #[error("color index {index} at position {position} is out of range (indices start at 1)")]
    InvalidColorIndex { position: usize, index: usize },

    #[error("invalid image grid: {0}")]
    InvalidGrid(String),

    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("column '{0}' contains non-numeric values")]
    NonNumeric(String),

    #[error("frame index {index} outside [0, {max}]")]
    FrameIndexOutOfRange { index: usize, max: usize },

    #[error("renderer {0} does not exist on this figure")]
    UnknownRenderer(usize),
}

impl PlotError {
    pub(crate) fn unsupported(category: &'static str, name: impl Into<String>) -> Self {
        PlotError::UnsupportedKind {
            category,
            name: name.into(),
        }
    }
}

pub type PlotResult<T> = Result<T, PlotError>;
