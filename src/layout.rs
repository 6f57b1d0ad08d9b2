use serde::Serialize;

use crate::error::PlotResult;
use crate::figure::Figure;
use crate::widget::ControlNode;

/// How the figure and its controls are arranged on the page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Arrangement {
    /// Figure above its controls
    #[default]
    Column,
    /// Figure left of its controls
    Row,
}

/// Top-level node handed to export: one figure plus the controls bound to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub figure: Figure,
    pub controls: Vec<ControlNode>,
    pub arrangement: Arrangement,
}

impl Document {
    pub fn new(figure: Figure) -> Self {
        Self {
            figure,
            controls: Vec::new(),
            arrangement: Arrangement::default(),
        }
    }

    pub fn with_control(mut self, control: ControlNode) -> Self {
        self.controls.push(control);
        self
    }

    pub fn arranged(mut self, arrangement: Arrangement) -> Self {
        self.arrangement = arrangement;
        self
    }

    /// Drive control `idx` to `value`, as a user moving the slider would.
    /// An index with no control is ignored.
    pub fn set_control(&mut self, idx: usize, value: usize) -> PlotResult<()> {
        if let Some(control) = self.controls.get_mut(idx) {
            control.set_value(&mut self.figure, value)?;
        }
        Ok(())
    }
}
