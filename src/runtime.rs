// Runtime executor for the plotwire script DSL

use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashMap;

use crate::csv_reader::{self, CsvData};
use crate::data::{RecordSet, Value};
use crate::dispatch;
use crate::figure::{Figure, FigureConfig, RendererId};
use crate::kind::{ColorMapper, MarkerShape, PlotKind, Ticker};
use crate::layout::Document;
use crate::options::{Channel, ColorSpec, PlotOptions};
use crate::palette::{ColorCycle, ColorPalette};
use crate::parser::ast::{FigureArgs, GlyphCall, ImageCall, Script, SliderCall, Source, Step};
use crate::parser::parse_script;
use crate::widget::{bind_frames, ControlNode, Frame, Playback};

/// Input data with its columns in source order, so `#N` references follow
/// the file rather than sorted names
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    headers: Vec<String>,
    records: RecordSet,
}

impl DataTable {
    pub fn from_csv(csv: CsvData) -> Result<Self> {
        let headers = csv.headers.clone();
        let records = RecordSet::from_csv(csv).context("Failed to load CSV data")?;
        Ok(Self { headers, records })
    }

    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let records = RecordSet::from_json(value).context("Failed to load JSON data")?;
        let headers = records.names().map(String::from).collect();
        Ok(Self { headers, records })
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    fn column(&self, reference: &str) -> Result<&[Value]> {
        let selector = csv_reader::parse_column_selector(reference);
        let name = csv_reader::resolve_column_name(&self.headers, &selector)?;
        Ok(self.records.require(&name)?)
    }

    fn numbers(&self, reference: &str) -> Result<Vec<f64>> {
        self.column(reference)?
            .iter()
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| anyhow!("Column '{}' must be numeric", reference))
            })
            .collect()
    }
}

/// Parse `source` into a script, reporting where parsing stopped
pub fn parse(source: &str) -> Result<Script> {
    match parse_script(source) {
        Ok((_, script)) => Ok(script),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let rest = e.input.trim();
            if rest.is_empty() {
                bail!("Script parse error: script must contain at least one glyph or image")
            }
            let snippet: String = rest.chars().take(40).collect();
            bail!("Script parse error near '{}'", snippet)
        }
        Err(nom::Err::Incomplete(_)) => bail!("Script parse error: incomplete input"),
    }
}

/// Parse and execute `source` against `table`
pub fn run(source: &str, table: &DataTable) -> Result<Document> {
    let script = parse(source)?;
    run_script(&script, table)
}

/// Execute a parsed script: build the figure, plot every glyph in order and
/// bind sliders to the glyph before them.
pub fn run_script(script: &Script, table: &DataTable) -> Result<Document> {
    let config = figure_config(script.figure.as_ref())?;
    let mut figure = Figure::new(config);
    let mut cycle = ColorCycle::default();
    let mut controls = Vec::new();
    let mut last: Option<RendererId> = None;

    for (idx, step) in script.steps.iter().enumerate() {
        match step {
            Step::Glyph(call) => {
                let id = run_glyph(&mut figure, &mut cycle, call, table)
                    .with_context(|| format!("Step {} ({}) failed", idx + 1, call.name))?;
                last = Some(id);
            }
            Step::Image(call) => {
                let id = run_image(&mut figure, call, table)
                    .with_context(|| format!("Step {} (image) failed", idx + 1))?;
                last = Some(id);
            }
            Step::Slider(call) => {
                let target = last.ok_or_else(|| anyhow!("Step {}: slider has no glyph before it to bind", idx + 1))?;
                let control = run_slider(&mut figure, target, call, table)
                    .with_context(|| format!("Step {} (slider) failed", idx + 1))?;
                controls.push(control);
            }
        }
    }

    log::info!(
        target: "plotwire",
        "script produced {} renderers and {} controls",
        figure.renderers().len(),
        controls.len()
    );

    Ok(controls
        .into_iter()
        .fold(Document::new(figure), |doc, control| doc.with_control(control)))
}

fn figure_config(args: Option<&FigureArgs>) -> Result<FigureConfig> {
    let mut config = FigureConfig::default();
    let Some(args) = args else {
        return Ok(config);
    };

    if let Some(title) = &args.title {
        config.title = title.clone();
    }
    if let Some(w) = args.width {
        config.width = pixels("width", w)?;
    }
    if let Some(h) = args.height {
        config.height = pixels("height", h)?;
    }
    config.x_range = args.x_range;
    config.y_range = args.y_range;
    if let Some(name) = &args.x_ticker {
        config.x_ticker = Ticker::from_name(name)?;
    }
    if let Some(name) = &args.y_ticker {
        config.y_ticker = Ticker::from_name(name)?;
    }
    Ok(config)
}

fn pixels(what: &str, value: f64) -> Result<u32> {
    if value < 1.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        bail!("Figure {} must be a positive whole number, got {}", what, value);
    }
    Ok(value as u32)
}

fn run_glyph(figure: &mut Figure, cycle: &mut ColorCycle, call: &GlyphCall, table: &DataTable) -> Result<RendererId> {
    let kind: PlotKind = call.name.parse()?;
    let x_ref = call.x.as_deref().ok_or_else(|| anyhow!("Missing 'x' column"))?;
    let y_ref = call.y.as_deref().ok_or_else(|| anyhow!("Missing 'y' column"))?;
    let x = table.numbers(x_ref)?;
    let y = table.numbers(y_ref)?;

    let mut options = PlotOptions::new();
    options.alpha = call.alpha;
    options.legend = call.legend.clone();
    if let Some(w) = call.width {
        options = match kind {
            PlotKind::Bar => options.width(w),
            _ => options.line_width(w),
        };
    }

    options.color = match &call.color {
        Some(Source::Fixed(color)) => Some(ColorSpec::Fixed(color.clone())),
        Some(Source::Column(reference)) => Some(ColorSpec::Indexed(color_indices(table.column(reference)?)?)),
        None => None,
    };

    options.size = match &call.size {
        Some(Source::Fixed(size)) => Some(Channel::Fixed(*size)),
        Some(Source::Column(reference)) => Some(Channel::PerPoint(table.numbers(reference)?)),
        None => None,
    };

    options.marker = match &call.marker {
        Some(Source::Fixed(name)) => Some(Channel::Fixed(name.parse()?)),
        Some(Source::Column(reference)) => {
            let shapes = table
                .column(reference)?
                .iter()
                .map(|v| {
                    v.as_str()
                        .ok_or_else(|| anyhow!("Marker column '{}' must hold marker names", reference))
                        .and_then(|s| s.parse::<MarkerShape>().map_err(anyhow::Error::from))
                })
                .collect::<Result<Vec<_>>>()?;
            Some(Channel::PerPoint(shapes))
        }
        None => None,
    };

    Ok(dispatch::plot(figure, cycle, kind, x, y, options)?)
}

/// Category index per row: numeric columns are taken as 1-based indices,
/// text columns are numbered by first appearance
fn color_indices(column: &[Value]) -> Result<Vec<usize>> {
    let mut categories: HashMap<&str, usize> = HashMap::new();
    column
        .iter()
        .map(|v| match v {
            Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 => Ok(*n as usize),
            Value::Text(s) => {
                let next = categories.len() + 1;
                Ok(*categories.entry(s.as_str()).or_insert(next))
            }
            other => Err(anyhow!("Color column value {:?} is not a category", other)),
        })
        .collect()
}

fn run_image(figure: &mut Figure, call: &ImageCall, table: &DataTable) -> Result<RendererId> {
    let columns = call
        .columns
        .iter()
        .map(|reference| table.numbers(reference))
        .collect::<Result<Vec<_>>>()?;
    let rows = columns.first().map_or(0, Vec::len);
    let grid: Vec<Vec<f64>> = (0..rows)
        .map(|r| columns.iter().map(|col| col[r]).collect())
        .collect();

    let mut options = PlotOptions::new();
    options.alpha = call.alpha;
    if let Some(name) = &call.mapper {
        let palette = ColorPalette::viridis(256).colors().to_vec();
        options = options.color_mapper(ColorMapper::from_name(name, palette)?);
    }

    Ok(dispatch::image(figure, grid, options)?)
}

fn run_slider(figure: &mut Figure, target: RendererId, call: &SliderCall, table: &DataTable) -> Result<ControlNode> {
    if figure.renderer(target)?.glyph().kind() == PlotKind::Image {
        bail!("Sliders over images need grid frames, which scripts cannot express");
    }

    let frames = call
        .frames
        .iter()
        .map(|reference| {
            let values = table.column(reference)?.to_vec();
            Ok(Frame::new().with_column(call.column.as_str(), values))
        })
        .collect::<Result<Vec<_>>>()?;

    let playback = match call.play {
        Some(ms) if ms < 0.0 || ms.fract() != 0.0 => bail!("Play interval must be a whole number of milliseconds, got {}", ms),
        Some(ms) => Some(Playback { interval_ms: ms as u64 }),
        None => None,
    };

    let label = call.label.as_deref().unwrap_or("Frame");
    Ok(bind_frames(figure, target, label, frames, playback)?)
}
