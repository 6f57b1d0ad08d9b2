use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use plotwire::dispatch::{image, plot, plot_named};
use plotwire::export::{export, render_html};
use plotwire::figure::{Figure, FigureConfig};
use plotwire::kind::PlotKind;
use plotwire::layout::{Arrangement, Document};
use plotwire::options::PlotOptions;
use plotwire::palette::ColorCycle;
use plotwire::widget::{bind_frames, Frame, Playback};
use plotwire::{ExportFormat, ExportOptions, PlotError};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test").join(name)
}

fn tmp_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name)
}

/// Helper function to run plotwire with a script and CSV on stdin
fn run_plotwire(args: &[&str], csv_content: &str) -> Result<Vec<u8>, String> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_plotwire"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(csv_content.as_bytes())
            .map_err(|e| format!("Failed to write to stdin: {}", e))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| format!("Failed to wait for process: {}", e))?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

/// Check if bytes are a valid PNG
fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

#[test]
fn test_library_animated_scatter() {
    let mut fig = Figure::new(FigureConfig::titled("Animated"));
    let mut cycle = ColorCycle::default();
    let id = plot_named(
        &mut fig,
        &mut cycle,
        "circle",
        vec![0.0, 1.0, 2.0],
        vec![0.0, 0.0, 0.0],
        PlotOptions::new().color_indices(vec![1, 2, 1]).size(8.0),
    )
    .unwrap();

    let frames: Vec<Frame> = (0..4)
        .map(|k| Frame::new().with_column("y", vec![k as f64, 2.0 * k as f64, 3.0 * k as f64]))
        .collect();
    let control = bind_frames(&mut fig, id, "Step", frames, Some(Playback::default())).unwrap();
    let mut doc = Document::new(fig).with_control(control).arranged(Arrangement::Row);

    doc.set_control(0, 3).unwrap();
    let data = doc.figure.renderer(id).unwrap().data();
    assert_eq!(data.numbers("y").unwrap(), vec![3.0, 6.0, 9.0]);
    assert_eq!(data.numbers("x").unwrap(), vec![0.0, 1.0, 2.0]);

    let html = render_html(&doc, &ExportOptions::default()).unwrap();
    assert!(html.contains("\"arrangement\":\"row\""));
    assert!(html.contains("\"interval_ms\":20"));
}

#[test]
fn test_library_colors_cycle_per_figure() {
    let mut fig = Figure::new(FigureConfig::default());
    let mut cycle = ColorCycle::default();
    let a = plot(&mut fig, &mut cycle, PlotKind::Line, vec![0.0], vec![0.0], PlotOptions::new()).unwrap();
    let failed = plot(&mut fig, &mut cycle, PlotKind::Line, vec![0.0, 1.0], vec![0.0], PlotOptions::new());
    let b = plot(&mut fig, &mut cycle, PlotKind::Bar, vec![0.0], vec![1.0], PlotOptions::new()).unwrap();

    assert!(matches!(failed, Err(PlotError::ColumnLengthMismatch { .. })));
    assert_eq!(fig.renderer(a).unwrap().style().color.as_deref(), Some("#1f77b4"));
    assert_eq!(fig.renderer(b).unwrap().style().color.as_deref(), Some("#ff7f0e"));
}

#[test]
fn test_library_image_slider_exports() {
    let mut fig = Figure::new(FigureConfig::titled("Heat"));
    let id = image(&mut fig, vec![vec![0.0, 1.0], vec![2.0, 3.0]], PlotOptions::new()).unwrap();
    let frames = vec![
        Frame::new().with_value("image", vec![vec![3.0, 2.0], vec![1.0, 0.0]]),
        Frame::new().with_value("image", vec![vec![1.0, 1.0], vec![1.0, 1.0]]),
    ];
    let control = bind_frames(&mut fig, id, "Frame", frames, None).unwrap();
    let doc = Document::new(fig).with_control(control);

    let path = tmp_path("image_slider.html");
    export(&doc, &path, &ExportOptions::default()).unwrap();
    let html = fs::read_to_string(&path).unwrap();
    assert!(html.contains("\"wrap_single\":true"));

    let png = tmp_path("image_slider.png");
    let options = ExportOptions {
        format: ExportFormat::Png,
        width: Some(200),
        height: Some(150),
        ..ExportOptions::default()
    };
    export(&doc, &png, &options).unwrap();
    assert!(is_valid_png(&fs::read(&png).unwrap()));
}

#[test]
fn test_end_to_end_html_from_stdin() {
    let csv = fs::read_to_string(fixture("waves.csv")).expect("Failed to read test CSV");
    let result = run_plotwire(
        &["line(x: t, y: y0) | circle(x: t, y: y0, size: 6) | slider(column: y, frames: [y0, y1, y2], play: 50)"],
        &csv,
    );
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    let html = String::from_utf8(result.unwrap()).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("\"interval_ms\":50"));
}

#[test]
fn test_end_to_end_png_to_stdout() {
    let csv = fs::read_to_string(fixture("scatter.csv")).expect("Failed to read test CSV");
    let result = run_plotwire(
        &[
            "square(x: height, y: weight, color: species, marker: shape)",
            "--format",
            "png",
        ],
        &csv,
    );
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_valid_png(&result.unwrap()));
}

#[test]
fn test_end_to_end_svg_file_from_extension() {
    let out = tmp_path("bars.svg");
    let csv = fs::read_to_string(fixture("waves.csv")).expect("Failed to read test CSV");
    let out_arg = out.to_string_lossy().to_string();
    let result = run_plotwire(&["vbar(x: t, top: y1, width: 0.8)", "--out", &out_arg], &csv);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("<svg"));
}

#[test]
fn test_end_to_end_json_data_file() {
    let data = fixture("points.json");
    let data_arg = data.to_string_lossy().to_string();
    let result = run_plotwire(
        &[
            r#"figure(title: "Points") | diamond(x: x, y: y, color: label)"#,
            "--data",
            &data_arg,
            "--options",
            r#"{"title": "Page"}"#,
        ],
        "",
    );
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    let html = String::from_utf8(result.unwrap()).unwrap();
    assert!(html.contains("<title>Page</title>"));
    assert!(html.contains("\"title\":\"Points\""));
}

#[test]
fn test_end_to_end_image_from_columns() {
    let data = fixture("heat.csv");
    let data_arg = data.to_string_lossy().to_string();
    let result = run_plotwire(
        &[
            r#"image(columns: [c0, c1, c2, c3], mapper: "linear")"#,
            "--data",
            &data_arg,
            "--format",
            "png",
        ],
        "",
    );
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_valid_png(&result.unwrap()));
}

#[test]
fn test_end_to_end_unknown_glyph_fails() {
    let csv = fs::read_to_string(fixture("waves.csv")).expect("Failed to read test CSV");
    let result = run_plotwire(&["hexagon(x: t, y: y0)"], &csv);
    let err = result.unwrap_err();
    assert!(err.contains("hexagon"), "unexpected error: {}", err);
}

#[test]
fn test_end_to_end_bad_frame_column_fails() {
    let csv = fs::read_to_string(fixture("waves.csv")).expect("Failed to read test CSV");
    let result = run_plotwire(&["line(x: t, y: y0) | slider(column: y, frames: [y1, missing])"], &csv);
    assert!(result.is_err());
}

#[test]
fn test_end_to_end_parse_error() {
    let result = run_plotwire(&["line(x: t, y: y0) |"], "t,y0\n0,1\n");
    let err = result.unwrap_err();
    assert!(err.contains("parse error"), "unexpected error: {}", err);
}
