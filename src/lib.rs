// Library exports for plotwire

pub mod csv_reader;
pub mod data;
pub mod error;
pub mod graph;
pub mod palette;
pub mod parser;
pub mod runtime;

// Dispatch and binding core
pub mod dispatch;
pub mod export;
pub mod figure;
pub mod kind;
pub mod layout;
pub mod options;
pub mod widget;

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

pub use error::{PlotError, PlotResult};

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[serde(rename = "html")]
    #[default]
    Html,
    #[serde(rename = "png")]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

impl ExportFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "html" | "htm" => Some(ExportFormat::Html),
            "png" => Some(ExportFormat::Png),
            "svg" => Some(ExportFormat::Svg),
            _ => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(ExportFormat::Html),
            "png" => Ok(ExportFormat::Png),
            "svg" => Ok(ExportFormat::Svg),
            other => Err(format!("unknown export format '{}' (expected html, png or svg)", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ExportOptions {
    /// Snapshot size; falls back to the figure's configured size
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default, rename = "type")]
    pub format: ExportFormat,
    /// Page title for HTML output; falls back to the figure title
    #[serde(default)]
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_options_from_json() {
        let opts: ExportOptions = serde_json::from_str(r#"{"type": "svg", "width": 300}"#).unwrap();
        assert_eq!(opts.format, ExportFormat::Svg);
        assert_eq!(opts.width, Some(300));
        assert_eq!(opts.height, None);
    }

    #[test]
    fn test_export_options_defaults() {
        let opts: ExportOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, ExportOptions::default());
        assert_eq!(opts.format, ExportFormat::Html);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("out.PNG")), Some(ExportFormat::Png));
        assert_eq!(ExportFormat::from_path(Path::new("plot.html")), Some(ExportFormat::Html));
        assert_eq!(ExportFormat::from_path(Path::new("plot")), None);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("SVG".parse::<ExportFormat>(), Ok(ExportFormat::Svg));
        assert!("pdf".parse::<ExportFormat>().is_err());
    }
}
