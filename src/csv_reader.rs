// CSV input for the plot script runner

use anyhow::{anyhow, Context, Result};
use std::io::{self, Read};

/// Raw CSV contents: header row plus string cells
#[derive(Debug, Clone, PartialEq)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// How a script refers to a data column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSelector {
    Name(String),
    /// Zero-based position, written `#2` in scripts
    Index(usize),
}

/// Read CSV data from any reader
pub fn read_csv<R: Read>(reader: R) -> Result<CsvData> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        anyhow::bail!("CSV input has no header row");
    }

    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV record {}", line + 1))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    Ok(CsvData { headers, rows })
}

/// Read CSV data from stdin
pub fn read_csv_from_stdin() -> Result<CsvData> {
    read_csv(io::stdin().lock())
}

/// Parse a column reference: `#N` selects by position, anything else by name
pub fn parse_column_selector(col: &str) -> ColumnSelector {
    match col.strip_prefix('#').and_then(|n| n.parse::<usize>().ok()) {
        Some(idx) => ColumnSelector::Index(idx),
        None => ColumnSelector::Name(col.to_string()),
    }
}

/// Resolve a selector to the header name it points at (names match case-insensitively)
pub fn resolve_column_name(headers: &[String], selector: &ColumnSelector) -> Result<String> {
    match selector {
        ColumnSelector::Name(name) => headers
            .iter()
            .find(|h| h.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| anyhow!("Column '{}' not found. Available columns: {}", name, headers.join(", "))),
        ColumnSelector::Index(idx) => headers.get(*idx).cloned().ok_or_else(|| {
            anyhow!(
                "Column index {} out of range (data has {} columns)",
                idx,
                headers.len()
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv() {
        let input = "time, temp\n1, 20.5\n2, 21.0\n";
        let data = read_csv(input.as_bytes()).unwrap();
        assert_eq!(data.headers, vec!["time", "temp"]);
        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.rows[1], vec!["2", "21.0"]);
    }

    #[test]
    fn test_read_csv_ragged_row_fails() {
        let input = "a,b\n1,2\n3\n";
        assert!(read_csv(input.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_column_selector() {
        assert_eq!(parse_column_selector("#1"), ColumnSelector::Index(1));
        assert_eq!(
            parse_column_selector("temp"),
            ColumnSelector::Name("temp".to_string())
        );
        assert_eq!(
            parse_column_selector("#x"),
            ColumnSelector::Name("#x".to_string())
        );
    }

    #[test]
    fn test_resolve_column_name() {
        let headers = vec!["Time".to_string(), "Temp".to_string()];
        assert_eq!(
            resolve_column_name(&headers, &ColumnSelector::Name("time".to_string())).unwrap(),
            "Time"
        );
        assert_eq!(
            resolve_column_name(&headers, &ColumnSelector::Index(1)).unwrap(),
            "Temp"
        );
        assert!(resolve_column_name(&headers, &ColumnSelector::Index(5)).is_err());
        assert!(resolve_column_name(&headers, &ColumnSelector::Name("y".to_string())).is_err());
    }
}
