use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::csv_reader::CsvData;
use crate::error::{PlotError, PlotResult};

/// A single cell of a record set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Grid(Vec<Vec<f64>>),
    List(Vec<Value>),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_grid(&self) -> Option<&Vec<Vec<f64>>> {
        match self {
            Value::Grid(g) => Some(g),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Number(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<Vec<f64>>> for Value {
    fn from(v: Vec<Vec<f64>>) -> Self {
        Value::Grid(v)
    }
}

/// Tabular data backing a renderer: column name -> equal-length values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecordSet {
    columns: BTreeMap<String, Vec<Value>>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records (rows). Zero for a set without columns.
    pub fn len(&self) -> usize {
        self.columns.values().next().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert or replace a column, keeping all columns the same length
    pub fn insert<S: Into<String>>(&mut self, name: S, values: Vec<Value>) -> PlotResult<()> {
        let name = name.into();
        if let Some(expected) = self.expected_len_excluding(&name) {
            if values.len() != expected {
                return Err(PlotError::ColumnLengthMismatch {
                    column: name,
                    expected,
                    actual: values.len(),
                });
            }
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Length every column other than `name` shares, if there is one
    pub(crate) fn expected_len_excluding(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|(k, _)| k.as_str() != name)
            .map(|(_, v)| v.len())
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(|c| c.as_slice())
    }

    pub fn require(&self, name: &str) -> PlotResult<&[Value]> {
        self.column(name)
            .ok_or_else(|| PlotError::MissingColumn(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    /// Numeric view of a column; text cells are an error
    pub fn numbers(&self, name: &str) -> PlotResult<Vec<f64>> {
        self.require(name)?
            .iter()
            .map(|v| v.as_f64().ok_or_else(|| PlotError::NonNumeric(name.to_string())))
            .collect()
    }

    /// Replace several columns in one step. Callers validate lengths first.
    pub(crate) fn replace_columns(&mut self, replacements: Vec<(String, Vec<Value>)>) {
        for (name, values) in replacements {
            self.columns.insert(name, values);
        }
    }

    /// Build a record set from numeric columns
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<f64>)>) -> PlotResult<Self> {
        let mut set = Self::new();
        for (name, values) in columns {
            set.insert(name, values.into_iter().map(Value::Number).collect())?;
        }
        Ok(set)
    }

    /// Create a record set from CSV text data. Columns where every cell parses
    /// as a number become numeric; anything else stays text.
    pub fn from_csv(csv: CsvData) -> Result<Self> {
        let mut set = Self::new();
        for (idx, header) in csv.headers.iter().enumerate() {
            let cells: Vec<&str> = csv
                .rows
                .iter()
                .map(|row| row.get(idx).map(|s| s.trim()).unwrap_or(""))
                .collect();

            let numeric: Option<Vec<f64>> = cells.iter().map(|c| c.parse::<f64>().ok()).collect();
            let values = match numeric {
                Some(nums) => nums.into_iter().map(Value::Number).collect(),
                None => cells.into_iter().map(Value::from).collect(),
            };
            set.insert(header.clone(), values)?;
        }
        Ok(set)
    }

    /// Create a record set from a JSON array of objects
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        if array.is_empty() {
            return Err(anyhow!("Input data array is empty"));
        }

        // Headers come from the first object
        let first_obj = array[0]
            .as_object()
            .ok_or_else(|| anyhow!("Items in array must be objects"))?;
        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(array.len()); headers.len()];
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;

            for (header, column) in headers.iter().zip(columns.iter_mut()) {
                let cell = match obj.get(header) {
                    Some(serde_json::Value::Number(n)) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
                    Some(serde_json::Value::String(s)) => Value::Text(s.clone()),
                    Some(serde_json::Value::Bool(b)) => Value::Text(b.to_string()),
                    Some(serde_json::Value::Null) | None => Value::Number(f64::NAN),
                    Some(other @ serde_json::Value::Array(_)) => {
                        serde_json::from_value::<Vec<Vec<f64>>>(other.clone())
                            .map(Value::Grid)
                            .map_err(|_| anyhow!("Unsupported array value for field '{}'", header))?
                    }
                    _ => return Err(anyhow!("Unsupported value type for field '{}'", header)),
                };
                column.push(cell);
            }
        }

        let mut set = Self::new();
        for (header, column) in headers.into_iter().zip(columns) {
            set.insert(header, column)?;
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_rejects_ragged_column() {
        let mut set = RecordSet::new();
        set.insert("x", vec![1.0.into(), 2.0.into()]).unwrap();
        let err = set.insert("y", vec![1.0.into()]).unwrap_err();
        assert_eq!(
            err,
            PlotError::ColumnLengthMismatch {
                column: "y".to_string(),
                expected: 2,
                actual: 1
            }
        );
        assert!(!set.contains("y"));
    }

    #[test]
    fn test_replacing_only_column_may_change_length() {
        let mut set = RecordSet::new();
        set.insert("x", vec![1.0.into()]).unwrap();
        set.insert("x", vec![1.0.into(), 2.0.into(), 3.0.into()]).unwrap();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_from_csv_detects_numeric_columns() {
        let csv = CsvData {
            headers: vec!["t".to_string(), "label".to_string()],
            rows: vec![
                vec!["1".to_string(), "a".to_string()],
                vec!["2.5".to_string(), "b".to_string()],
            ],
        };
        let set = RecordSet::from_csv(csv).unwrap();
        assert_eq!(set.numbers("t").unwrap(), vec![1.0, 2.5]);
        assert_eq!(set.column("label").unwrap()[1], Value::Text("b".to_string()));
        assert!(set.numbers("label").is_err());
    }

    #[test]
    fn test_from_json() {
        let data = json!([
            {"x": 1, "y": 10.5, "name": "a"},
            {"x": 2, "y": null, "name": "b"}
        ]);
        let set = RecordSet::from_json(&data).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.numbers("x").unwrap(), vec![1.0, 2.0]);
        assert!(set.numbers("y").unwrap()[1].is_nan());
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        assert!(RecordSet::from_json(&json!({"x": 1})).is_err());
        assert!(RecordSet::from_json(&json!([])).is_err());
    }

    #[test]
    fn test_value_serializes_untagged() {
        let v = Value::List(vec![Value::Number(1.0), Value::Grid(vec![vec![2.0]])]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[1.0,[[2.0]]]");
    }
}
