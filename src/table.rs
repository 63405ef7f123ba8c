//! Flattening of JSON documents into dynamic-column tables.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Separator placed between the keys of a nested object path.
pub const SEPARATOR: &str = "_";

/// Column name given to records that are not JSON objects.
pub const SCALAR_COLUMN: &str = "value";

/// Rows of JSON cells under an ordered set of column names.
///
/// Columns are whatever the source document contains, so callers should look
/// them up by name rather than assume a fixed layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Flattens a JSON document into a table.
    ///
    /// A top-level array yields one record per element, anything else yields a
    /// single record. Nested objects become `parent_child` columns; nested
    /// arrays stay as one cell. Records missing a column hold `null`.
    pub fn from_json(doc: &Value) -> Self {
        let records: Vec<Vec<(String, Value)>> = match doc {
            Value::Array(items) => items.iter().map(flatten_record).collect(),
            other => vec![flatten_record(other)],
        };

        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in &records {
            for (key, _) in record {
                if !index.contains_key(key) {
                    index.insert(key.clone(), columns.len());
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|record| {
                let mut row = vec![Value::Null; columns.len()];
                for (key, value) in record {
                    row[index[&key]] = value;
                }
                row
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Every cell of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// One row as a column name to value map.
    pub fn record(&self, row: usize) -> Option<Map<String, Value>> {
        let row = self.rows.get(row)?;
        Some(
            self.columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect(),
        )
    }

    /// Writes the table as comma-separated values with a header row.
    pub fn write_csv<W: Write>(&self, mut w: W) -> io::Result<()> {
        write_csv_line(&mut w, self.columns.iter().map(String::as_str))?;
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            write_csv_line(&mut w, cells.iter().map(String::as_str))?;
        }
        w.flush()
    }

    pub fn to_csv_file(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        self.write_csv(BufWriter::new(file))
            .with_context(|| format!("failed to write {}", path.display()))
    }
}

fn flatten_record(value: &Value) -> Vec<(String, Value)> {
    match value {
        Value::Object(map) => {
            let mut out = Vec::new();
            flatten_object(&mut out, None, map);
            out
        }
        other => vec![(SCALAR_COLUMN.to_string(), other.clone())],
    }
}

fn flatten_object(
    out: &mut Vec<(String, Value)>,
    prefix: Option<&str>,
    map: &Map<String, Value>,
) {
    for (key, value) in map {
        let key = match prefix {
            Some(p) => format!("{p}{SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) => flatten_object(out, Some(&key), inner),
            other => out.push((key, other.clone())),
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_csv_line<'a, W: Write>(
    w: &mut W,
    fields: impl Iterator<Item = &'a str>,
) -> io::Result<()> {
    let mut first = true;
    for field in fields {
        if !first {
            w.write_all(b",")?;
        }
        first = false;

        if field.contains([',', '"', '\n', '\r']) {
            write!(w, "\"{}\"", field.replace('"', "\"\""))?;
        } else {
            w.write_all(field.as_bytes())?;
        }
    }
    w.write_all(b"\n")
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| r.iter().map(cell_text).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(c.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write_padded(f, self.columns.iter().map(String::as_str), &widths)?;
        for row in &cells {
            write_padded(f, row.iter().map(String::as_str), &widths)?;
        }
        write!(f, "[{} rows x {} columns]", self.rows.len(), self.columns.len())
    }
}

fn write_padded<'a>(
    f: &mut fmt::Formatter<'_>,
    fields: impl Iterator<Item = &'a str>,
    widths: &[usize],
) -> fmt::Result {
    let parts: Vec<String> = fields
        .zip(widths)
        .map(|(field, &width)| format!("{field:<width$}"))
        .collect();
    writeln!(f, "{}", parts.join("  ").trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_keys_are_joined() {
        let table = Table::from_json(&json!([{"a": 1, "b": {"c": 2}}]));
        assert_eq!(table.columns(), ["a", "b_c"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "a"), Some(&json!(1)));
        assert_eq!(table.get(0, "b_c"), Some(&json!(2)));
    }

    #[test]
    fn deep_nesting_and_column_union() {
        let table = Table::from_json(&json!([
            {"id": 1, "geo": {"city": {"name": "Ponce"}}},
            {"id": 2, "extra": true}
        ]));
        assert_eq!(table.columns(), ["id", "geo_city_name", "extra"]);
        assert_eq!(table.get(0, "extra"), Some(&Value::Null));
        assert_eq!(table.get(1, "geo_city_name"), Some(&Value::Null));
        assert_eq!(table.column("id").unwrap(), vec![&json!(1), &json!(2)]);
    }

    #[test]
    fn top_level_object_is_one_record() {
        let table = Table::from_json(&json!({"total": 10, "by": {"pcr": 7}}));
        assert_eq!(table.columns(), ["total", "by_pcr"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn nested_arrays_stay_in_one_cell() {
        let table = Table::from_json(&json!([{"tags": [1, {"x": 2}], "empty": {}}]));
        assert_eq!(table.columns(), ["tags"]);
        assert_eq!(table.get(0, "tags"), Some(&json!([1, {"x": 2}])));
    }

    #[test]
    fn scalar_elements_use_value_column() {
        let table = Table::from_json(&json!([1, "two", {"value": 3}]));
        assert_eq!(table.columns(), [SCALAR_COLUMN]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(1, SCALAR_COLUMN), Some(&json!("two")));
    }

    #[test]
    fn empty_array_is_empty_table() {
        let table = Table::from_json(&json!([]));
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
    }

    #[test]
    fn record_maps_columns_to_cells() {
        let table = Table::from_json(&json!([{"a": 1, "b": {"c": "x"}}]));
        let record = table.record(0).unwrap();
        assert_eq!(Value::Object(record), json!({"a": 1, "b_c": "x"}));
        assert!(table.record(1).is_none());
    }

    #[test]
    fn csv_quotes_special_fields() {
        let table = Table::from_json(&json!([
            {"name": "San Juan, PR", "note": "say \"hi\"", "n": 3},
            {"name": "Ponce"}
        ]));
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "name,note,n\n\"San Juan, PR\",\"say \"\"hi\"\"\",3\nPonce,,\n"
        );
    }

    #[test]
    fn csv_file_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.csv");
        Table::from_json(&json!([{"a": 1}]))
            .to_csv_file(&path)
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\n1\n");
    }

    #[test]
    fn display_aligns_columns() {
        let table = Table::from_json(&json!([
            {"city": "Ponce", "n": 12},
            {"city": "Aguadilla", "n": 3}
        ]));
        assert_eq!(
            table.to_string(),
            "city       n\nPonce      12\nAguadilla  3\n[2 rows x 2 columns]"
        );
    }
}
