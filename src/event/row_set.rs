use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::column::column_value::ColumnValue;

/// One cell of a decoded row. Update events pair the before and after images.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub enum CellValue {
    Value(ColumnValue),
    Update { old: ColumnValue, new: ColumnValue },
}

impl CellValue {
    pub fn value(&self) -> Option<&ColumnValue> {
        match self {
            CellValue::Value(v) => Some(v),
            CellValue::Update { .. } => None,
        }
    }

    pub fn old_value(&self) -> Option<&ColumnValue> {
        match self {
            CellValue::Value(_) => None,
            CellValue::Update { old, .. } => Some(old),
        }
    }

    pub fn new_value(&self) -> Option<&ColumnValue> {
        match self {
            CellValue::Value(_) => None,
            CellValue::Update { new, .. } => Some(new),
        }
    }
}

/// Rows of one rows event. Each row holds one cell per included column, in
/// column order.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct RowSet {
    pub column_names: Option<Vec<String>>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_name(&self, index: usize) -> String {
        self.column_names
            .as_ref()
            .and_then(|names| names.get(index).cloned())
            .unwrap_or_else(|| format!("COLUMN_{}", index + 1))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names
            .as_ref()
            .and_then(|names| names.iter().position(|n| n == name))
    }

    /// Cell of `row` for the named column.
    pub fn cell(&self, row: usize, name: &str) -> Option<&CellValue> {
        let index = self.column_index(name)?;
        self.rows.get(row)?.get(index)
    }

    /// Renders each row as a json object keyed by column name. Update rows
    /// become `{"before": {..}, "after": {..}}`.
    pub fn to_json(&self) -> Vec<Value> {
        self.rows.iter().map(|row| self.row_to_json(row)).collect()
    }

    fn row_to_json(&self, row: &[CellValue]) -> Value {
        let is_update = row
            .iter()
            .any(|cell| matches!(cell, CellValue::Update { .. }));

        if !is_update {
            let mut object = Map::new();
            for (i, cell) in row.iter().enumerate() {
                let value = cell.value().map_or(Value::Null, |v| v.to_json());
                object.insert(self.column_name(i), value);
            }
            return Value::Object(object);
        }

        let mut before = Map::new();
        let mut after = Map::new();
        for (i, cell) in row.iter().enumerate() {
            let (old, new) = match cell {
                CellValue::Update { old, new } => (old.to_json(), new.to_json()),
                CellValue::Value(v) => (v.to_json(), v.to_json()),
            };
            before.insert(self.column_name(i), old);
            after.insert(self.column_name(i), new);
        }

        let mut object = Map::new();
        object.insert("before".to_string(), Value::Object(before));
        object.insert("after".to_string(), Value::Object(after));
        Value::Object(object)
    }
}
