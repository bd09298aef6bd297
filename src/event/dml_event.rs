use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::{
    delete_rows_event::DeleteRowsEvent, row_set::RowSet, update_rows_event::UpdateRowsEvent,
    write_rows_event::WriteRowsEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DmlType {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for DmlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DmlType::Insert => write!(f, "INSERT"),
            DmlType::Update => write!(f, "UPDATE"),
            DmlType::Delete => write!(f, "DELETE"),
        }
    }
}

/// Common view over write, update and delete rows events.
pub trait DmlEvent {
    fn table_id(&self) -> u64;

    fn schema_name(&self) -> &str;

    fn table_name(&self) -> &str;

    fn dml_type(&self) -> DmlType;

    fn row_set(&self) -> &RowSet;

    fn rows_as_json(&self) -> Vec<Value> {
        self.row_set().to_json()
    }

    fn row_count(&self) -> usize {
        self.row_set().len()
    }
}

macro_rules! impl_dml_event {
    ($event:ty, $dml_type:expr) => {
        impl DmlEvent for $event {
            fn table_id(&self) -> u64 {
                self.table_id
            }

            fn schema_name(&self) -> &str {
                &self.schema_name
            }

            fn table_name(&self) -> &str {
                &self.table_name
            }

            fn dml_type(&self) -> DmlType {
                $dml_type
            }

            fn row_set(&self) -> &RowSet {
                &self.rows
            }
        }
    };
}

impl_dml_event!(WriteRowsEvent, DmlType::Insert);
impl_dml_event!(UpdateRowsEvent, DmlType::Update);
impl_dml_event!(DeleteRowsEvent, DmlType::Delete);
