use serde::{Deserialize, Serialize};

use super::column_type::ColumnType;

/// Per-column view of a table map, built once when the table map is decoded.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ColumnMetadata {
    pub name: Option<String>,
    pub column_type: ColumnType,
    /// Raw table map metadata, up to two bytes.
    pub metadata: u16,
    pub is_unsigned: bool,
    /// Position among numeric-class columns, used to index the signedness bitmap.
    pub numeric_index: Option<usize>,
    pub charset_id: Option<u32>,
    pub enum_values: Option<Vec<String>>,
    pub set_values: Option<Vec<String>>,
    pub is_visible: bool,
    pub is_nullable: bool,
}

impl ColumnMetadata {
    pub fn new(column_type: ColumnType, metadata: u16) -> Self {
        Self {
            name: None,
            column_type,
            metadata,
            is_unsigned: false,
            numeric_index: None,
            charset_id: None,
            enum_values: None,
            set_values: None,
            is_visible: true,
            is_nullable: true,
        }
    }

    /// Type and length a row codec should use for this column.
    pub fn resolve(&self) -> (ColumnType, u16) {
        self.column_type.resolve(self.metadata)
    }

    /// Effective type after STRING-type resolution.
    pub fn effective_type(&self) -> ColumnType {
        self.resolve().0
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_unsigned(mut self, is_unsigned: bool) -> Self {
        self.is_unsigned = is_unsigned;
        self
    }

    pub fn with_enum_values(mut self, values: &[&str]) -> Self {
        self.enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn with_set_values(mut self, values: &[&str]) -> Self {
        self.set_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }
}
