use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::{
    binlog_error::BinlogError,
    column::{codec::CodecTable, column_value::ColumnValue},
    ext::{
        bit_set::{BitOrder, BitSet},
        cursor_ext::CursorExt,
    },
};

use super::table_map_event::TableMapEvent;

/// One row image: one value per included column, in column order.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RowEvent {
    pub column_values: Vec<ColumnValue>,
}

pub fn included_column_count(table_map_event: &TableMapEvent, included_columns: &BitSet) -> usize {
    (0..table_map_event.columns.len())
        .filter(|i| included_columns.get_or(*i, false))
        .count()
}

impl RowEvent {
    pub fn parse(
        cursor: &mut Cursor<&[u8]>,
        table_map_event: &TableMapEvent,
        included_columns: &BitSet,
        codecs: &CodecTable,
    ) -> Result<Self, BinlogError> {
        let column_count = included_column_count(table_map_event, included_columns);
        let null_columns = cursor.read_bits(column_count, BitOrder::LsbFirst)?;

        let mut column_values = Vec::with_capacity(column_count);
        for (i, column) in table_map_event.columns.iter().enumerate() {
            if !included_columns.get_or(i, false) {
                continue;
            }

            let index = column_values.len();
            if null_columns.get_or(index, true) {
                column_values.push(ColumnValue::None);
                continue;
            }

            let (column_type, column_length) = column.resolve();
            let value = codecs.decode(column_type, cursor, column, column_length)?;
            column_values.push(value);
        }

        Ok(Self { column_values })
    }
}
