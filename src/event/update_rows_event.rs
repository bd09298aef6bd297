use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::{
    binlog_error::BinlogError,
    column::codec::CodecTable,
    ext::{
        bit_set::{BitOrder, BitSet},
        cursor_ext::CursorExt,
    },
    replication_state::ReplicationState,
};

use super::{
    event_type::EventType,
    row_event::RowEvent,
    row_set::{CellValue, RowSet},
    rows_event::{included_column_names, lookup_table_map, RowsEventPrefix, RowsEventVersion},
    table_map_event::TableMapEvent,
};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UpdateRowsEvent {
    pub table_id: u64,
    pub flags: u16,
    pub schema_name: String,
    pub table_name: String,
    pub included_columns_before: BitSet,
    pub included_columns_after: BitSet,
    pub rows: RowSet,
}

impl UpdateRowsEvent {
    pub fn parse(
        cursor: &mut Cursor<&[u8]>,
        event_type: EventType,
        state: &ReplicationState,
        codecs: &CodecTable,
    ) -> Result<Self, BinlogError> {
        let prefix = RowsEventPrefix::parse(cursor, RowsEventVersion::of(event_type))?;
        let included_columns_after = cursor.read_bits(prefix.column_count, BitOrder::LsbFirst)?;
        let table_map_event = lookup_table_map(state, prefix.table_id)?;

        let mut rows = Vec::new();
        while cursor.remaining() > 0 {
            let (before, after) = Self::parse_row_pair(
                cursor,
                table_map_event,
                &prefix.included_columns,
                &included_columns_after,
                codecs,
            )
            .map_err(|e| e.with_event_context(event_type, Some(prefix.table_id)))?;

            // pair cells up to the shorter of the two images
            let cells: Vec<CellValue> = before
                .column_values
                .into_iter()
                .zip(after.column_values)
                .map(|(old, new)| CellValue::Update { old, new })
                .collect();
            rows.push(cells);
        }

        Ok(Self {
            table_id: prefix.table_id,
            flags: prefix.flags,
            schema_name: table_map_event.schema_name.clone(),
            table_name: table_map_event.table_name.clone(),
            rows: RowSet {
                column_names: included_column_names(table_map_event, &prefix.included_columns),
                rows,
            },
            included_columns_before: prefix.included_columns,
            included_columns_after,
        })
    }

    fn parse_row_pair(
        cursor: &mut Cursor<&[u8]>,
        table_map_event: &TableMapEvent,
        included_columns_before: &BitSet,
        included_columns_after: &BitSet,
        codecs: &CodecTable,
    ) -> Result<(RowEvent, RowEvent), BinlogError> {
        let before = RowEvent::parse(cursor, table_map_event, included_columns_before, codecs)?;
        let after = RowEvent::parse(cursor, table_map_event, included_columns_after, codecs)?;
        Ok((before, after))
    }
}
