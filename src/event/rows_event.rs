use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::{
    binlog_error::BinlogError,
    constants::TABLE_ID_LENGTH,
    ext::{
        bit_set::{BitOrder, BitSet},
        cursor_ext::CursorExt,
    },
    replication_state::ReplicationState,
};

use super::{event_type::EventType, table_map_event::TableMapEvent};

/// V1 rows events (23-25) have no extra data block, V2 (30-32) do.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum RowsEventVersion {
    V1,
    V2,
}

impl RowsEventVersion {
    pub fn of(event_type: EventType) -> Self {
        match event_type {
            EventType::ExtWriteRows | EventType::ExtUpdateRows | EventType::ExtDeleteRows => {
                RowsEventVersion::V2
            }
            _ => RowsEventVersion::V1,
        }
    }
}

/// Fields shared by write, update and delete rows events, up to and
/// including the first column bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct RowsEventPrefix {
    pub table_id: u64,
    pub flags: u16,
    pub extra_data: Vec<u8>,
    pub column_count: usize,
    pub included_columns: BitSet,
}

impl RowsEventPrefix {
    pub fn parse(cursor: &mut Cursor<&[u8]>, version: RowsEventVersion) -> Result<Self, BinlogError> {
        let table_id = cursor.read_uint_le(TABLE_ID_LENGTH)?;
        let flags = cursor.read_uint_le(2)? as u16;

        let mut extra_data = Vec::new();
        if version == RowsEventVersion::V2 {
            // the length includes its own two bytes
            let extra_data_length = cursor.read_uint_le(2)? as usize;
            if extra_data_length < 2 {
                return Err(BinlogError::InvalidData(format!(
                    "invalid rows event extra data length {}",
                    extra_data_length
                )));
            }
            extra_data = cursor.read_bytes(extra_data_length - 2)?;
        }

        let column_count = cursor.read_packed_number()? as usize;
        let included_columns = cursor.read_bits(column_count, BitOrder::LsbFirst)?;
        Ok(Self {
            table_id,
            flags,
            extra_data,
            column_count,
            included_columns,
        })
    }
}

pub fn lookup_table_map(
    state: &ReplicationState,
    table_id: u64,
) -> Result<&TableMapEvent, BinlogError> {
    state
        .get_table_map(table_id)
        .ok_or(BinlogError::MissingTableMetadata { table_id })
}

/// Names of the included columns, `None` when the table map carries no names.
pub fn included_column_names(
    table_map_event: &TableMapEvent,
    included_columns: &BitSet,
) -> Option<Vec<String>> {
    let names = table_map_event.table_metadata.column_names.as_ref()?;
    if names.is_empty() {
        return None;
    }
    Some(
        (0..table_map_event.columns.len())
            .filter(|i| included_columns.get_or(*i, false))
            .map(|i| names.get(i).cloned().unwrap_or_default())
            .collect(),
    )
}
