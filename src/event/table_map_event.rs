use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::{
    binlog_error::BinlogError,
    column::{column_metadata::ColumnMetadata, column_type::ColumnType},
    constants::TABLE_ID_LENGTH,
    ext::{
        bit_set::{BitOrder, BitSet},
        cursor_ext::CursorExt,
    },
};

use super::{event_type::EventType, table_metadata::TableMetadata};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TableMapEvent {
    pub table_id: u64,
    pub schema_name: String,
    pub table_name: String,
    pub column_types: Vec<ColumnType>,
    pub column_metas: Vec<u16>,
    pub null_bits: BitSet,
    pub table_metadata: TableMetadata,
    pub columns: Vec<ColumnMetadata>,
}

impl TableMapEvent {
    pub fn parse(cursor: &mut Cursor<&[u8]>) -> Result<Self, BinlogError> {
        let table_id = cursor.read_uint_le(TABLE_ID_LENGTH)?;
        Self::parse_body(cursor, table_id)
            .map_err(|e| e.with_event_context(EventType::TableMap, Some(table_id)))
    }

    fn parse_body(cursor: &mut Cursor<&[u8]>, table_id: u64) -> Result<Self, BinlogError> {
        // flags
        cursor.skip(2)?;

        let schema_name_length = cursor.read_byte()? as usize;
        let schema_name = cursor.read_string(schema_name_length)?;
        cursor.skip(1)?;

        let table_name_length = cursor.read_byte()? as usize;
        let table_name = cursor.read_string(table_name_length)?;
        cursor.skip(1)?;

        let column_count = cursor.read_packed_number()? as usize;
        let column_types: Vec<ColumnType> = cursor
            .read_slice(column_count)?
            .iter()
            .map(|code| ColumnType::from_code(*code))
            .collect();

        let metadata_length = cursor.read_packed_number()? as usize;
        let mut metadata_cursor = cursor.sub_cursor(metadata_length)?;
        let column_metas = Self::read_column_metas(&mut metadata_cursor, &column_types)?;

        let null_bits = cursor.read_bits(column_count, BitOrder::LsbFirst)?;

        let table_metadata = TableMetadata::parse(cursor, &column_types)?;
        let columns = Self::build_columns(&column_types, &column_metas, &null_bits, &table_metadata);

        Ok(Self {
            table_id,
            schema_name,
            table_name,
            column_types,
            column_metas,
            null_bits,
            table_metadata,
            columns,
        })
    }

    fn read_column_metas(
        cursor: &mut Cursor<&[u8]>,
        column_types: &[ColumnType],
    ) -> Result<Vec<u16>, BinlogError> {
        let mut column_metas = Vec::with_capacity(column_types.len());
        for column_type in column_types {
            let meta = match column_type.metadata_width() {
                0 => 0,
                1 => cursor.read_byte()? as u16,
                _ if column_type.metadata_is_big_endian() => cursor.read_uint_be(2)? as u16,
                _ => cursor.read_uint_le(2)? as u16,
            };
            column_metas.push(meta);
        }
        Ok(column_metas)
    }

    fn build_columns(
        column_types: &[ColumnType],
        column_metas: &[u16],
        null_bits: &BitSet,
        table_metadata: &TableMetadata,
    ) -> Vec<ColumnMetadata> {
        let names = table_metadata.column_names.as_deref().unwrap_or_default();
        let visibility = table_metadata.column_visibility.as_ref();

        let mut columns: Vec<ColumnMetadata> = column_types
            .iter()
            .zip(column_metas)
            .enumerate()
            .map(|(i, (column_type, meta))| {
                let mut column = ColumnMetadata::new(*column_type, *meta);
                column.name = names.get(i).cloned();
                column.is_nullable = null_bits.get_or(i, true);
                column.is_visible = visibility.map_or(true, |v| v.get_or(i, true));
                column
            })
            .collect();

        Self::assign_signedness(&mut columns, table_metadata);
        Self::assign_enum_values(&mut columns, table_metadata);
        Self::assign_set_values(&mut columns, table_metadata);
        Self::assign_charsets(&mut columns, table_metadata);
        columns
    }

    /// The signedness bitmap only covers numeric columns, in column order.
    fn assign_signedness(columns: &mut [ColumnMetadata], table_metadata: &TableMetadata) {
        let mut numeric_index = 0;
        for column in columns.iter_mut() {
            if !column.column_type.is_numeric() {
                continue;
            }
            column.numeric_index = Some(numeric_index);
            column.is_unsigned = table_metadata
                .signedness
                .as_ref()
                .map_or(false, |s| s.get_or(numeric_index, false));
            numeric_index += 1;
        }
    }

    fn assign_enum_values(columns: &mut [ColumnMetadata], table_metadata: &TableMetadata) {
        let Some(values) = &table_metadata.enum_str_values else {
            return;
        };
        let mut tables = values.iter();
        for column in columns.iter_mut() {
            if column.effective_type() == ColumnType::Enum {
                column.enum_values = tables.next().cloned();
            }
        }
    }

    fn assign_set_values(columns: &mut [ColumnMetadata], table_metadata: &TableMetadata) {
        let Some(values) = &table_metadata.set_str_values else {
            return;
        };
        let mut tables = values.iter();
        for column in columns.iter_mut() {
            if column.effective_type() == ColumnType::Set {
                column.set_values = tables.next().cloned();
            }
        }
    }

    fn assign_charsets(columns: &mut [ColumnMetadata], table_metadata: &TableMetadata) {
        let mut char_index = 0;
        let mut enum_set_index = 0;
        for column in columns.iter_mut() {
            let effective_type = column.effective_type();
            if effective_type == ColumnType::Enum || effective_type == ColumnType::Set {
                column.charset_id = table_metadata.enum_and_set_charset(enum_set_index);
                enum_set_index += 1;
            } else if effective_type.is_character() {
                column.charset_id = table_metadata.character_charset(char_index);
                char_index += 1;
            }
        }
    }

    pub fn column_names(&self) -> Option<Vec<String>> {
        self.table_metadata.column_names.clone()
    }

    pub fn primary_key_columns(&self) -> Vec<usize> {
        self.table_metadata.primary_key_columns()
    }
}
