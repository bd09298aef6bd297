use std::io::Cursor;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    binlog_error::BinlogError,
    column::column_type::ColumnType,
    ext::{
        bit_set::{BitOrder, BitSet},
        cursor_ext::CursorExt,
    },
};

// refer: https://github.com/mysql/mysql-server/blob/trunk/libs/mysql/binlog/event/rows_event.h
const SIGNEDNESS: u8 = 1;
const DEFAULT_CHARSET: u8 = 2;
const COLUMN_CHARSET: u8 = 3;
const COLUMN_NAME: u8 = 4;
const SET_STR_VALUE: u8 = 5;
const ENUM_STR_VALUE: u8 = 6;
const GEOMETRY_TYPE: u8 = 7;
const SIMPLE_PRIMARY_KEY: u8 = 8;
const PRIMARY_KEY_WITH_PREFIX: u8 = 9;
const ENUM_AND_SET_DEFAULT_CHARSET: u8 = 10;
const ENUM_AND_SET_COLUMN_CHARSET: u8 = 11;
const COLUMN_VISIBILITY: u8 = 12;

/// A default collation plus `(column index, collation)` overrides, where the
/// index counts only the columns the charset field applies to.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct DefaultCharset {
    pub default_charset: u32,
    pub charset_collations: Vec<(usize, u32)>,
}

impl DefaultCharset {
    pub fn charset_of(&self, index: usize) -> u32 {
        self.charset_collations
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, c)| *c)
            .unwrap_or(self.default_charset)
    }
}

/// Optional metadata block of a table map event. Every field is optional,
/// servers only send what `binlog_row_metadata` asks for.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct TableMetadata {
    pub signedness: Option<BitSet>,
    pub default_charset: Option<DefaultCharset>,
    pub column_charsets: Option<Vec<u32>>,
    pub column_names: Option<Vec<String>>,
    pub set_str_values: Option<Vec<Vec<String>>>,
    pub enum_str_values: Option<Vec<Vec<String>>>,
    pub geometry_types: Option<Vec<u32>>,
    pub simple_primary_keys: Option<Vec<usize>>,
    pub primary_keys_with_prefix: Option<Vec<(usize, usize)>>,
    pub enum_and_set_default_charset: Option<DefaultCharset>,
    pub enum_and_set_column_charsets: Option<Vec<u32>>,
    pub column_visibility: Option<BitSet>,
}

impl TableMetadata {
    /// Reads `(type, length, payload)` fields until the cursor is exhausted.
    pub fn parse(
        cursor: &mut Cursor<&[u8]>,
        column_types: &[ColumnType],
    ) -> Result<Self, BinlogError> {
        let numeric_count = column_types.iter().filter(|t| t.is_numeric()).count();
        let mut metadata = TableMetadata::default();

        while cursor.remaining() > 0 {
            let field_type = cursor.read_byte()?;
            let length = cursor.read_packed_number()? as usize;
            let mut field = cursor.sub_cursor(length)?;

            match field_type {
                SIGNEDNESS => {
                    metadata.signedness = Some(field.read_bits(numeric_count, BitOrder::MsbFirst)?)
                }
                DEFAULT_CHARSET => metadata.default_charset = Some(read_default_charset(&mut field)?),
                COLUMN_CHARSET => metadata.column_charsets = Some(read_numbers(&mut field)?),
                COLUMN_NAME => metadata.column_names = Some(read_strings(&mut field)?),
                SET_STR_VALUE => metadata.set_str_values = Some(read_type_values(&mut field)?),
                ENUM_STR_VALUE => metadata.enum_str_values = Some(read_type_values(&mut field)?),
                GEOMETRY_TYPE => metadata.geometry_types = Some(read_numbers(&mut field)?),
                SIMPLE_PRIMARY_KEY => {
                    metadata.simple_primary_keys = Some(
                        read_numbers(&mut field)?
                            .into_iter()
                            .map(|i| i as usize)
                            .collect(),
                    )
                }
                PRIMARY_KEY_WITH_PREFIX => {
                    metadata.primary_keys_with_prefix = Some(
                        read_pairs(&mut field)?
                            .into_iter()
                            .map(|(i, p)| (i, p as usize))
                            .collect(),
                    )
                }
                ENUM_AND_SET_DEFAULT_CHARSET => {
                    metadata.enum_and_set_default_charset = Some(read_default_charset(&mut field)?)
                }
                ENUM_AND_SET_COLUMN_CHARSET => {
                    metadata.enum_and_set_column_charsets = Some(read_numbers(&mut field)?)
                }
                COLUMN_VISIBILITY => {
                    metadata.column_visibility =
                        Some(field.read_bits(column_types.len(), BitOrder::MsbFirst)?)
                }
                other => trace!("skipping unknown table metadata field {}, {} bytes", other, length),
            }
        }

        Ok(metadata)
    }

    /// Column indices of the primary key, in key order.
    pub fn primary_key_columns(&self) -> Vec<usize> {
        if let Some(keys) = &self.simple_primary_keys {
            return keys.clone();
        }
        if let Some(keys) = &self.primary_keys_with_prefix {
            return keys.iter().map(|(i, _)| *i).collect();
        }
        Vec::new()
    }

    pub fn character_charset(&self, char_index: usize) -> Option<u32> {
        if let Some(charsets) = &self.column_charsets {
            return charsets.get(char_index).copied();
        }
        self.default_charset
            .as_ref()
            .map(|c| c.charset_of(char_index))
    }

    pub fn enum_and_set_charset(&self, enum_set_index: usize) -> Option<u32> {
        if let Some(charsets) = &self.enum_and_set_column_charsets {
            return charsets.get(enum_set_index).copied();
        }
        self.enum_and_set_default_charset
            .as_ref()
            .map(|c| c.charset_of(enum_set_index))
    }
}

fn read_numbers(cursor: &mut Cursor<&[u8]>) -> Result<Vec<u32>, BinlogError> {
    let mut numbers = Vec::new();
    while cursor.remaining() > 0 {
        numbers.push(cursor.read_packed_number()? as u32);
    }
    Ok(numbers)
}

fn read_pairs(cursor: &mut Cursor<&[u8]>) -> Result<Vec<(usize, u32)>, BinlogError> {
    let mut pairs = Vec::new();
    while cursor.remaining() > 0 {
        let index = cursor.read_packed_number()? as usize;
        let value = cursor.read_packed_number()? as u32;
        pairs.push((index, value));
    }
    Ok(pairs)
}

fn read_default_charset(cursor: &mut Cursor<&[u8]>) -> Result<DefaultCharset, BinlogError> {
    let default_charset = cursor.read_packed_number()? as u32;
    let charset_collations = read_pairs(cursor)?;
    Ok(DefaultCharset {
        default_charset,
        charset_collations,
    })
}

fn read_strings(cursor: &mut Cursor<&[u8]>) -> Result<Vec<String>, BinlogError> {
    let mut strings = Vec::new();
    while cursor.remaining() > 0 {
        strings.push(cursor.read_lenenc_string()?.unwrap_or_default());
    }
    Ok(strings)
}

fn read_type_values(cursor: &mut Cursor<&[u8]>) -> Result<Vec<Vec<String>>, BinlogError> {
    let mut result = Vec::new();
    while cursor.remaining() > 0 {
        let count = cursor.read_packed_number()? as usize;
        let mut values = Vec::with_capacity(count.min(cursor.remaining()));
        for _ in 0..count {
            values.push(cursor.read_lenenc_string()?.unwrap_or_default());
        }
        result.push(values);
    }
    Ok(result)
}
