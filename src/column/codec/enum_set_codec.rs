use std::io::Cursor;

use crate::{
    binlog_error::BinlogError,
    column::{column_metadata::ColumnMetadata, column_value::ColumnValue},
    ext::cursor_ext::CursorExt,
};

use super::ColumnCodec;

/// ENUM: a 1 or 2 byte, 1-based index into the column's string table.
/// Index 0 is the empty string, indices past the table decode as NULL.
pub struct EnumCodec;

/// SET: a 1 to 8 byte bitmask over the column's string table.
pub struct SetCodec;

impl ColumnCodec for EnumCodec {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        column: &ColumnMetadata,
        length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        let width = storage_width(length, 2)?;
        let index = cursor.read_uint_le(width)? as u16;

        let Some(values) = &column.enum_values else {
            return Ok(ColumnValue::EnumIndex(index));
        };
        if index == 0 {
            return Ok(ColumnValue::Enum(String::new()));
        }
        match values.get(index as usize - 1) {
            Some(v) => Ok(ColumnValue::Enum(v.clone())),
            None => Ok(ColumnValue::None),
        }
    }
}

impl ColumnCodec for SetCodec {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        column: &ColumnMetadata,
        length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        let width = storage_width(length, 8)?;
        let mask = cursor.read_uint_le(width)?;

        let Some(values) = &column.set_values else {
            return Ok(ColumnValue::SetBits(mask));
        };
        if values.len() < 64 && mask >> values.len() != 0 {
            return Ok(ColumnValue::None);
        }

        let members: Vec<&str> = values
            .iter()
            .enumerate()
            .filter(|(i, _)| *i < 64 && mask & (1u64 << i) != 0)
            .map(|(_, v)| v.as_str())
            .collect();
        Ok(ColumnValue::Set(members.join(",")))
    }
}

fn storage_width(length: u16, max: u16) -> Result<usize, BinlogError> {
    if length == 0 || length > max {
        return Err(BinlogError::InvalidData(format!(
            "invalid enum/set storage width {}",
            length
        )));
    }
    Ok(length as usize)
}
