use std::io::Cursor;

use crate::{
    binlog_error::BinlogError,
    column::{column_metadata::ColumnMetadata, column_type::ColumnType, column_value::ColumnValue},
    ext::cursor_ext::CursorExt,
};

use super::ColumnCodec;

/// TINY, SHORT, INT24, LONG and LONGLONG, little-endian fixed width.
pub struct IntegerCodec;

impl ColumnCodec for IntegerCodec {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        column: &ColumnMetadata,
        _length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        let unsigned = column.is_unsigned;
        let value = match column.column_type {
            ColumnType::Tiny => {
                let v = cursor.read_byte()?;
                if unsigned {
                    ColumnValue::UnsignedTiny(v)
                } else {
                    ColumnValue::Tiny(v as i8)
                }
            }
            ColumnType::Short => {
                let v = cursor.read_uint_le(2)? as u16;
                if unsigned {
                    ColumnValue::UnsignedShort(v)
                } else {
                    ColumnValue::Short(v as i16)
                }
            }
            ColumnType::Int24 => {
                let v = cursor.read_uint_le(3)? as u32;
                if unsigned {
                    ColumnValue::UnsignedLong(v)
                } else {
                    // sign-extend the 24-bit value into 32 bits
                    ColumnValue::Long(((v << 8) as i32) >> 8)
                }
            }
            ColumnType::Long => {
                let v = cursor.read_uint_le(4)? as u32;
                if unsigned {
                    ColumnValue::UnsignedLong(v)
                } else {
                    ColumnValue::Long(v as i32)
                }
            }
            ColumnType::LongLong => {
                let v = cursor.read_uint_le(8)?;
                if unsigned {
                    ColumnValue::UnsignedLongLong(v)
                } else {
                    ColumnValue::LongLong(v as i64)
                }
            }
            other => return Err(BinlogError::UnsupportedColumnType(other.code())),
        };
        Ok(value)
    }
}
