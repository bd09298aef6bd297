use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::{
    binlog_error::BinlogError,
    column::{column_metadata::ColumnMetadata, column_value::ColumnValue},
    ext::cursor_ext::CursorExt,
};

use super::ColumnCodec;

pub struct FloatCodec;

pub struct DoubleCodec;

impl ColumnCodec for FloatCodec {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        _column: &ColumnMetadata,
        _length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        cursor.ensure(4)?;
        Ok(ColumnValue::Float(cursor.read_f32::<LittleEndian>()?))
    }
}

impl ColumnCodec for DoubleCodec {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        _column: &ColumnMetadata,
        _length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        cursor.ensure(8)?;
        Ok(ColumnValue::Double(cursor.read_f64::<LittleEndian>()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::column_type::ColumnType;

    #[test]
    fn test_float_and_double() {
        let column = ColumnMetadata::new(ColumnType::Float, 4);
        let bytes = 1.5f32.to_le_bytes();
        let data: &[u8] = &bytes;
        assert_eq!(
            FloatCodec.decode(&mut Cursor::new(data), &column, 4).unwrap(),
            ColumnValue::Float(1.5)
        );

        let column = ColumnMetadata::new(ColumnType::Double, 8);
        let bytes = (-2.25f64).to_le_bytes();
        let data: &[u8] = &bytes;
        assert_eq!(
            DoubleCodec.decode(&mut Cursor::new(data), &column, 8).unwrap(),
            ColumnValue::Double(-2.25)
        );
    }

    #[test]
    fn test_short_double() {
        let column = ColumnMetadata::new(ColumnType::Double, 8);
        let data: &[u8] = &[0, 0, 0];
        let res = DoubleCodec.decode(&mut Cursor::new(data), &column, 8);
        assert!(matches!(res, Err(BinlogError::UnexpectedEof { .. })));
    }
}
