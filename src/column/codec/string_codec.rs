use std::io::Cursor;

use crate::{
    binlog_error::BinlogError,
    column::{column_metadata::ColumnMetadata, column_type::ColumnType, column_value::ColumnValue},
    ext::cursor_ext::CursorExt,
};

use super::ColumnCodec;

// charset id of the `binary` collation
const BINARY_CHARSET: u32 = 63;

/// VARCHAR, VAR_STRING and CHAR: 1-byte length prefix below 256, otherwise 2.
pub struct VarCharCodec;

/// BLOB family, JSON and GEOMETRY: the metadata gives the length prefix width.
pub struct BlobCodec;

impl ColumnCodec for VarCharCodec {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        _column: &ColumnMetadata,
        length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        let prefix = if length < 256 { 1 } else { 2 };
        let n = cursor.read_uint_le(prefix)? as usize;
        let bytes = cursor.read_bytes(n)?;
        Ok(text_or_binary(bytes))
    }
}

impl ColumnCodec for BlobCodec {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        column: &ColumnMetadata,
        _length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        let prefix = column.metadata as usize;
        if !(1..=4).contains(&prefix) {
            return Err(BinlogError::InvalidData(format!(
                "invalid length prefix width {} for {:?}",
                prefix, column.column_type
            )));
        }
        let n = cursor.read_uint_le(prefix)? as usize;
        let bytes = cursor.read_bytes(n)?;
        let value = match column.column_type {
            ColumnType::Json => ColumnValue::Json(bytes),
            ColumnType::Geometry => ColumnValue::Geometry(bytes),
            // TEXT columns share the BLOB wire type
            _ => match column.charset_id {
                Some(charset) if charset != BINARY_CHARSET => text_or_binary(bytes),
                _ => ColumnValue::Blob(bytes),
            },
        };
        Ok(value)
    }
}

fn text_or_binary(bytes: Vec<u8>) -> ColumnValue {
    match String::from_utf8(bytes) {
        Ok(s) => ColumnValue::String(s),
        Err(e) => ColumnValue::Binary(e.into_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varchar_prefix_width() {
        let column = ColumnMetadata::new(ColumnType::VarChar, 200);
        let data: &[u8] = b"\x06Widget";
        let mut cursor = Cursor::new(data);
        assert_eq!(
            VarCharCodec.decode(&mut cursor, &column, 200).unwrap(),
            ColumnValue::String("Widget".to_string())
        );
        assert_eq!(cursor.remaining(), 0);

        let column = ColumnMetadata::new(ColumnType::VarChar, 1000);
        let data: &[u8] = b"\x05\x00Kerry";
        assert_eq!(
            VarCharCodec
                .decode(&mut Cursor::new(data), &column, 1000)
                .unwrap(),
            ColumnValue::String("Kerry".to_string())
        );
    }

    #[test]
    fn test_varchar_non_utf8() {
        let column = ColumnMetadata::new(ColumnType::VarChar, 10);
        let data: &[u8] = &[2, 0xFF, 0xFE];
        assert_eq!(
            VarCharCodec.decode(&mut Cursor::new(data), &column, 10).unwrap(),
            ColumnValue::Binary(vec![0xFF, 0xFE])
        );
    }

    #[test]
    fn test_varchar_overrun() {
        let column = ColumnMetadata::new(ColumnType::VarChar, 10);
        let data: &[u8] = &[9, b'a', b'b'];
        let res = VarCharCodec.decode(&mut Cursor::new(data), &column, 10);
        assert!(matches!(res, Err(BinlogError::UnexpectedEof { needed: 9, remaining: 2 })));
    }

    #[test]
    fn test_blob_json_geometry() {
        let column = ColumnMetadata::new(ColumnType::Blob, 2);
        let data: &[u8] = &[3, 0, 1, 2, 3];
        assert_eq!(
            BlobCodec.decode(&mut Cursor::new(data), &column, 2).unwrap(),
            ColumnValue::Blob(vec![1, 2, 3])
        );

        let column = ColumnMetadata::new(ColumnType::Json, 4);
        let data: &[u8] = &[1, 0, 0, 0, 0x04];
        assert_eq!(
            BlobCodec.decode(&mut Cursor::new(data), &column, 4).unwrap(),
            ColumnValue::Json(vec![0x04])
        );

        let column = ColumnMetadata::new(ColumnType::Geometry, 1);
        let data: &[u8] = &[2, 9, 9];
        assert_eq!(
            BlobCodec.decode(&mut Cursor::new(data), &column, 1).unwrap(),
            ColumnValue::Geometry(vec![9, 9])
        );
    }

    #[test]
    fn test_text_column() {
        let mut column = ColumnMetadata::new(ColumnType::Blob, 2);
        column.charset_id = Some(255);
        let data: &[u8] = &[2, 0, b'h', b'i'];
        assert_eq!(
            BlobCodec.decode(&mut Cursor::new(data), &column, 2).unwrap(),
            ColumnValue::String("hi".to_string())
        );
    }

    #[test]
    fn test_blob_length_overrun() {
        let column = ColumnMetadata::new(ColumnType::Blob, 4);
        let data: &[u8] = &[0xFF, 0xFF, 0, 0, 1];
        let res = BlobCodec.decode(&mut Cursor::new(data), &column, 4);
        assert!(matches!(res, Err(BinlogError::UnexpectedEof { .. })));
    }
}
