pub mod bit_codec;
pub mod decimal_codec;
pub mod enum_set_codec;
pub mod float_codec;
pub mod integer_codec;
pub mod string_codec;
pub mod temporal_codec;

use std::{io::Cursor, sync::Arc};

use crate::binlog_error::BinlogError;

use self::{
    bit_codec::BitCodec,
    decimal_codec::NewDecimalCodec,
    enum_set_codec::{EnumCodec, SetCodec},
    float_codec::{DoubleCodec, FloatCodec},
    integer_codec::IntegerCodec,
    string_codec::{BlobCodec, VarCharCodec},
    temporal_codec::{
        DateCodec, DateTime2Codec, DateTimeCodec, Time2Codec, TimeCodec, Timestamp2Codec,
        TimestampCodec, YearCodec,
    },
};

use super::{column_metadata::ColumnMetadata, column_type::ColumnType, column_value::ColumnValue};

/// Decodes one non-null cell of a row image.
///
/// `length` is the column length after STRING-type resolution; for most types
/// it equals `column.metadata`.
pub trait ColumnCodec: Send + Sync {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        column: &ColumnMetadata,
        length: u16,
    ) -> Result<ColumnValue, BinlogError>;
}

/// Codec lookup by wire type code, built once per parser.
#[derive(Clone)]
pub struct CodecTable {
    codecs: Vec<Option<Arc<dyn ColumnCodec>>>,
}

impl CodecTable {
    pub fn empty() -> Self {
        Self {
            codecs: vec![None; 256],
        }
    }

    pub fn with_codec(mut self, column_type: ColumnType, codec: Arc<dyn ColumnCodec>) -> Self {
        self.codecs[column_type.code() as usize] = Some(codec);
        self
    }

    pub fn get(&self, column_type: ColumnType) -> Option<&Arc<dyn ColumnCodec>> {
        self.codecs[column_type.code() as usize].as_ref()
    }

    pub fn decode(
        &self,
        column_type: ColumnType,
        cursor: &mut Cursor<&[u8]>,
        column: &ColumnMetadata,
        length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        match self.get(column_type) {
            Some(codec) => codec.decode(cursor, column, length),
            None => Err(BinlogError::UnsupportedColumnType(column_type.code())),
        }
    }
}

impl Default for CodecTable {
    fn default() -> Self {
        let integer: Arc<dyn ColumnCodec> = Arc::new(IntegerCodec);
        let var_char: Arc<dyn ColumnCodec> = Arc::new(VarCharCodec);
        let blob: Arc<dyn ColumnCodec> = Arc::new(BlobCodec);

        Self::empty()
            .with_codec(ColumnType::Tiny, integer.clone())
            .with_codec(ColumnType::Short, integer.clone())
            .with_codec(ColumnType::Int24, integer.clone())
            .with_codec(ColumnType::Long, integer.clone())
            .with_codec(ColumnType::LongLong, integer)
            .with_codec(ColumnType::Float, Arc::new(FloatCodec))
            .with_codec(ColumnType::Double, Arc::new(DoubleCodec))
            .with_codec(ColumnType::NewDecimal, Arc::new(NewDecimalCodec))
            .with_codec(ColumnType::Year, Arc::new(YearCodec))
            .with_codec(ColumnType::Date, Arc::new(DateCodec))
            .with_codec(ColumnType::Time, Arc::new(TimeCodec))
            .with_codec(ColumnType::Time2, Arc::new(Time2Codec))
            .with_codec(ColumnType::DateTime, Arc::new(DateTimeCodec))
            .with_codec(ColumnType::DateTime2, Arc::new(DateTime2Codec))
            .with_codec(ColumnType::Timestamp, Arc::new(TimestampCodec))
            .with_codec(ColumnType::Timestamp2, Arc::new(Timestamp2Codec))
            .with_codec(ColumnType::VarChar, var_char.clone())
            .with_codec(ColumnType::VarString, var_char.clone())
            .with_codec(ColumnType::String, var_char)
            .with_codec(ColumnType::Blob, blob.clone())
            .with_codec(ColumnType::TinyBlob, blob.clone())
            .with_codec(ColumnType::MediumBlob, blob.clone())
            .with_codec(ColumnType::LongBlob, blob.clone())
            .with_codec(ColumnType::Json, blob.clone())
            .with_codec(ColumnType::Geometry, blob)
            .with_codec(ColumnType::Bit, Arc::new(BitCodec))
            .with_codec(ColumnType::Enum, Arc::new(EnumCodec))
            .with_codec(ColumnType::Set, Arc::new(SetCodec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstCodec;

    impl ColumnCodec for ConstCodec {
        fn decode(
            &self,
            _cursor: &mut Cursor<&[u8]>,
            _column: &ColumnMetadata,
            _length: u16,
        ) -> Result<ColumnValue, BinlogError> {
            Ok(ColumnValue::String("const".to_string()))
        }
    }

    #[test]
    fn test_missing_codec() {
        let table = CodecTable::default();
        let column = ColumnMetadata::new(ColumnType::Null, 0);
        let data: &[u8] = &[];
        let res = table.decode(ColumnType::Null, &mut Cursor::new(data), &column, 0);
        assert!(matches!(res, Err(BinlogError::UnsupportedColumnType(6))));
    }

    #[test]
    fn test_substitute_codec() {
        let table = CodecTable::default().with_codec(ColumnType::Long, Arc::new(ConstCodec));
        let column = ColumnMetadata::new(ColumnType::Long, 0);
        let data: &[u8] = &[1, 0, 0, 0];
        let value = table
            .decode(ColumnType::Long, &mut Cursor::new(data), &column, 0)
            .unwrap();
        assert_eq!(value, ColumnValue::String("const".to_string()));
    }
}
