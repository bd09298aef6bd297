use std::io::Cursor;

use crate::{
    binlog_error::BinlogError,
    column::{column_metadata::ColumnMetadata, column_value::ColumnValue},
    ext::{bit_set::BitSet, cursor_ext::CursorExt},
};

use super::ColumnCodec;

/// BIT(n): metadata high byte is whole bytes, low byte the leftover bits.
/// The value is stored big-endian; bit 0 of the result is the least
/// significant bit.
pub struct BitCodec;

impl ColumnCodec for BitCodec {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        column: &ColumnMetadata,
        _length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        let meta = column.metadata as usize;
        let bit_count = (meta >> 8) * 8 + (meta & 0xFF);
        if bit_count > 64 {
            return Err(BinlogError::InvalidData(format!(
                "bit column too wide: {} bits",
                bit_count
            )));
        }

        let value = cursor.read_uint_be(BitSet::byte_len(bit_count))?;
        let bits = (0..bit_count).map(|i| (value >> i) & 1 == 1).collect();
        Ok(ColumnValue::Bit(BitSet::from_bools(bits)))
    }
}
