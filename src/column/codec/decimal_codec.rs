use std::io::Cursor;

use crate::{
    binlog_error::BinlogError,
    column::{column_metadata::ColumnMetadata, column_value::ColumnValue},
    ext::cursor_ext::CursorExt,
};

use super::ColumnCodec;

const DIGITS_PER_WORD: usize = 9;
const BYTES_PER_WORD: usize = 4;
// bytes needed for a group of 0..=9 decimal digits
const DIG2BYTES: [usize; 10] = [0, 1, 1, 2, 2, 3, 3, 4, 4, 4];

/// NEWDECIMAL: metadata low byte is the precision, high byte the scale.
pub struct NewDecimalCodec;

impl ColumnCodec for NewDecimalCodec {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        column: &ColumnMetadata,
        _length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        let precision = (column.metadata & 0xFF) as usize;
        let scale = (column.metadata >> 8) as usize;
        Ok(ColumnValue::Decimal(decode_decimal(cursor, precision, scale)?))
    }
}

pub fn decimal_binary_size(precision: usize, scale: usize) -> usize {
    let intg = precision - scale;
    (intg / DIGITS_PER_WORD) * BYTES_PER_WORD
        + DIG2BYTES[intg % DIGITS_PER_WORD]
        + (scale / DIGITS_PER_WORD) * BYTES_PER_WORD
        + DIG2BYTES[scale % DIGITS_PER_WORD]
}

// refer: mysql-server strings/decimal.cc bin2decimal
pub fn decode_decimal(
    cursor: &mut Cursor<&[u8]>,
    precision: usize,
    scale: usize,
) -> Result<String, BinlogError> {
    if precision == 0 || scale > precision {
        return Err(BinlogError::InvalidData(format!(
            "invalid decimal precision {} and scale {}",
            precision, scale
        )));
    }

    let size = decimal_binary_size(precision, scale);
    let mut bytes = cursor.read_bytes(size)?;

    // the high bit of the first byte is set for non-negative values
    let negative = bytes[0] & 0x80 == 0;
    bytes[0] ^= 0x80;
    if negative {
        for b in bytes.iter_mut() {
            *b = !*b;
        }
    }

    let intg = precision - scale;
    let mut data = Cursor::new(bytes.as_slice());

    let mut int_digits = String::new();
    let leading = intg % DIGITS_PER_WORD;
    if leading > 0 {
        let value = read_group(&mut data, leading)?;
        int_digits.push_str(&value.to_string());
    }
    for _ in 0..intg / DIGITS_PER_WORD {
        let value = read_group(&mut data, DIGITS_PER_WORD)?;
        int_digits.push_str(&format!("{:09}", value));
    }

    let int_digits = int_digits.trim_start_matches('0');
    let mut result = if int_digits.is_empty() {
        "0".to_string()
    } else {
        int_digits.to_string()
    };

    if scale > 0 {
        result.push('.');
        for _ in 0..scale / DIGITS_PER_WORD {
            let value = read_group(&mut data, DIGITS_PER_WORD)?;
            result.push_str(&format!("{:09}", value));
        }
        let trailing = scale % DIGITS_PER_WORD;
        if trailing > 0 {
            let value = read_group(&mut data, trailing)?;
            result.push_str(&format!("{:0width$}", value, width = trailing));
        }
    }

    // negative zero is rendered without a sign
    let is_zero = result.chars().all(|c| c == '0' || c == '.');
    if negative && !is_zero {
        result.insert(0, '-');
    }
    Ok(result)
}

fn read_group(data: &mut Cursor<&[u8]>, digits: usize) -> Result<u32, BinlogError> {
    let value = data.read_uint_be(DIG2BYTES[digits])? as u32;
    if value >= 10u32.pow(digits as u32) {
        return Err(BinlogError::InvalidData(format!(
            "decimal group {} exceeds {} digits",
            value, digits
        )));
    }
    Ok(value)
}
