use std::io::Cursor;

use crate::{
    binlog_error::BinlogError,
    column::{column_metadata::ColumnMetadata, column_value::ColumnValue},
    ext::cursor_ext::CursorExt,
};

use super::ColumnCodec;

// refer: mysql-server mysys/my_time.cc
const DATETIMEF_INT_OFS: i64 = 0x80_0000_0000;
const TIMEF_INT_OFS: i64 = 0x80_0000;
const TIMEF_OFS: i64 = 0x8000_0000_0000;

pub struct YearCodec;
pub struct DateCodec;
pub struct TimeCodec;
pub struct Time2Codec;
pub struct DateTimeCodec;
pub struct DateTime2Codec;
pub struct TimestampCodec;
pub struct Timestamp2Codec;

impl ColumnCodec for YearCodec {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        _column: &ColumnMetadata,
        _length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        let v = cursor.read_byte()? as u16;
        // 0 is the zero year, not 1900
        Ok(ColumnValue::Year(if v == 0 { 0 } else { v + 1900 }))
    }
}

impl ColumnCodec for DateCodec {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        _column: &ColumnMetadata,
        _length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        let v = cursor.read_uint_le(3)?;
        let day = v & 0x1F;
        let month = (v >> 5) & 0x0F;
        let year = v >> 9;
        Ok(ColumnValue::Date(format!(
            "{:04}-{:02}-{:02}",
            year, month, day
        )))
    }
}

impl ColumnCodec for TimeCodec {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        _column: &ColumnMetadata,
        _length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        // HHMMSS as a signed 3-byte integer
        let v = cursor.read_int_le(3)?;
        let abs = v.unsigned_abs();
        let second = abs % 100;
        let minute = (abs / 100) % 100;
        let hour = abs / 10000;
        let sign = if v < 0 { "-" } else { "" };
        Ok(ColumnValue::Time(format!(
            "{}{:02}:{:02}:{:02}",
            sign, hour, minute, second
        )))
    }
}

impl ColumnCodec for Time2Codec {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        column: &ColumnMetadata,
        _length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        let fsp = fractional_precision(column)?;
        let packed = match fsp {
            0 => (cursor.read_uint_be(3)? as i64 - TIMEF_INT_OFS) << 24,
            1 | 2 => {
                let mut int_part = cursor.read_uint_be(3)? as i64 - TIMEF_INT_OFS;
                let mut frac = cursor.read_byte()? as i64;
                if int_part < 0 && frac != 0 {
                    int_part += 1;
                    frac -= 0x100;
                }
                (int_part << 24) + frac * 10000
            }
            3 | 4 => {
                let mut int_part = cursor.read_uint_be(3)? as i64 - TIMEF_INT_OFS;
                let mut frac = cursor.read_uint_be(2)? as i64;
                if int_part < 0 && frac != 0 {
                    int_part += 1;
                    frac -= 0x10000;
                }
                (int_part << 24) + frac * 100
            }
            _ => cursor.read_uint_be(6)? as i64 - TIMEF_OFS,
        };

        let negative = packed < 0;
        let packed = packed.unsigned_abs();
        let micros = packed % (1 << 24);
        let hms = packed >> 24;
        let hour = (hms >> 12) % (1 << 10);
        let minute = (hms >> 6) % (1 << 6);
        let second = hms % (1 << 6);

        let sign = if negative { "-" } else { "" };
        Ok(ColumnValue::Time(format!(
            "{}{:02}:{:02}:{:02}{}",
            sign,
            hour,
            minute,
            second,
            format_fraction(micros as u32, fsp)
        )))
    }
}

impl ColumnCodec for DateTimeCodec {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        _column: &ColumnMetadata,
        _length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        // YYYYMMDDHHMMSS as a decimal number
        let v = cursor.read_uint_le(8)?;
        let second = v % 100;
        let minute = (v / 100) % 100;
        let hour = (v / 10_000) % 100;
        let day = (v / 1_000_000) % 100;
        let month = (v / 100_000_000) % 100;
        let year = v / 10_000_000_000;
        Ok(ColumnValue::DateTime(format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            year, month, day, hour, minute, second
        )))
    }
}

impl ColumnCodec for DateTime2Codec {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        column: &ColumnMetadata,
        _length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        let fsp = fractional_precision(column)?;
        let int_part = cursor.read_uint_be(5)? as i64 - DATETIMEF_INT_OFS;
        let micros = read_fraction(cursor, fsp)?;
        if int_part < 0 {
            return Err(BinlogError::InvalidData(format!(
                "negative datetime2 value {}",
                int_part
            )));
        }

        let ymdhms = int_part as u64;
        let ymd = ymdhms >> 17;
        let ym = ymd >> 5;
        let hms = ymdhms % (1 << 17);

        let day = ymd % (1 << 5);
        let month = ym % 13;
        let year = ym / 13;
        let second = hms % (1 << 6);
        let minute = (hms >> 6) % (1 << 6);
        let hour = hms >> 12;

        Ok(ColumnValue::DateTime(format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}{}",
            year,
            month,
            day,
            hour,
            minute,
            second,
            format_fraction(micros, fsp)
        )))
    }
}

impl ColumnCodec for TimestampCodec {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        _column: &ColumnMetadata,
        _length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        let seconds = cursor.read_uint_le(4)? as i64;
        Ok(ColumnValue::Timestamp(seconds * 1_000_000))
    }
}

impl ColumnCodec for Timestamp2Codec {
    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        column: &ColumnMetadata,
        _length: u16,
    ) -> Result<ColumnValue, BinlogError> {
        let fsp = fractional_precision(column)?;
        let seconds = cursor.read_uint_be(4)? as i64;
        let micros = read_fraction(cursor, fsp)? as i64;
        Ok(ColumnValue::Timestamp(seconds * 1_000_000 + micros))
    }
}

fn fractional_precision(column: &ColumnMetadata) -> Result<usize, BinlogError> {
    let fsp = column.metadata as usize;
    if fsp > 6 {
        return Err(BinlogError::InvalidData(format!(
            "invalid fractional seconds precision {}",
            fsp
        )));
    }
    Ok(fsp)
}

/// Reads the `(fsp + 1) / 2` byte fraction and scales it to microseconds.
pub fn read_fraction(cursor: &mut Cursor<&[u8]>, fsp: usize) -> Result<u32, BinlogError> {
    let width = (fsp + 1) / 2;
    if width == 0 {
        return Ok(0);
    }
    let v = cursor.read_uint_be(width)? as u32;
    Ok(v * 100u32.pow(3 - width as u32))
}

fn format_fraction(micros: u32, fsp: usize) -> String {
    if fsp == 0 {
        return String::new();
    }
    let digits = format!("{:06}", micros);
    format!(".{}", &digits[..fsp])
}
