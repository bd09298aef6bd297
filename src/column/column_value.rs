use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ext::bit_set::BitSet;

const HEX_CODES: [char; 16] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F',
];

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub enum ColumnValue {
    None,
    Tiny(i8),
    UnsignedTiny(u8),
    Short(i16),
    UnsignedShort(u16),
    // INT and MEDIUMINT
    Long(i32),
    UnsignedLong(u32),
    LongLong(i64),
    UnsignedLongLong(u64),
    Float(f32),
    Double(f64),
    // NEWDECIMAL rendered in plain decimal notation, e.g. "-123.45"
    Decimal(String),
    // "YYYY-MM-DD"
    Date(String),
    // "[-]HH:MM:SS[.ffffff]"
    Time(String),
    // "YYYY-MM-DD HH:MM:SS[.ffffff]"
    DateTime(String),
    // microseconds since epoch
    Timestamp(i64),
    Year(u16),
    String(String),
    // character column whose bytes are not valid utf8
    Binary(Vec<u8>),
    Blob(Vec<u8>),
    Json(Vec<u8>),
    Geometry(Vec<u8>),
    Bit(BitSet),
    Enum(String),
    Set(String),
    // raw values for ENUM/SET columns whose table map carries no string table
    EnumIndex(u16),
    SetBits(u64),
}

pub fn hex_string(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        hex.push(HEX_CODES[(byte >> 4) as usize]);
        hex.push(HEX_CODES[(byte & 0xF) as usize]);
    }
    hex
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ColumnValue::String(v)
            | ColumnValue::Decimal(v)
            | ColumnValue::Date(v)
            | ColumnValue::Time(v)
            | ColumnValue::DateTime(v)
            | ColumnValue::Enum(v)
            | ColumnValue::Set(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            ColumnValue::Tiny(v) => Some(v as i64),
            ColumnValue::UnsignedTiny(v) => Some(v as i64),
            ColumnValue::Short(v) => Some(v as i64),
            ColumnValue::UnsignedShort(v) => Some(v as i64),
            ColumnValue::Long(v) => Some(v as i64),
            ColumnValue::UnsignedLong(v) => Some(v as i64),
            ColumnValue::LongLong(v) => Some(v),
            ColumnValue::UnsignedLongLong(v) => i64::try_from(v).ok(),
            ColumnValue::Year(v) => Some(v as i64),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ColumnValue::None => Value::Null,
            ColumnValue::Tiny(v) => Value::from(*v),
            ColumnValue::UnsignedTiny(v) => Value::from(*v),
            ColumnValue::Short(v) => Value::from(*v),
            ColumnValue::UnsignedShort(v) => Value::from(*v),
            ColumnValue::Long(v) => Value::from(*v),
            ColumnValue::UnsignedLong(v) => Value::from(*v),
            ColumnValue::LongLong(v) => Value::from(*v),
            ColumnValue::UnsignedLongLong(v) => Value::from(*v),
            // NaN and infinities have no json number form
            ColumnValue::Float(v) => Value::from(*v as f64),
            ColumnValue::Double(v) => Value::from(*v),
            ColumnValue::Decimal(v)
            | ColumnValue::Date(v)
            | ColumnValue::Time(v)
            | ColumnValue::DateTime(v)
            | ColumnValue::String(v)
            | ColumnValue::Enum(v)
            | ColumnValue::Set(v) => Value::String(v.clone()),
            ColumnValue::Timestamp(micros) => match DateTime::from_timestamp_micros(*micros) {
                Some(dt) if micros % 1_000_000 == 0 => {
                    Value::String(dt.format("%Y-%m-%d %H:%M:%S").to_string())
                }
                Some(dt) => Value::String(dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string()),
                None => Value::Null,
            },
            ColumnValue::Year(v) => Value::from(*v),
            ColumnValue::Binary(bytes) => Value::String(hex_string(bytes)),
            ColumnValue::Blob(bytes) | ColumnValue::Json(bytes) | ColumnValue::Geometry(bytes) => {
                Value::String(STANDARD.encode(bytes))
            }
            ColumnValue::Bit(bits) => {
                let rendered: String = bits
                    .iter()
                    .collect::<Vec<bool>>()
                    .into_iter()
                    .rev()
                    .map(|b| if b { '1' } else { '0' })
                    .collect();
                Value::String(format!("b'{}'", rendered))
            }
            ColumnValue::EnumIndex(v) => Value::from(*v),
            ColumnValue::SetBits(v) => Value::from(*v),
        }
    }
}
