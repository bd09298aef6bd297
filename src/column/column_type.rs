use serde::{Deserialize, Serialize};

// refer: https://github.com/mysql/mysql-server/blob/trunk/include/field_types.h
/// Wire column type codes. The codes span the whole `u8` range, so
/// unmapped codes are carried by `Unknown` instead of a catch-all discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Decimal,
    Tiny,
    Short,
    Long,
    Float,
    Double,
    Null,
    Timestamp,
    LongLong,
    Int24,
    Date,
    Time,
    DateTime,
    Year,
    NewDate,
    VarChar,
    Bit,
    Timestamp2,
    DateTime2,
    Time2,
    TypedArray,
    Json,
    NewDecimal,
    Enum,
    Set,
    TinyBlob,
    MediumBlob,
    LongBlob,
    Blob,
    VarString,
    String,
    Geometry,
    Unknown(u8),
}

macro_rules! column_type_codes {
    ($($name:ident = $code:literal,)*) => {
        impl ColumnType {
            pub fn from_code(code: u8) -> ColumnType {
                match code {
                    $($code => ColumnType::$name,)*
                    other => ColumnType::Unknown(other),
                }
            }

            pub fn code(self) -> u8 {
                match self {
                    $(ColumnType::$name => $code,)*
                    ColumnType::Unknown(code) => code,
                }
            }
        }
    };
}

column_type_codes! {
    Decimal = 0,
    Tiny = 1,
    Short = 2,
    Long = 3,
    Float = 4,
    Double = 5,
    Null = 6,
    Timestamp = 7,
    LongLong = 8,
    Int24 = 9,
    Date = 10,
    Time = 11,
    DateTime = 12,
    Year = 13,
    NewDate = 14,
    VarChar = 15,
    Bit = 16,
    Timestamp2 = 17,
    DateTime2 = 18,
    Time2 = 19,
    TypedArray = 20,
    Json = 245,
    NewDecimal = 246,
    Enum = 247,
    Set = 248,
    TinyBlob = 249,
    MediumBlob = 250,
    LongBlob = 251,
    Blob = 252,
    VarString = 253,
    String = 254,
    Geometry = 255,
}

impl From<u8> for ColumnType {
    fn from(code: u8) -> Self {
        ColumnType::from_code(code)
    }
}

impl From<ColumnType> for u8 {
    fn from(column_type: ColumnType) -> Self {
        column_type.code()
    }
}

impl ColumnType {
    /// Columns covered by the table map signedness bitmap.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ColumnType::Tiny
                | ColumnType::Short
                | ColumnType::Int24
                | ColumnType::Long
                | ColumnType::LongLong
                | ColumnType::Float
                | ColumnType::Double
                | ColumnType::Decimal
                | ColumnType::NewDecimal
        )
    }

    /// Columns covered by the table map DEFAULT_CHARSET/COLUMN_CHARSET fields.
    pub fn is_character(self) -> bool {
        matches!(
            self,
            ColumnType::String
                | ColumnType::VarString
                | ColumnType::VarChar
                | ColumnType::Blob
                | ColumnType::TinyBlob
                | ColumnType::MediumBlob
                | ColumnType::LongBlob
        )
    }

    /// Width in bytes of this type's entry in the table map metadata block.
    pub fn metadata_width(self) -> usize {
        match self {
            ColumnType::Float
            | ColumnType::Double
            | ColumnType::Blob
            | ColumnType::TinyBlob
            | ColumnType::MediumBlob
            | ColumnType::LongBlob
            | ColumnType::Json
            | ColumnType::Geometry
            | ColumnType::Time2
            | ColumnType::DateTime2
            | ColumnType::Timestamp2 => 1,
            ColumnType::Bit
            | ColumnType::VarChar
            | ColumnType::VarString
            | ColumnType::NewDecimal
            | ColumnType::Set
            | ColumnType::Enum
            | ColumnType::String => 2,
            _ => 0,
        }
    }

    /// SET/ENUM/STRING store their two metadata bytes big-endian.
    pub fn metadata_is_big_endian(self) -> bool {
        matches!(self, ColumnType::Set | ColumnType::Enum | ColumnType::String)
    }

    /// Resolves the runtime type and length of a column from its declared
    /// type and table map metadata.
    pub fn resolve(self, meta: u16) -> (ColumnType, u16) {
        match self {
            ColumnType::String => Self::parse_string_column_meta(meta),
            ColumnType::Enum | ColumnType::Set => (self, meta & 0xFF),
            _ => (self, meta),
        }
    }

    /// A STRING column packs its real type into the high metadata byte.
    /// refer: mysql-server sql/log_event.cc log_event_print_value
    pub fn parse_string_column_meta(meta: u16) -> (ColumnType, u16) {
        if meta < 256 {
            return (ColumnType::String, meta);
        }

        let meta0 = meta >> 8;
        let meta1 = meta & 0xFF;
        if (meta0 & 0x30) != 0x30 {
            let real_type = ColumnType::from_code((meta0 | 0x30) as u8);
            let length = meta1 | (((meta0 & 0x30) ^ 0x30) << 4);
            return (real_type, length);
        }

        let real_type = ColumnType::from_code(meta0 as u8);
        if real_type == ColumnType::Enum || real_type == ColumnType::Set {
            (real_type, meta1)
        } else {
            (ColumnType::String, meta1)
        }
    }
}
