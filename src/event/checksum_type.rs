use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumType {
    #[default]
    None,
    Crc32,
}

impl ChecksumType {
    /// Maps the value of the `binlog_checksum` server variable.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("CRC32") {
            ChecksumType::Crc32
        } else {
            ChecksumType::None
        }
    }

    /// Maps the checksum algorithm byte of a format description event.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => ChecksumType::Crc32,
            _ => ChecksumType::None,
        }
    }

    pub fn trailer_len(self) -> usize {
        match self {
            ChecksumType::None => 0,
            ChecksumType::Crc32 => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(ChecksumType::from_name("CRC32"), ChecksumType::Crc32);
        assert_eq!(ChecksumType::from_name("crc32\n"), ChecksumType::Crc32);
        assert_eq!(ChecksumType::from_name("NONE"), ChecksumType::None);
        assert_eq!(ChecksumType::Crc32.trailer_len(), 4);
        assert_eq!(ChecksumType::None.trailer_len(), 0);
    }
}
