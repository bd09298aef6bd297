use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::{binlog_error::BinlogError, ext::cursor_ext::CursorExt};

use super::checksum_type::ChecksumType;

const SERVER_VERSION_LENGTH: usize = 50;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct FormatDescriptionEvent {
    pub binlog_version: u16,
    pub server_version: String,
    pub create_timestamp: u32,
    pub header_length: u8,
    pub post_header_lengths: Vec<u8>,
    pub checksum_type: ChecksumType,
}

impl FormatDescriptionEvent {
    /// Parses the event body with any checksum trailer already removed.
    pub fn parse(cursor: &mut Cursor<&[u8]>) -> Result<Self, BinlogError> {
        let binlog_version = cursor.read_uint_le(2)? as u16;
        let server_version = String::from_utf8_lossy(cursor.read_slice(SERVER_VERSION_LENGTH)?)
            .trim_end_matches('\0')
            .to_string();
        let create_timestamp = cursor.read_uint_le(4)? as u32;
        let header_length = cursor.read_byte()?;

        let mut post_header_lengths = cursor.read_rest().to_vec();
        let mut checksum_type = ChecksumType::None;
        // servers since 5.6.1 append the checksum algorithm byte
        if Self::version_has_checksum(&server_version) {
            if let Some(alg) = post_header_lengths.pop() {
                checksum_type = ChecksumType::from_code(alg);
            }
        }

        Ok(Self {
            binlog_version,
            server_version,
            create_timestamp,
            header_length,
            post_header_lengths,
            checksum_type,
        })
    }

    fn version_has_checksum(server_version: &str) -> bool {
        let numbers: Vec<u32> = server_version
            .split(|c: char| !c.is_ascii_digit())
            .take(3)
            .map(|part| part.parse().unwrap_or(0))
            .collect();
        let version = (
            numbers.first().copied().unwrap_or(0),
            numbers.get(1).copied().unwrap_or(0),
            numbers.get(2).copied().unwrap_or(0),
        );

        if server_version.contains("MariaDB") {
            return version >= (5, 3, 0);
        }
        version >= (5, 6, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(server_version: &str, tail: &[u8]) -> Vec<u8> {
        let mut data = 4u16.to_le_bytes().to_vec();
        let mut version = server_version.as_bytes().to_vec();
        version.resize(SERVER_VERSION_LENGTH, 0);
        data.extend(version);
        data.extend_from_slice(&0u32.to_le_bytes());
        data.push(19);
        data.extend_from_slice(tail);
        data
    }

    #[test]
    fn test_parse_with_checksum_alg() {
        let data = body("8.0.36-log", &[56, 13, 0, 8, 1]);
        let event = FormatDescriptionEvent::parse(&mut Cursor::new(data.as_slice())).unwrap();
        assert_eq!(event.binlog_version, 4);
        assert_eq!(event.server_version, "8.0.36-log");
        assert_eq!(event.header_length, 19);
        assert_eq!(event.post_header_lengths, vec![56, 13, 0, 8]);
        assert_eq!(event.checksum_type, ChecksumType::Crc32);
    }

    #[test]
    fn test_parse_old_server() {
        let data = body("5.5.62", &[56, 13, 0, 8]);
        let event = FormatDescriptionEvent::parse(&mut Cursor::new(data.as_slice())).unwrap();
        assert_eq!(event.post_header_lengths, vec![56, 13, 0, 8]);
        assert_eq!(event.checksum_type, ChecksumType::None);
    }
}
