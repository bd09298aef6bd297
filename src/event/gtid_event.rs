use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::{binlog_error::BinlogError, ext::cursor_ext::CursorExt};

// logical clock timestamps follow when the type byte is 2
const LOGICAL_TIMESTAMP_TYPE_CODE: u8 = 2;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct GtidEvent {
    pub flags: u8,
    pub sid: [u8; 16],
    pub gno: u64,
    pub last_committed: Option<u64>,
    pub sequence_number: Option<u64>,
}

impl GtidEvent {
    pub fn parse(cursor: &mut Cursor<&[u8]>) -> Result<Self, BinlogError> {
        let flags = cursor.read_byte()?;
        let sid = read_sid(cursor)?;
        let gno = cursor.read_uint_le(8)?;

        let mut last_committed = None;
        let mut sequence_number = None;
        if cursor.remaining() > 0 && cursor.read_byte()? == LOGICAL_TIMESTAMP_TYPE_CODE {
            last_committed = Some(cursor.read_uint_le(8)?);
            sequence_number = Some(cursor.read_uint_le(8)?);
        }

        Ok(Self {
            flags,
            sid,
            gno,
            last_committed,
            sequence_number,
        })
    }

    /// Whether the transaction may be committed in parallel with others.
    pub fn is_commit(&self) -> bool {
        self.flags & 0x01 != 0
    }

    pub fn uuid(&self) -> String {
        format_uuid(&self.sid)
    }

    /// `uuid:gno`
    pub fn gtid(&self) -> String {
        format!("{}:{}", self.uuid(), self.gno)
    }
}

pub fn read_sid(cursor: &mut Cursor<&[u8]>) -> Result<[u8; 16], BinlogError> {
    let mut sid = [0u8; 16];
    sid.copy_from_slice(cursor.read_slice(16)?);
    Ok(sid)
}

pub fn format_uuid(sid: &[u8; 16]) -> String {
    let hex: String = sid.iter().map(|b| format!("{:02x}", b)).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SID: [u8; 16] = [
        0x3E, 0x11, 0xFA, 0x47, 0x71, 0xCA, 0x11, 0xE1, 0x9E, 0x33, 0xC8, 0x0A, 0xA9, 0x42, 0x95,
        0x62,
    ];

    #[test]
    fn test_parse() {
        let mut data = vec![1];
        data.extend_from_slice(&SID);
        data.extend_from_slice(&23u64.to_le_bytes());
        data.push(2);
        data.extend_from_slice(&5u64.to_le_bytes());
        data.extend_from_slice(&6u64.to_le_bytes());
        // trailing commit timestamps are ignored
        data.extend_from_slice(&[0; 7]);

        let event = GtidEvent::parse(&mut Cursor::new(data.as_slice())).unwrap();
        assert!(event.is_commit());
        assert_eq!(event.gtid(), "3e11fa47-71ca-11e1-9e33-c80aa9429562:23");
        assert_eq!(event.last_committed, Some(5));
        assert_eq!(event.sequence_number, Some(6));
    }

    #[test]
    fn test_parse_without_logical_clock() {
        let mut data = vec![0];
        data.extend_from_slice(&SID);
        data.extend_from_slice(&1u64.to_le_bytes());
        let event = GtidEvent::parse(&mut Cursor::new(data.as_slice())).unwrap();
        assert_eq!(event.last_committed, None);
    }
}
