use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::{binlog_error::BinlogError, ext::cursor_ext::CursorExt};

use super::gtid_event::{format_uuid, read_sid};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct GtidInterval {
    pub start: u64,
    /// exclusive
    pub end: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PreviousGtidsEvent {
    pub gtid_set: Vec<([u8; 16], Vec<GtidInterval>)>,
}

impl PreviousGtidsEvent {
    pub fn parse(cursor: &mut Cursor<&[u8]>) -> Result<Self, BinlogError> {
        let sid_count = cursor.read_uint_le(8)?;
        let mut gtid_set = Vec::new();
        for _ in 0..sid_count {
            let sid = read_sid(cursor)?;
            let interval_count = cursor.read_uint_le(8)?;
            let mut intervals = Vec::new();
            for _ in 0..interval_count {
                intervals.push(GtidInterval {
                    start: cursor.read_uint_le(8)?,
                    end: cursor.read_uint_le(8)?,
                });
            }
            gtid_set.push((sid, intervals));
        }
        Ok(Self { gtid_set })
    }

    /// Renders the set as `uuid:1-5:7,uuid2:1-3`.
    pub fn gtid_set_string(&self) -> String {
        self.gtid_set
            .iter()
            .map(|(sid, intervals)| {
                let mut s = format_uuid(sid);
                for interval in intervals {
                    if interval.end <= interval.start.saturating_add(1) {
                        s.push_str(&format!(":{}", interval.start));
                    } else {
                        s.push_str(&format!(":{}-{}", interval.start, interval.end - 1));
                    }
                }
                s
            })
            .collect::<Vec<String>>()
            .join(",")
    }
}
