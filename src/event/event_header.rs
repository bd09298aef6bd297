use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::{binlog_error::BinlogError, ext::cursor_ext::CursorExt};

use super::event_type::EventType;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct EventHeader {
    pub timestamp: u32,
    pub event_type: u8,
    pub server_id: u32,
    pub event_length: u32,
    pub next_event_position: u32,
    pub event_flags: u16,
}

impl EventHeader {
    pub fn parse(cursor: &mut Cursor<&[u8]>) -> Result<Self, BinlogError> {
        Ok(Self {
            timestamp: cursor.read_uint_le(4)? as u32,
            event_type: cursor.read_byte()?,
            server_id: cursor.read_uint_le(4)? as u32,
            event_length: cursor.read_uint_le(4)? as u32,
            next_event_position: cursor.read_uint_le(4)? as u32,
            event_flags: cursor.read_uint_le(2)? as u16,
        })
    }

    pub fn get_event_type(&self) -> EventType {
        EventType::from_code(self.event_type)
    }
}
