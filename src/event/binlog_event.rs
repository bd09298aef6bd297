use serde::{Deserialize, Serialize};

use super::{event_data::EventData, event_header::EventHeader, event_type::EventType};

/// A decoded event: the common header plus its typed body.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BinlogEvent {
    pub header: EventHeader,
    pub data: EventData,
}

impl BinlogEvent {
    pub fn event_type(&self) -> EventType {
        self.header.get_event_type()
    }

    pub fn is_error(&self) -> bool {
        matches!(self.data, EventData::Error(_))
    }
}
