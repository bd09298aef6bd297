use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    constants::DEFAULT_BINLOG_POSITION,
    event::{binlog_event::BinlogEvent, event_data::EventData},
};

/// A resumption point: binlog file name and byte offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinlogPosition {
    pub filename: String,
    pub offset: u32,
}

impl BinlogPosition {
    pub fn new(filename: impl Into<String>, offset: u32) -> Self {
        Self {
            filename: filename.into(),
            offset,
        }
    }
}

impl Default for BinlogPosition {
    fn default() -> Self {
        Self::new("", DEFAULT_BINLOG_POSITION)
    }
}

impl fmt::Display for BinlogPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename, self.offset)
    }
}

type PositionListener = Box<dyn FnMut(&BinlogPosition) + Send>;

/// Follows the stream position and notifies listeners when it moves.
pub struct PositionTracker {
    position: BinlogPosition,
    listeners: Vec<PositionListener>,
}

impl PositionTracker {
    pub fn new(position: BinlogPosition) -> Self {
        Self {
            position,
            listeners: Vec::new(),
        }
    }

    pub fn position(&self) -> &BinlogPosition {
        &self.position
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&BinlogPosition) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Applies one emitted event. Returns whether the position changed.
    pub fn update(&mut self, event: &BinlogEvent) -> bool {
        let next = match &event.data {
            EventData::Error(_) => return false,
            EventData::Rotate(rotate) => {
                info!(
                    "rotate to {}:{}",
                    rotate.binlog_filename, rotate.binlog_position
                );
                BinlogPosition::new(
                    rotate.binlog_filename.clone(),
                    rotate.binlog_position as u32,
                )
            }
            _ => BinlogPosition::new(
                self.position.filename.clone(),
                event
                    .header
                    .next_event_position
                    .wrapping_add(event.header.event_length),
            ),
        };

        if next == self.position {
            return false;
        }
        self.position = next;
        for listener in self.listeners.iter_mut() {
            listener(&self.position);
        }
        true
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new(BinlogPosition::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::event::{
        error_event::ErrorEvent, event_header::EventHeader, rotate_event::RotateEvent,
        xid_event::XidEvent,
    };

    fn xid_event(next_event_position: u32, event_length: u32) -> BinlogEvent {
        BinlogEvent {
            header: EventHeader {
                event_type: 16,
                next_event_position,
                event_length,
                ..Default::default()
            },
            data: EventData::Xid(XidEvent { xid: 1 }),
        }
    }

    #[test]
    fn test_rotate_then_advance() {
        let mut tracker = PositionTracker::new(BinlogPosition::new("mysql-bin.000001", 4));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        tracker.subscribe(move |p| sink.lock().unwrap().push(p.to_string()));

        let rotate = BinlogEvent {
            header: EventHeader {
                event_type: 4,
                ..Default::default()
            },
            data: EventData::Rotate(RotateEvent {
                binlog_filename: "mysql-bin.000002".into(),
                binlog_position: 4,
            }),
        };
        assert!(tracker.update(&rotate));
        assert_eq!(tracker.position(), &BinlogPosition::new("mysql-bin.000002", 4));

        assert!(tracker.update(&xid_event(100, 31)));
        assert_eq!(tracker.position().filename, "mysql-bin.000002");
        assert_eq!(tracker.position().offset, 131);

        // unchanged position does not notify
        assert!(!tracker.update(&xid_event(100, 31)));
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["mysql-bin.000002:4".to_string(), "mysql-bin.000002:131".to_string()]
        );
    }

    #[test]
    fn test_error_does_not_move() {
        let mut tracker = PositionTracker::new(BinlogPosition::new("mysql-bin.000001", 4));
        let error = BinlogEvent {
            header: EventHeader::default(),
            data: EventData::Error(ErrorEvent {
                code: 1236,
                sql_state: None,
                message: "boom".into(),
            }),
        };
        assert!(!tracker.update(&error));
        assert_eq!(tracker.position().offset, 4);
    }
}
