use tracing::debug;

use crate::{
    binlog_error::BinlogError,
    binlog_parser::BinlogParser,
    binlog_position::{BinlogPosition, PositionTracker},
    event::binlog_event::BinlogEvent,
    network::packet_channel::{ChannelCloser, PacketChannel},
};

/// Pull-based event stream over one replication connection.
pub struct BinlogStream {
    channel: PacketChannel,
    parser: BinlogParser,
    tracker: PositionTracker,
}

impl BinlogStream {
    pub fn new(channel: PacketChannel, parser: BinlogParser, position: BinlogPosition) -> Self {
        Self {
            channel,
            parser,
            tracker: PositionTracker::new(position),
        }
    }

    /// Waits for the next event. `Ok(None)` means the stream ended: the
    /// server sent EOF or the connection was closed.
    pub async fn read(&mut self) -> Result<Option<BinlogEvent>, BinlogError> {
        let packet = match self.channel.read_packet().await? {
            Some(packet) => packet,
            None => {
                debug!("binlog connection closed at {}", self.tracker.position());
                return Ok(None);
            }
        };

        match self.parser.parse_packet(&packet.payload)? {
            Some(event) => {
                self.tracker.update(&event);
                Ok(Some(event))
            }
            None => Ok(None),
        }
    }

    pub fn position(&self) -> &BinlogPosition {
        self.tracker.position()
    }

    pub fn on_position_changed(
        &mut self,
        listener: impl FnMut(&BinlogPosition) + Send + 'static,
    ) {
        self.tracker.subscribe(listener);
    }

    pub fn parser(&self) -> &BinlogParser {
        &self.parser
    }

    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle {
            closer: self.channel.close_handle(),
        }
    }

    pub fn close(&self) -> Result<(), BinlogError> {
        self.close_handle().close()
    }
}

/// Cloneable handle that ends a [`BinlogStream`] from another task.
#[derive(Clone)]
pub struct CloseHandle {
    closer: ChannelCloser,
}

impl CloseHandle {
    pub fn close(&self) -> Result<(), BinlogError> {
        self.closer.close()
    }

    pub fn is_closed(&self) -> bool {
        self.closer.is_closed()
    }
}
