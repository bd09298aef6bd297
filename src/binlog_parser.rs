use std::io::Cursor;

use tracing::debug;

use crate::{
    binlog_error::BinlogError,
    column::codec::CodecTable,
    constants::{EOF_PACKET_STATUS, ERROR_PACKET_STATUS, PACKET_HEADER_SIZE},
    event::{
        binlog_event::BinlogEvent, checksum_type::ChecksumType, error_event::ErrorEvent,
        event_data::EventData, event_header::EventHeader, registry::EventDecoderRegistry,
    },
    ext::cursor_ext::CursorExt,
    replication_state::ReplicationState,
};

// an EOF packet is at most 1 status byte + warnings + status flags
const EOF_PACKET_MAX_LENGTH: usize = 9;

/// Per-connection decoder: owns the table map cache, the checksum mode and
/// the codec and event decoder tables.
pub struct BinlogParser {
    state: ReplicationState,
    checksum_type: ChecksumType,
    codecs: CodecTable,
    registry: EventDecoderRegistry,
}

impl BinlogParser {
    pub fn new(checksum_type: ChecksumType) -> Self {
        Self {
            state: ReplicationState::new(),
            checksum_type,
            codecs: CodecTable::default(),
            registry: EventDecoderRegistry::default(),
        }
    }

    pub fn with_codecs(mut self, codecs: CodecTable) -> Self {
        self.codecs = codecs;
        self
    }

    pub fn with_registry(mut self, registry: EventDecoderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn checksum_type(&self) -> ChecksumType {
        self.checksum_type
    }

    pub fn state(&self) -> &ReplicationState {
        &self.state
    }

    /// Decodes a frame that still carries its 4-byte packet header.
    pub fn parse_frame(&mut self, frame: &[u8]) -> Result<Option<BinlogEvent>, BinlogError> {
        let mut cursor = Cursor::new(frame);
        cursor.skip(PACKET_HEADER_SIZE)?;
        self.parse_packet(cursor.read_rest())
    }

    /// Decodes a packet payload starting at the status byte.
    ///
    /// Returns `Ok(None)` when the server signals the end of the stream.
    pub fn parse_packet(&mut self, payload: &[u8]) -> Result<Option<BinlogEvent>, BinlogError> {
        let mut cursor = Cursor::new(payload);
        let status = cursor.read_byte()?;

        match status {
            ERROR_PACKET_STATUS => {
                let event = ErrorEvent::parse(&mut cursor)?;
                debug!("server error {}: {}", event.code, event.message);
                Ok(Some(BinlogEvent {
                    header: EventHeader::default(),
                    data: EventData::Error(event),
                }))
            }
            EOF_PACKET_STATUS if payload.len() < EOF_PACKET_MAX_LENGTH => {
                debug!("end of binlog stream");
                Ok(None)
            }
            _ => self.decode_event(cursor.read_rest()).map(Some),
        }
    }

    /// Decodes one event starting at its header.
    pub fn decode_event(&mut self, data: &[u8]) -> Result<BinlogEvent, BinlogError> {
        self.registry
            .decode_event(data, self.checksum_type, &mut self.state, &self.codecs)
    }
}

impl Default for BinlogParser {
    fn default() -> Self {
        Self::new(ChecksumType::None)
    }
}
