use std::{collections::HashMap, io::Cursor};

use tracing::{debug, trace};

use crate::{
    binlog_error::BinlogError, column::codec::CodecTable, ext::cursor_ext::CursorExt,
    replication_state::ReplicationState,
};

use super::{
    binlog_event::BinlogEvent, checksum_type::ChecksumType, delete_rows_event::DeleteRowsEvent,
    event_data::EventData, event_header::EventHeader, event_type::EventType,
    format_description_event::FormatDescriptionEvent, gtid_event::GtidEvent,
    previous_gtids_event::PreviousGtidsEvent, query_event::QueryEvent, rotate_event::RotateEvent,
    rows_query_event::RowsQueryEvent, table_map_event::TableMapEvent,
    transaction_payload_event::TransactionPayloadEvent, update_rows_event::UpdateRowsEvent,
    write_rows_event::WriteRowsEvent, xa_prepare_event::XaPrepareEvent, xid_event::XidEvent,
};

/// Everything a body decoder may read or update besides its own bytes.
pub struct DecodeContext<'a> {
    pub header: &'a EventHeader,
    pub state: &'a mut ReplicationState,
    pub codecs: &'a CodecTable,
    pub registry: &'a EventDecoderRegistry,
}

pub type EventDecoder =
    fn(&mut Cursor<&[u8]>, &mut DecodeContext<'_>) -> Result<EventData, BinlogError>;

/// Maps wire event type codes to body decoders.
///
/// Codes without a registered decoder decode to [`EventData::NotImplemented`].
#[derive(Clone)]
pub struct EventDecoderRegistry {
    decoders: HashMap<u8, EventDecoder>,
}

impl EventDecoderRegistry {
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    pub fn register(&mut self, event_type: EventType, decoder: EventDecoder) -> Option<EventDecoder> {
        self.decoders.insert(event_type.into(), decoder)
    }

    pub fn with_decoder(mut self, event_type: EventType, decoder: EventDecoder) -> Self {
        self.register(event_type, decoder);
        self
    }

    pub fn is_registered(&self, event_type_code: u8) -> bool {
        self.decoders.contains_key(&event_type_code)
    }

    pub fn get(&self, event_type_code: u8) -> EventDecoder {
        self.decoders
            .get(&event_type_code)
            .copied()
            .unwrap_or(decode_not_implemented)
    }

    /// Decodes one event starting at its 19-byte header. `data` must not
    /// include the packet prefix or the status byte.
    pub fn decode_event(
        &self,
        data: &[u8],
        checksum_type: ChecksumType,
        state: &mut ReplicationState,
        codecs: &CodecTable,
    ) -> Result<BinlogEvent, BinlogError> {
        let mut cursor = Cursor::new(data);
        let header = EventHeader::parse(&mut cursor)?;
        let event_type = header.get_event_type();

        let mut body = if self.is_registered(header.event_type) {
            cursor
                .without_tail(checksum_type.trailer_len())
                .map_err(|e| e.with_event_context(event_type, None))?
        } else {
            cursor
        };

        trace!(
            "decoding {:?} event, {} body bytes",
            event_type,
            body.remaining()
        );

        let mut ctx = DecodeContext {
            header: &header,
            state,
            codecs,
            registry: self,
        };
        let decoder = self.get(header.event_type);
        let data = decoder(&mut body, &mut ctx).map_err(|e| e.with_event_context(event_type, None))?;

        Ok(BinlogEvent { header, data })
    }
}

impl Default for EventDecoderRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for event_type in [
            EventType::Stop,
            EventType::Intvar,
            EventType::Slave,
            EventType::Rand,
            EventType::UserVar,
            EventType::PreGaWriteRows,
            EventType::PreGaUpdateRows,
            EventType::PreGaDeleteRows,
            EventType::HeartBeat,
            EventType::AnonymousGtid,
        ] {
            registry.register(event_type, decode_empty_payload);
        }

        registry
            .with_decoder(EventType::FormatDescription, decode_format_description)
            .with_decoder(EventType::Rotate, decode_rotate)
            .with_decoder(EventType::Query, decode_query)
            .with_decoder(EventType::Xid, decode_xid)
            .with_decoder(EventType::XaPrepare, decode_xa_prepare)
            .with_decoder(EventType::Gtid, decode_gtid)
            .with_decoder(EventType::PreviousGtids, decode_previous_gtids)
            .with_decoder(EventType::RowsQuery, decode_rows_query)
            .with_decoder(EventType::TableMap, decode_table_map)
            .with_decoder(EventType::WriteRows, decode_write_rows)
            .with_decoder(EventType::ExtWriteRows, decode_write_rows)
            .with_decoder(EventType::UpdateRows, decode_update_rows)
            .with_decoder(EventType::ExtUpdateRows, decode_update_rows)
            .with_decoder(EventType::DeleteRows, decode_delete_rows)
            .with_decoder(EventType::ExtDeleteRows, decode_delete_rows)
            .with_decoder(EventType::TransactionPayload, decode_transaction_payload)
    }
}

fn decode_not_implemented(
    _cursor: &mut Cursor<&[u8]>,
    ctx: &mut DecodeContext<'_>,
) -> Result<EventData, BinlogError> {
    debug!("no decoder for event type {}", ctx.header.event_type);
    Ok(EventData::NotImplemented)
}

fn decode_empty_payload(
    _cursor: &mut Cursor<&[u8]>,
    _ctx: &mut DecodeContext<'_>,
) -> Result<EventData, BinlogError> {
    Ok(EventData::EmptyPayload)
}

fn decode_format_description(
    cursor: &mut Cursor<&[u8]>,
    _ctx: &mut DecodeContext<'_>,
) -> Result<EventData, BinlogError> {
    Ok(EventData::FormatDescription(FormatDescriptionEvent::parse(cursor)?))
}

fn decode_rotate(
    cursor: &mut Cursor<&[u8]>,
    _ctx: &mut DecodeContext<'_>,
) -> Result<EventData, BinlogError> {
    Ok(EventData::Rotate(RotateEvent::parse(cursor)?))
}

fn decode_query(
    cursor: &mut Cursor<&[u8]>,
    _ctx: &mut DecodeContext<'_>,
) -> Result<EventData, BinlogError> {
    Ok(EventData::Query(QueryEvent::parse(cursor)?))
}

fn decode_xid(cursor: &mut Cursor<&[u8]>, _ctx: &mut DecodeContext<'_>) -> Result<EventData, BinlogError> {
    Ok(EventData::Xid(XidEvent::parse(cursor)?))
}

fn decode_xa_prepare(
    cursor: &mut Cursor<&[u8]>,
    _ctx: &mut DecodeContext<'_>,
) -> Result<EventData, BinlogError> {
    Ok(EventData::XaPrepare(XaPrepareEvent::parse(cursor)?))
}

fn decode_gtid(cursor: &mut Cursor<&[u8]>, _ctx: &mut DecodeContext<'_>) -> Result<EventData, BinlogError> {
    Ok(EventData::Gtid(GtidEvent::parse(cursor)?))
}

fn decode_previous_gtids(
    cursor: &mut Cursor<&[u8]>,
    _ctx: &mut DecodeContext<'_>,
) -> Result<EventData, BinlogError> {
    Ok(EventData::PreviousGtids(PreviousGtidsEvent::parse(cursor)?))
}

fn decode_rows_query(
    cursor: &mut Cursor<&[u8]>,
    _ctx: &mut DecodeContext<'_>,
) -> Result<EventData, BinlogError> {
    Ok(EventData::RowsQuery(RowsQueryEvent::parse(cursor)?))
}

fn decode_table_map(
    cursor: &mut Cursor<&[u8]>,
    ctx: &mut DecodeContext<'_>,
) -> Result<EventData, BinlogError> {
    let event = TableMapEvent::parse(cursor)?;
    ctx.state.put_table_map(event.clone());
    Ok(EventData::TableMap(event))
}

fn decode_write_rows(
    cursor: &mut Cursor<&[u8]>,
    ctx: &mut DecodeContext<'_>,
) -> Result<EventData, BinlogError> {
    let event_type = ctx.header.get_event_type();
    Ok(EventData::WriteRows(WriteRowsEvent::parse(
        cursor,
        event_type,
        &*ctx.state,
        ctx.codecs,
    )?))
}

fn decode_update_rows(
    cursor: &mut Cursor<&[u8]>,
    ctx: &mut DecodeContext<'_>,
) -> Result<EventData, BinlogError> {
    let event_type = ctx.header.get_event_type();
    Ok(EventData::UpdateRows(UpdateRowsEvent::parse(
        cursor,
        event_type,
        &*ctx.state,
        ctx.codecs,
    )?))
}

fn decode_delete_rows(
    cursor: &mut Cursor<&[u8]>,
    ctx: &mut DecodeContext<'_>,
) -> Result<EventData, BinlogError> {
    let event_type = ctx.header.get_event_type();
    Ok(EventData::DeleteRows(DeleteRowsEvent::parse(
        cursor,
        event_type,
        &*ctx.state,
        ctx.codecs,
    )?))
}

fn decode_transaction_payload(
    cursor: &mut Cursor<&[u8]>,
    ctx: &mut DecodeContext<'_>,
) -> Result<EventData, BinlogError> {
    Ok(EventData::TransactionPayload(TransactionPayloadEvent::parse(
        cursor, ctx,
    )?))
}
