#![allow(dead_code)]

pub const CHECKSUM: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];

pub const TABLE_MAP: u8 = 19;
pub const WRITE_ROWS_V2: u8 = 30;
pub const UPDATE_ROWS_V2: u8 = 31;
pub const DELETE_ROWS_V2: u8 = 32;
pub const WRITE_ROWS_V1: u8 = 23;
pub const ROTATE: u8 = 4;
pub const XID: u8 = 16;
pub const TRANSACTION_PAYLOAD: u8 = 40;

pub fn lenenc_str(s: &str) -> Vec<u8> {
    let mut data = vec![s.len() as u8];
    data.extend_from_slice(s.as_bytes());
    data
}

/// Header plus body, with an optional checksum trailer.
pub fn event(event_type: u8, next_event_position: u32, body: &[u8], with_checksum: bool) -> Vec<u8> {
    let trailer_len = if with_checksum { CHECKSUM.len() } else { 0 };
    let event_length = (19 + body.len() + trailer_len) as u32;
    let mut data = Vec::new();
    data.extend_from_slice(&1_700_000_000u32.to_le_bytes());
    data.push(event_type);
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend_from_slice(&event_length.to_le_bytes());
    data.extend_from_slice(&next_event_position.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(body);
    if with_checksum {
        data.extend_from_slice(&CHECKSUM);
    }
    data
}

/// Wraps an event into a wire frame: packet header and OK status byte.
pub fn frame(event: &[u8]) -> Vec<u8> {
    let len = (event.len() + 1) as u32;
    let mut data = len.to_le_bytes()[..3].to_vec();
    data.push(1);
    data.push(0);
    data.extend_from_slice(event);
    data
}

pub struct Column {
    pub type_code: u8,
    pub meta: Vec<u8>,
    pub name: &'static str,
}

impl Column {
    pub fn new(type_code: u8, meta: &[u8], name: &'static str) -> Self {
        Self {
            type_code,
            meta: meta.to_vec(),
            name,
        }
    }
}

pub fn metadata_field(field_type: u8, payload: &[u8]) -> Vec<u8> {
    let mut data = vec![field_type, payload.len() as u8];
    data.extend_from_slice(payload);
    data
}

pub fn string_tables(tables: &[&[&str]]) -> Vec<u8> {
    let mut data = Vec::new();
    for table in tables {
        data.push(table.len() as u8);
        for value in table.iter() {
            data.extend_from_slice(&lenenc_str(value));
        }
    }
    data
}

/// Table map body carrying column names and any extra metadata fields.
pub fn table_map_body(
    table_id: u64,
    schema: &str,
    table: &str,
    columns: &[Column],
    extra_metadata: &[u8],
) -> Vec<u8> {
    let mut data = table_id.to_le_bytes()[..6].to_vec();
    data.extend_from_slice(&[1, 0]);
    data.extend_from_slice(&lenenc_str(schema));
    data.push(0);
    data.extend_from_slice(&lenenc_str(table));
    data.push(0);
    data.push(columns.len() as u8);
    data.extend(columns.iter().map(|c| c.type_code));

    let metas: Vec<u8> = columns.iter().flat_map(|c| c.meta.clone()).collect();
    data.push(metas.len() as u8);
    data.extend_from_slice(&metas);
    // every column nullable
    data.extend(vec![0xFF; (columns.len() + 7) / 8]);

    let mut names = Vec::new();
    for column in columns {
        names.extend_from_slice(&lenenc_str(column.name));
    }
    data.extend_from_slice(&metadata_field(4, &names));
    data.extend_from_slice(extra_metadata);
    data
}

/// V2 rows body with every column included. `rows` holds encoded row images,
/// each starting with its null bitmap.
pub fn rows_body_v2(table_id: u64, column_count: usize, is_update: bool, rows: &[Vec<u8>]) -> Vec<u8> {
    let mut data = table_id.to_le_bytes()[..6].to_vec();
    data.extend_from_slice(&[1, 0]);
    // extra data length counts itself
    data.extend_from_slice(&2u16.to_le_bytes());
    data.push(column_count as u8);
    let bitmap_len = (column_count + 7) / 8;
    let mut bitmap = vec![0xFFu8; bitmap_len];
    if column_count % 8 != 0 {
        bitmap[bitmap_len - 1] = (1u8 << (column_count % 8)) - 1;
    }
    data.extend_from_slice(&bitmap);
    if is_update {
        data.extend_from_slice(&bitmap);
    }
    for row in rows {
        data.extend_from_slice(row);
    }
    data
}
