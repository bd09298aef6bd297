use std::io::{Cursor, Read};

use serde::{Deserialize, Serialize};

use crate::{
    binlog_error::BinlogError,
    constants::{EVENT_HEADER_LENGTH, MAX_TRANSACTION_PAYLOAD_SIZE},
    ext::cursor_ext::CursorExt,
};

use super::{binlog_event::BinlogEvent, checksum_type::ChecksumType, registry::DecodeContext};

const FIELD_END: u64 = 0;
const FIELD_COMPRESSED_SIZE: u64 = 1;
const FIELD_COMPRESSION_TYPE: u64 = 2;
const FIELD_UNCOMPRESSED_SIZE: u64 = 3;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    Zstd,
    None,
}

impl CompressionType {
    pub fn from_code(code: u64) -> Result<Self, BinlogError> {
        match code {
            0 => Ok(CompressionType::Zstd),
            255 => Ok(CompressionType::None),
            other => Err(BinlogError::InvalidData(format!(
                "unknown transaction payload compression type {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TransactionPayloadEvent {
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub compression_type: CompressionType,
    pub events: Vec<BinlogEvent>,
}

impl TransactionPayloadEvent {
    pub fn parse(cursor: &mut Cursor<&[u8]>, ctx: &mut DecodeContext<'_>) -> Result<Self, BinlogError> {
        let mut compressed_size = 0;
        let mut uncompressed_size = 0;
        let mut compression_type = CompressionType::Zstd;

        while cursor.remaining() > 0 {
            let field_type = cursor.read_packed_number()?;
            if field_type == FIELD_END {
                break;
            }
            let field_len = cursor.read_packed_number()? as usize;
            let mut field = cursor.sub_cursor(field_len)?;
            match field_type {
                FIELD_COMPRESSED_SIZE => compressed_size = field.read_packed_number()?,
                FIELD_COMPRESSION_TYPE => {
                    compression_type = CompressionType::from_code(field.read_packed_number()?)?
                }
                FIELD_UNCOMPRESSED_SIZE => uncompressed_size = field.read_packed_number()?,
                _ => {}
            }
        }

        let payload = cursor.read_rest();
        let payload = match compression_type {
            CompressionType::None => payload.to_vec(),
            CompressionType::Zstd => decompress(payload, uncompressed_size)?,
        };

        let events = Self::parse_inner_events(&payload, ctx)?;
        Ok(Self {
            compressed_size,
            uncompressed_size,
            compression_type,
            events,
        })
    }

    // inner events carry a full header and no checksum trailer
    fn parse_inner_events(
        payload: &[u8],
        ctx: &mut DecodeContext<'_>,
    ) -> Result<Vec<BinlogEvent>, BinlogError> {
        let mut cursor = Cursor::new(payload);
        let mut events = Vec::new();
        while cursor.remaining() >= EVENT_HEADER_LENGTH {
            let start = cursor.position() as usize;
            let event_length =
                u32::from_le_bytes([payload[start + 9], payload[start + 10], payload[start + 11], payload[start + 12]])
                    as usize;
            if event_length < EVENT_HEADER_LENGTH {
                return Err(BinlogError::InvalidData(format!(
                    "inner event length {} is shorter than its header",
                    event_length
                )));
            }
            let data = cursor.read_slice(event_length)?;
            let event = ctx.registry.decode_event(
                data,
                ChecksumType::None,
                &mut *ctx.state,
                ctx.codecs,
            )?;
            events.push(event);
        }
        Ok(events)
    }
}

/// Inflates a zstd payload, refusing to produce more than the declared
/// size (or the packet ceiling when the size is absent).
fn decompress(payload: &[u8], uncompressed_size: u64) -> Result<Vec<u8>, BinlogError> {
    if uncompressed_size > MAX_TRANSACTION_PAYLOAD_SIZE {
        return Err(BinlogError::DecompressError(format!(
            "declared uncompressed size {} exceeds {}",
            uncompressed_size, MAX_TRANSACTION_PAYLOAD_SIZE
        )));
    }
    let limit = if uncompressed_size > 0 {
        uncompressed_size
    } else {
        MAX_TRANSACTION_PAYLOAD_SIZE
    };

    let decoder = zstd::stream::read::Decoder::new(payload)
        .map_err(|e| BinlogError::DecompressError(e.to_string()))?;
    let mut output = Vec::new();
    decoder
        .take(limit + 1)
        .read_to_end(&mut output)
        .map_err(|e| BinlogError::DecompressError(e.to_string()))?;
    if output.len() as u64 > limit {
        return Err(BinlogError::DecompressError(format!(
            "payload inflates past {} bytes",
            limit
        )));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompress_declared_size() {
        let data = vec![7u8; 1000];
        let compressed = zstd::bulk::compress(&data, 3).unwrap();
        assert_eq!(decompress(&compressed, 1000).unwrap(), data);
        assert_eq!(decompress(&compressed, 0).unwrap(), data);
    }

    #[test]
    fn test_decompress_rejects_oversized_declaration() {
        let compressed = zstd::bulk::compress(b"abc", 3).unwrap();
        assert!(matches!(
            decompress(&compressed, u64::MAX),
            Err(BinlogError::DecompressError(_))
        ));
        assert!(matches!(
            decompress(&compressed, MAX_TRANSACTION_PAYLOAD_SIZE + 1),
            Err(BinlogError::DecompressError(_))
        ));
    }

    #[test]
    fn test_decompress_stops_at_declared_size() {
        let data = vec![1u8; 4096];
        let compressed = zstd::bulk::compress(&data, 3).unwrap();
        assert!(matches!(
            decompress(&compressed, 100),
            Err(BinlogError::DecompressError(_))
        ));
    }
}
