//! MySQL replication client.
//!
//! Attaches to a MySQL server as a replica, requests a binlog stream from a
//! file/position and decodes it into typed events. The decoding core
//! ([`binlog_parser::BinlogParser`]) is independent of the network layer and
//! can be fed raw frames directly.

pub mod binlog_client;
pub mod binlog_error;
pub mod binlog_parser;
pub mod binlog_position;
pub mod binlog_stream;
pub mod column;
pub mod command;
pub mod constants;
pub mod event;
pub mod ext;
pub mod network;
pub mod replication_state;

pub use binlog_client::BinlogClient;
pub use binlog_error::BinlogError;
pub use binlog_parser::BinlogParser;
pub use binlog_position::{BinlogPosition, PositionTracker};
pub use binlog_stream::{BinlogStream, CloseHandle};
pub use column::column_value::ColumnValue;
pub use event::{
    binlog_event::BinlogEvent, checksum_type::ChecksumType, event_data::EventData,
    event_header::EventHeader, event_type::EventType, row_set::{CellValue, RowSet},
};
pub use replication_state::ReplicationState;
