use thiserror::Error;

use crate::event::event_type::EventType;

#[derive(Error, Debug)]
pub enum BinlogError {
    #[error("unexpected eof: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("table metadata not found for table id {table_id}, the stream must start before the table's table map event")]
    MissingTableMetadata { table_id: u64 },

    #[error("failed to decode {event_type:?} event (table id: {table_id:?}): {source}")]
    EventDecode {
        event_type: EventType,
        table_id: Option<u64>,
        #[source]
        source: Box<BinlogError>,
    },

    #[error("unsupported column type: {0}")]
    UnsupportedColumnType(u8),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("server error {code} ({sql_state}): {message}")]
    ServerError {
        code: u16,
        sql_state: String,
        message: String,
    },

    #[error("connect error: {0}")]
    ConnectError(String),

    #[error("decompress error: {0}")]
    DecompressError(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("url error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("utf8 error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
}

impl BinlogError {
    pub fn is_missing_table_metadata(&self) -> bool {
        match self {
            Self::MissingTableMetadata { .. } => true,
            Self::EventDecode { source, .. } => source.is_missing_table_metadata(),
            _ => false,
        }
    }

    /// Attaches event context, leaving `MissingTableMetadata` untouched so
    /// callers can still match on it directly.
    pub fn with_event_context(self, event_type: EventType, table_id: Option<u64>) -> Self {
        match self {
            Self::MissingTableMetadata { .. } | Self::EventDecode { .. } => self,
            other => Self::EventDecode {
                event_type,
                table_id,
                source: Box::new(other),
            },
        }
    }
}
