pub const PACKET_HEADER_SIZE: usize = 4;
pub const MAX_PACKET_LENGTH: usize = 0x00FF_FFFF;

pub const EVENT_HEADER_LENGTH: usize = 19;

pub const TABLE_ID_LENGTH: usize = 6;

// upper bound of max_allowed_packet
pub const MAX_TRANSACTION_PAYLOAD_SIZE: u64 = 1 << 30;

pub const OK_PACKET_STATUS: u8 = 0x00;
pub const EOF_PACKET_STATUS: u8 = 0xFE;
pub const ERROR_PACKET_STATUS: u8 = 0xFF;

pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_BINLOG_POSITION: u32 = 4;

// utf8mb4_general_ci
pub const UTF8_MB4_GENERAL_CI: u8 = 45;
