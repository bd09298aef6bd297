pub mod authenticator;
pub mod command_type;
pub mod dump_binlog_command;
pub mod handshake;
pub mod query_command;
