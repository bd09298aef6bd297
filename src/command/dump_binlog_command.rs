use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::binlog_error::BinlogError;

use super::command_type::CommandType;

/// `COM_BINLOG_DUMP`: asks the server to stream events from a file position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpBinlogCommand {
    pub server_id: u64,
    pub binlog_filename: String,
    pub binlog_position: u32,
}

impl DumpBinlogCommand {
    pub fn to_bytes(&self) -> Result<Vec<u8>, BinlogError> {
        let mut buf = Vec::new();
        buf.write_u8(CommandType::BinlogDump.into())?;
        buf.write_u32::<LittleEndian>(self.binlog_position)?;
        // flags
        buf.write_u16::<LittleEndian>(0)?;
        buf.write_u32::<LittleEndian>(self.server_id as u32)?;
        buf.write_all(self.binlog_filename.as_bytes())?;
        buf.write_u8(0)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bytes() {
        let command = DumpBinlogCommand {
            server_id: 65535,
            binlog_filename: "mysql-bin.000001".into(),
            binlog_position: 4,
        };
        let bytes = command.to_bytes().unwrap();
        assert_eq!(bytes[0], 0x12);
        assert_eq!(&bytes[1..5], &[4, 0, 0, 0]);
        assert_eq!(&bytes[5..7], &[0, 0]);
        assert_eq!(&bytes[7..11], &[0xFF, 0xFF, 0, 0]);
        assert_eq!(&bytes[11..27], b"mysql-bin.000001");
        assert_eq!(bytes[27], 0);
        assert_eq!(bytes.len(), 28);
    }
}
