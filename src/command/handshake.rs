use std::io::{Cursor, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::{
    binlog_error::BinlogError,
    constants::{MAX_PACKET_LENGTH, UTF8_MB4_GENERAL_CI},
    ext::cursor_ext::CursorExt,
};

pub const CLIENT_LONG_PASSWORD: u32 = 0x0000_0001;
pub const CLIENT_LONG_FLAG: u32 = 0x0000_0004;
pub const CLIENT_CONNECT_WITH_DB: u32 = 0x0000_0008;
pub const CLIENT_PROTOCOL_41: u32 = 0x0000_0200;
pub const CLIENT_TRANSACTIONS: u32 = 0x0000_2000;
pub const CLIENT_SECURE_CONNECTION: u32 = 0x0000_8000;
pub const CLIENT_MULTI_RESULTS: u32 = 0x0002_0000;
pub const CLIENT_PLUGIN_AUTH: u32 = 0x0008_0000;

const PROTOCOL_VERSION: u8 = 10;

/// Initial greeting sent by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    pub protocol_version: u8,
    pub server_version: String,
    pub connection_id: u32,
    pub scramble: Vec<u8>,
    pub capability_flags: u32,
    pub character_set: u8,
    pub status_flags: u16,
    pub auth_plugin_name: String,
}

impl Greeting {
    pub fn parse(payload: &[u8]) -> Result<Self, BinlogError> {
        let mut cursor = Cursor::new(payload);
        let protocol_version = cursor.read_byte()?;
        if protocol_version != PROTOCOL_VERSION {
            return Err(BinlogError::ConnectError(format!(
                "unsupported protocol version {}",
                protocol_version
            )));
        }
        let server_version = cursor.read_null_terminated_string()?;
        let connection_id = cursor.read_uint_le(4)? as u32;
        let mut scramble = cursor.read_bytes(8)?;
        // filler
        cursor.skip(1)?;
        let mut capability_flags = cursor.read_uint_le(2)? as u32;

        let mut character_set = 0;
        let mut status_flags = 0;
        let mut auth_plugin_name = String::new();
        if cursor.remaining() > 0 {
            character_set = cursor.read_byte()?;
            status_flags = cursor.read_uint_le(2)? as u16;
            capability_flags |= (cursor.read_uint_le(2)? as u32) << 16;
            let auth_data_len = cursor.read_byte()? as usize;
            // reserved
            cursor.skip(10)?;

            if capability_flags & CLIENT_SECURE_CONNECTION != 0 {
                let len = auth_data_len.saturating_sub(8).max(13);
                let part2 = cursor.read_slice(len.min(cursor.remaining()))?;
                let part2 = match part2.iter().position(|b| *b == 0) {
                    Some(end) => &part2[..end],
                    None => part2,
                };
                scramble.extend_from_slice(part2);
            }

            if capability_flags & CLIENT_PLUGIN_AUTH != 0 {
                let rest = cursor.read_rest();
                let end = rest.iter().position(|b| *b == 0).unwrap_or(rest.len());
                auth_plugin_name = String::from_utf8_lossy(&rest[..end]).to_string();
            }
        }

        Ok(Self {
            protocol_version,
            server_version,
            connection_id,
            scramble,
            capability_flags,
            character_set,
            status_flags,
            auth_plugin_name,
        })
    }
}

/// Client reply to the greeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeResponse {
    pub user: String,
    pub auth_response: Vec<u8>,
    pub database: Option<String>,
    pub auth_plugin_name: String,
}

impl HandshakeResponse {
    pub fn capability_flags(&self) -> u32 {
        let mut flags = CLIENT_LONG_PASSWORD
            | CLIENT_LONG_FLAG
            | CLIENT_PROTOCOL_41
            | CLIENT_TRANSACTIONS
            | CLIENT_SECURE_CONNECTION
            | CLIENT_MULTI_RESULTS
            | CLIENT_PLUGIN_AUTH;
        if self.database.is_some() {
            flags |= CLIENT_CONNECT_WITH_DB;
        }
        flags
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, BinlogError> {
        let mut buf = Vec::new();
        buf.write_u32::<LittleEndian>(self.capability_flags())?;
        buf.write_u32::<LittleEndian>(MAX_PACKET_LENGTH as u32)?;
        buf.write_u8(UTF8_MB4_GENERAL_CI)?;
        buf.write_all(&[0; 23])?;
        buf.write_all(self.user.as_bytes())?;
        buf.write_u8(0)?;
        buf.write_u8(self.auth_response.len() as u8)?;
        buf.write_all(&self.auth_response)?;
        if let Some(database) = &self.database {
            buf.write_all(database.as_bytes())?;
            buf.write_u8(0)?;
        }
        buf.write_all(self.auth_plugin_name.as_bytes())?;
        buf.write_u8(0)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn greeting_bytes(plugin: &str) -> Vec<u8> {
        let mut data = vec![10];
        data.extend_from_slice(b"8.0.36\0");
        data.extend_from_slice(&42u32.to_le_bytes());
        data.extend_from_slice(b"abcdefgh");
        data.push(0);
        let flags = CLIENT_PROTOCOL_41 | CLIENT_SECURE_CONNECTION | CLIENT_PLUGIN_AUTH;
        data.extend_from_slice(&(flags as u16).to_le_bytes());
        data.push(UTF8_MB4_GENERAL_CI);
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&((flags >> 16) as u16).to_le_bytes());
        data.push(21);
        data.extend_from_slice(&[0; 10]);
        data.extend_from_slice(b"ijklmnopqrst\0");
        data.extend_from_slice(plugin.as_bytes());
        data.push(0);
        data
    }

    #[test]
    fn test_parse_greeting() {
        let greeting = Greeting::parse(&greeting_bytes("caching_sha2_password")).unwrap();
        assert_eq!(greeting.server_version, "8.0.36");
        assert_eq!(greeting.connection_id, 42);
        assert_eq!(greeting.scramble, b"abcdefghijklmnopqrst");
        assert_eq!(greeting.auth_plugin_name, "caching_sha2_password");
        assert_ne!(greeting.capability_flags & CLIENT_PLUGIN_AUTH, 0);
    }

    #[test]
    fn test_rejects_old_protocol() {
        let mut data = greeting_bytes("mysql_native_password");
        data[0] = 9;
        assert!(matches!(
            Greeting::parse(&data),
            Err(BinlogError::ConnectError(_))
        ));
    }

    #[test]
    fn test_response_bytes() {
        let response = HandshakeResponse {
            user: "root".into(),
            auth_response: vec![1, 2, 3],
            database: None,
            auth_plugin_name: "mysql_native_password".into(),
        };
        let bytes = response.to_bytes().unwrap();
        assert_eq!(bytes[8], UTF8_MB4_GENERAL_CI);
        assert_eq!(&bytes[32..37], b"root\0");
        assert_eq!(&bytes[37..41], &[3, 1, 2, 3]);
        assert_eq!(&bytes[41..], b"mysql_native_password\0");
    }
}
