use std::io::Cursor;

use crate::{
    binlog_error::BinlogError,
    constants::{EOF_PACKET_STATUS, OK_PACKET_STATUS},
    ext::cursor_ext::CursorExt,
    network::packet_channel::PacketChannel,
};

use super::command_type::CommandType;

const EOF_PACKET_MAX_LENGTH: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCommand {
    pub sql: String,
}

impl QueryCommand {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf: Vec<u8> = vec![CommandType::Query.into()];
        buf.extend_from_slice(self.sql.as_bytes());
        buf
    }

    /// Runs the statement and collects its text result set. Statements
    /// without a result set return an empty one.
    pub async fn execute(&self, channel: &mut PacketChannel) -> Result<ResultSet, BinlogError> {
        channel.reset_sequence();
        channel.write_packet(&self.to_bytes()).await?;

        let first = channel.read_response().await?;
        if first.first() == Some(&OK_PACKET_STATUS) {
            return Ok(ResultSet::default());
        }
        let column_count = Cursor::new(first.as_slice()).read_packed_number()? as usize;

        let mut columns = Vec::new();
        for _ in 0..column_count {
            let payload = channel.read_response().await?;
            columns.push(parse_column_name(&payload)?);
        }

        // column definitions are terminated by an EOF packet
        let payload = channel.read_response().await?;
        if !is_eof(&payload) {
            return Err(BinlogError::InvalidData(
                "missing EOF after column definitions".into(),
            ));
        }

        let mut rows = Vec::new();
        loop {
            let payload = channel.read_response().await?;
            if is_eof(&payload) {
                break;
            }
            rows.push(parse_row(&payload, column_count)?);
        }

        Ok(ResultSet { columns, rows })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `column` in the first row.
    pub fn first_value(&self, column: &str) -> Option<&str> {
        let index = self
            .columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))?;
        self.rows.first()?.get(index)?.as_deref()
    }
}

fn is_eof(payload: &[u8]) -> bool {
    payload.first() == Some(&EOF_PACKET_STATUS) && payload.len() < EOF_PACKET_MAX_LENGTH
}

fn parse_column_name(payload: &[u8]) -> Result<String, BinlogError> {
    let mut cursor = Cursor::new(payload);
    // catalog, schema, table, org_table
    for _ in 0..4 {
        cursor.read_lenenc_string()?;
    }
    Ok(cursor.read_lenenc_string()?.unwrap_or_default())
}

fn parse_row(payload: &[u8], column_count: usize) -> Result<Vec<Option<String>>, BinlogError> {
    let mut cursor = Cursor::new(payload);
    let mut row = Vec::with_capacity(column_count);
    for _ in 0..column_count {
        let value = match cursor.read_lenenc_int()? {
            Some(len) => Some(String::from_utf8_lossy(cursor.read_slice(len as usize)?).to_string()),
            None => None,
        };
        row.push(value);
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenenc(s: &str) -> Vec<u8> {
        let mut data = vec![s.len() as u8];
        data.extend_from_slice(s.as_bytes());
        data
    }

    #[test]
    fn test_to_bytes() {
        let bytes = QueryCommand::new("SHOW MASTER STATUS").to_bytes();
        assert_eq!(bytes[0], 0x03);
        assert_eq!(&bytes[1..], b"SHOW MASTER STATUS");
    }

    #[test]
    fn test_parse_column_name() {
        let mut payload = Vec::new();
        for part in ["def", "", "", "", "File", ""] {
            payload.extend_from_slice(&lenenc(part));
        }
        payload.extend_from_slice(&[0x0C, 0x21, 0x00]);
        assert_eq!(parse_column_name(&payload).unwrap(), "File");
    }

    #[test]
    fn test_parse_row_with_null() {
        let mut payload = lenenc("mysql-bin.000003");
        payload.push(0xFB);
        payload.extend_from_slice(&lenenc("157"));
        let row = parse_row(&payload, 3).unwrap();
        assert_eq!(
            row,
            vec![Some("mysql-bin.000003".to_string()), None, Some("157".to_string())]
        );
    }

    #[test]
    fn test_first_value() {
        let result_set = ResultSet {
            columns: vec!["Variable_name".into(), "Value".into()],
            rows: vec![vec![Some("binlog_checksum".into()), Some("CRC32".into())]],
        };
        assert_eq!(result_set.first_value("value"), Some("CRC32"));
        assert_eq!(result_set.first_value("missing"), None);
    }
}
