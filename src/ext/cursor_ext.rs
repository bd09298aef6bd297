use std::io::Cursor;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use crate::binlog_error::BinlogError;

use super::bit_set::{BitOrder, BitSet};

const LENENC_NULL: u8 = 0xFB;
const LENENC_U16: u8 = 0xFC;
const LENENC_U24: u8 = 0xFD;
const LENENC_U64: u8 = 0xFE;

/// Bounds-checked readers over a binlog buffer. Every read fails with
/// `BinlogError::UnexpectedEof` instead of returning partial data.
pub trait CursorExt<'a> {
    fn remaining(&self) -> usize;

    fn ensure(&self, needed: usize) -> Result<(), BinlogError>;

    fn skip(&mut self, n: usize) -> Result<(), BinlogError>;

    fn read_byte(&mut self) -> Result<u8, BinlogError>;

    fn read_uint_le(&mut self, n: usize) -> Result<u64, BinlogError>;

    fn read_uint_be(&mut self, n: usize) -> Result<u64, BinlogError>;

    fn read_int_le(&mut self, n: usize) -> Result<i64, BinlogError>;

    fn read_slice(&mut self, n: usize) -> Result<&'a [u8], BinlogError>;

    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, BinlogError>;

    fn read_rest(&mut self) -> &'a [u8];

    fn read_string(&mut self, n: usize) -> Result<String, BinlogError>;

    fn read_null_terminated_string(&mut self) -> Result<String, BinlogError>;

    fn read_lenenc_int(&mut self) -> Result<Option<u64>, BinlogError>;

    fn read_packed_number(&mut self) -> Result<u64, BinlogError>;

    fn read_lenenc_string(&mut self) -> Result<Option<String>, BinlogError>;

    fn read_bits(&mut self, bit_count: usize, order: BitOrder) -> Result<BitSet, BinlogError>;

    fn sub_cursor(&mut self, n: usize) -> Result<Cursor<&'a [u8]>, BinlogError>;

    fn without_tail(&self, n: usize) -> Result<Cursor<&'a [u8]>, BinlogError>;
}

impl<'a> CursorExt<'a> for Cursor<&'a [u8]> {
    fn remaining(&self) -> usize {
        self.get_ref().len().saturating_sub(self.position() as usize)
    }

    fn ensure(&self, needed: usize) -> Result<(), BinlogError> {
        let remaining = self.remaining();
        if remaining < needed {
            return Err(BinlogError::UnexpectedEof { needed, remaining });
        }
        Ok(())
    }

    fn skip(&mut self, n: usize) -> Result<(), BinlogError> {
        self.ensure(n)?;
        self.set_position(self.position() + n as u64);
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, BinlogError> {
        self.ensure(1)?;
        Ok(self.read_u8()?)
    }

    fn read_uint_le(&mut self, n: usize) -> Result<u64, BinlogError> {
        check_width(n)?;
        if n == 0 {
            return Ok(0);
        }
        self.ensure(n)?;
        Ok(self.read_uint::<LittleEndian>(n)?)
    }

    fn read_uint_be(&mut self, n: usize) -> Result<u64, BinlogError> {
        check_width(n)?;
        if n == 0 {
            return Ok(0);
        }
        self.ensure(n)?;
        Ok(self.read_uint::<BigEndian>(n)?)
    }

    fn read_int_le(&mut self, n: usize) -> Result<i64, BinlogError> {
        check_width(n)?;
        if n == 0 {
            return Ok(0);
        }
        self.ensure(n)?;
        Ok(self.read_int::<LittleEndian>(n)?)
    }

    fn read_slice(&mut self, n: usize) -> Result<&'a [u8], BinlogError> {
        self.ensure(n)?;
        let data: &'a [u8] = *self.get_ref();
        let start = self.position() as usize;
        self.set_position((start + n) as u64);
        Ok(&data[start..start + n])
    }

    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, BinlogError> {
        Ok(self.read_slice(n)?.to_vec())
    }

    fn read_rest(&mut self) -> &'a [u8] {
        let data: &'a [u8] = *self.get_ref();
        let start = (self.position() as usize).min(data.len());
        self.set_position(data.len() as u64);
        &data[start..]
    }

    fn read_string(&mut self, n: usize) -> Result<String, BinlogError> {
        Ok(String::from_utf8(self.read_bytes(n)?)?)
    }

    fn read_null_terminated_string(&mut self) -> Result<String, BinlogError> {
        let data: &'a [u8] = *self.get_ref();
        let start = (self.position() as usize).min(data.len());
        match data[start..].iter().position(|b| *b == 0) {
            Some(len) => {
                let value = String::from_utf8(data[start..start + len].to_vec())?;
                self.set_position((start + len + 1) as u64);
                Ok(value)
            }
            None => Err(BinlogError::UnexpectedEof {
                needed: data.len() - start + 1,
                remaining: data.len() - start,
            }),
        }
    }

    fn read_lenenc_int(&mut self) -> Result<Option<u64>, BinlogError> {
        let first = self.read_byte()?;
        let value = match first {
            LENENC_NULL => return Ok(None),
            LENENC_U16 => self.read_uint_le(2)?,
            LENENC_U24 => self.read_uint_le(3)?,
            LENENC_U64 => self.read_uint_le(8)?,
            v => v as u64,
        };
        Ok(Some(value))
    }

    fn read_packed_number(&mut self) -> Result<u64, BinlogError> {
        self.read_lenenc_int()?.ok_or_else(|| {
            BinlogError::InvalidData("unexpected NULL length-encoded integer".into())
        })
    }

    fn read_lenenc_string(&mut self) -> Result<Option<String>, BinlogError> {
        match self.read_lenenc_int()? {
            Some(len) => Ok(Some(self.read_string(len as usize)?)),
            None => Ok(None),
        }
    }

    fn read_bits(&mut self, bit_count: usize, order: BitOrder) -> Result<BitSet, BinlogError> {
        let bytes = self.read_slice(BitSet::byte_len(bit_count))?;
        Ok(BitSet::from_bytes(bytes, bit_count, order))
    }

    fn sub_cursor(&mut self, n: usize) -> Result<Cursor<&'a [u8]>, BinlogError> {
        Ok(Cursor::new(self.read_slice(n)?))
    }

    fn without_tail(&self, n: usize) -> Result<Cursor<&'a [u8]>, BinlogError> {
        self.ensure(n)?;
        let data: &'a [u8] = *self.get_ref();
        let start = self.position() as usize;
        Ok(Cursor::new(&data[start..data.len() - n]))
    }
}

fn check_width(n: usize) -> Result<(), BinlogError> {
    if n > 8 {
        return Err(BinlogError::InvalidData(format!(
            "integer width {} exceeds 8 bytes",
            n
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_lenenc_int() {
        let data: Vec<u8> = vec![
            0xFA, 0xFB, 0xFC, 0x01, 0x02, 0xFD, 0x01, 0x02, 0x03, 0xFE, 1, 0, 0, 0, 0, 0, 0, 1,
        ];
        let mut cursor = Cursor::new(data.as_slice());
        assert_eq!(cursor.read_lenenc_int().unwrap(), Some(250));
        assert_eq!(cursor.read_lenenc_int().unwrap(), None);
        assert_eq!(cursor.read_lenenc_int().unwrap(), Some(0x0201));
        assert_eq!(cursor.read_lenenc_int().unwrap(), Some(0x030201));
        assert_eq!(cursor.read_lenenc_int().unwrap(), Some(0x0100_0000_0000_0001));
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_short_read_is_eof() {
        let data = [0xFC, 0x01];
        let mut cursor = Cursor::new(&data[..]);
        match cursor.read_lenenc_int() {
            Err(BinlogError::UnexpectedEof { needed, remaining }) => {
                assert_eq!(needed, 2);
                assert_eq!(remaining, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_fixed_width_integers() {
        let data = [0x01, 0x02, 0x03, 0xFF, 0xFF, 0xFF];
        let mut cursor = Cursor::new(&data[..]);
        assert_eq!(cursor.read_uint_le(3).unwrap(), 0x030201);
        assert_eq!(cursor.read_int_le(3).unwrap(), -1);

        let mut cursor = Cursor::new(&data[..]);
        assert_eq!(cursor.read_uint_be(2).unwrap(), 0x0102);
    }

    #[test]
    fn test_strings() {
        let data = b"abc\0\x03xyzrest";
        let mut cursor = Cursor::new(&data[..]);
        assert_eq!(cursor.read_null_terminated_string().unwrap(), "abc");
        assert_eq!(cursor.read_lenenc_string().unwrap().as_deref(), Some("xyz"));
        assert_eq!(cursor.read_rest(), b"rest");
        assert!(cursor.read_byte().is_err());
    }

    #[test]
    fn test_missing_terminator_is_eof() {
        let data = b"abc";
        let mut cursor = Cursor::new(&data[..]);
        assert!(matches!(
            cursor.read_null_terminated_string(),
            Err(BinlogError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_without_tail() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let mut cursor = Cursor::new(&data[..]);
        cursor.skip(1).unwrap();
        let mut body = cursor.without_tail(4).unwrap();
        assert_eq!(body.read_rest(), &[2]);
        assert!(cursor.without_tail(6).is_err());
    }
}
