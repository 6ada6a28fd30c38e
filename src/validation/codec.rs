//! Consensus wire encoding
//!
//! Little-endian fixed-width integers and compact-size length prefixes,
//! as committed to by transaction and block hashes.

use thiserror::Error;

use crate::crypto::Hash;

/// Largest length a compact size may announce
pub const MAX_SIZE: u64 = 0x0200_0000;

/// Wire decoding errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of data")]
    UnexpectedEnd,
    #[error("non-canonical compact size")]
    NonCanonicalCompactSize,
    #[error("compact size {0} exceeds the maximum")]
    OversizedCompactSize(u64),
    #[error("superfluous witness record")]
    SuperfluousWitness,
    #[error("unknown transaction optional data")]
    UnknownOptionalData,
    #[error("{0} trailing bytes after transaction")]
    TrailingBytes(usize),
}

/// Cursor over a borrowed byte slice
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(DecodeError::UnexpectedEnd);
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let bytes = self.read_bytes(N)?;
        <[u8; N]>::try_from(bytes).map_err(|_| DecodeError::UnexpectedEnd)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    /// 32 bytes in internal order
    pub fn read_hash(&mut self) -> Result<Hash, DecodeError> {
        Ok(Hash::from_bytes(self.read_array()?))
    }

    /// Read a compact size, rejecting non-minimal encodings and lengths
    /// above [`MAX_SIZE`].
    pub fn read_compact_size(&mut self) -> Result<u64, DecodeError> {
        let value = match self.read_u8()? {
            0xfd => {
                let n = u64::from(self.read_u16()?);
                if n < 0xfd {
                    return Err(DecodeError::NonCanonicalCompactSize);
                }
                n
            }
            0xfe => {
                let n = u64::from(self.read_u32()?);
                if n < 0x1_0000 {
                    return Err(DecodeError::NonCanonicalCompactSize);
                }
                n
            }
            0xff => {
                let n = self.read_u64()?;
                if n < 0x1_0000_0000 {
                    return Err(DecodeError::NonCanonicalCompactSize);
                }
                n
            }
            n => u64::from(n),
        };

        if value > MAX_SIZE {
            return Err(DecodeError::OversizedCompactSize(value));
        }
        Ok(value)
    }

    /// Compact-size prefixed byte string
    pub fn read_var_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_compact_size()? as usize;
        Ok(self.read_bytes(len)?.to_vec())
    }
}

pub fn write_compact_size(out: &mut Vec<u8>, n: u64) {
    if n < 0xfd {
        out.push(n as u8);
    } else if n <= 0xffff {
        out.push(0xfd);
        out.extend_from_slice(&(n as u16).to_le_bytes());
    } else if n <= 0xffff_ffff {
        out.push(0xfe);
        out.extend_from_slice(&(n as u32).to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&n.to_le_bytes());
    }
}

pub fn write_var_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_compact_size(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(n: u64) -> Vec<u8> {
        let mut out = Vec::new();
        write_compact_size(&mut out, n);
        out
    }

    #[test]
    fn test_compact_size_boundaries() {
        assert_eq!(encoded(0xfc), vec![0xfc]);
        assert_eq!(encoded(0xfd), vec![0xfd, 0xfd, 0x00]);
        assert_eq!(encoded(0x1_0000), vec![0xfe, 0x00, 0x00, 0x01, 0x00]);

        for n in [0u64, 0xfc, 0xfd, 0xffff, 0x1_0000, MAX_SIZE] {
            let bytes = encoded(n);
            let mut reader = Reader::new(&bytes);
            assert_eq!(reader.read_compact_size(), Ok(n));
            assert_eq!(reader.remaining(), 0);
        }
    }

    #[test]
    fn test_non_canonical_compact_size_rejected() {
        let mut reader = Reader::new(&[0xfd, 0x10, 0x00]);
        assert_eq!(reader.read_compact_size(), Err(DecodeError::NonCanonicalCompactSize));

        let mut reader = Reader::new(&[0xfe, 0xff, 0xff, 0x00, 0x00]);
        assert_eq!(reader.read_compact_size(), Err(DecodeError::NonCanonicalCompactSize));
    }

    #[test]
    fn test_oversized_compact_size_rejected() {
        let bytes = encoded(MAX_SIZE + 1);
        let mut reader = Reader::new(&bytes);
        assert_eq!(
            reader.read_compact_size(),
            Err(DecodeError::OversizedCompactSize(MAX_SIZE + 1))
        );
    }

    #[test]
    fn test_short_reads() {
        let mut reader = Reader::new(&[1, 2, 3]);
        assert_eq!(reader.read_u32(), Err(DecodeError::UnexpectedEnd));

        // a length prefix promising more than is there
        let mut reader = Reader::new(&[5, 1, 2]);
        assert_eq!(reader.read_var_bytes(), Err(DecodeError::UnexpectedEnd));
    }

    #[test]
    fn test_little_endian_integers() {
        let mut reader = Reader::new(&[0x01, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(reader.read_u32(), Ok(1));
        assert_eq!(reader.read_i32(), Ok(-1));
        assert_eq!(reader.position(), 8);
    }
}
