//! Script byte strings
//!
//! Only building and carrying scripts lives here. Evaluation belongs to the
//! interpreter behind [`super::ScriptInterpreter`].

use std::fmt;

pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_1: u8 = 0x51;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKMULTISIG: u8 = 0xae;

/// A serialized script
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Script(Vec<u8>);

impl Script {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Push an integer, using the small-integer opcodes where one exists.
    pub fn push_int(mut self, n: i64) -> Self {
        match n {
            0 => self.0.push(OP_0),
            -1 => self.0.push(OP_1NEGATE),
            1..=16 => self.0.push(OP_1 + (n as u8 - 1)),
            _ => return self.push_num(n),
        }
        self
    }

    /// Push an integer as a minimally encoded number, always as data.
    pub fn push_num(self, n: i64) -> Self {
        let encoded = encode_num(n);
        self.push_slice(&encoded)
    }

    /// Push a data element with the shortest push opcode that fits.
    pub fn push_slice(mut self, data: &[u8]) -> Self {
        let len = data.len();
        if len < usize::from(OP_PUSHDATA1) {
            self.0.push(len as u8);
        } else if len <= 0xff {
            self.0.push(OP_PUSHDATA1);
            self.0.push(len as u8);
        } else if len <= 0xffff {
            self.0.push(OP_PUSHDATA2);
            self.0.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.0.push(OP_PUSHDATA4);
            self.0.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.0.extend_from_slice(data);
        self
    }

    pub fn push_opcode(mut self, opcode: u8) -> Self {
        self.0.push(opcode);
        self
    }
}

/// Little-endian sign-magnitude, no redundant bytes
fn encode_num(n: i64) -> Vec<u8> {
    if n == 0 {
        return Vec::new();
    }

    let negative = n < 0;
    let mut abs = n.unsigned_abs();
    let mut out = Vec::with_capacity(9);
    while abs > 0 {
        out.push((abs & 0xff) as u8);
        abs >>= 8;
    }

    // the top bit is the sign; add a byte if the magnitude already uses it
    if let Some(last) = out.last_mut() {
        if *last & 0x80 != 0 {
            out.push(if negative { 0x80 } else { 0x00 });
        } else if negative {
            *last |= 0x80;
        }
    }
    out
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_integers_use_opcodes() {
        assert_eq!(Script::new().push_int(0).as_bytes(), &[OP_0]);
        assert_eq!(Script::new().push_int(-1).as_bytes(), &[OP_1NEGATE]);
        assert_eq!(Script::new().push_int(1).as_bytes(), &[0x51]);
        assert_eq!(Script::new().push_int(16).as_bytes(), &[0x60]);
        assert_eq!(Script::new().push_int(17).as_bytes(), &[0x01, 0x11]);
    }

    #[test]
    fn test_push_num_is_always_data() {
        assert_eq!(Script::new().push_num(4).as_bytes(), &[0x01, 0x04]);
        assert_eq!(Script::new().push_num(0).as_bytes(), &[0x00]);
    }

    #[test]
    fn test_number_encoding() {
        assert_eq!(encode_num(0x1d00ffff), vec![0xff, 0xff, 0x00, 0x1d]);
        assert_eq!(encode_num(128), vec![0x80, 0x00]);
        assert_eq!(encode_num(-1), vec![0x81]);
        assert_eq!(encode_num(-128), vec![0x80, 0x80]);
        assert_eq!(encode_num(255), vec![0xff, 0x00]);
    }

    #[test]
    fn test_push_lengths() {
        assert_eq!(Script::new().push_slice(&[0u8; 75]).as_bytes()[0], 75);

        let s = Script::new().push_slice(&[0u8; 76]);
        assert_eq!(&s.as_bytes()[..2], &[OP_PUSHDATA1, 76]);

        let s = Script::new().push_slice(&[0u8; 256]);
        assert_eq!(&s.as_bytes()[..3], &[OP_PUSHDATA2, 0x00, 0x01]);
        assert_eq!(s.len(), 259);

        let s = Script::new().push_slice(&[0u8; 0x1_0000]);
        assert_eq!(&s.as_bytes()[..5], &[OP_PUSHDATA4, 0x00, 0x00, 0x01, 0x00]);
    }
}
