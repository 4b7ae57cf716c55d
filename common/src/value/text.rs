//! Text as UTF-8 bytes. No length framing of its own; the enclosing unit's
//! boundary is the only delimiter, so empty text and an absent value share the
//! same bare-marker encoding.

use bytes::{BufMut, BytesMut};
use snafu::ResultExt;

use crate::engine::{Engine, Error, InvalidUtf8Snafu};

use super::{Decodable, Encodable};

impl Encodable for String {
    fn encode(&self, _: &Engine, buf: &mut BytesMut, _: usize) -> Result<(), Error> {
        buf.put_slice(self.as_bytes());
        Ok(())
    }
}

impl Decodable for String {
    fn decode(_: &Engine, bytes: &[u8], _: usize) -> Result<Self, Error> {
        let text = std::str::from_utf8(bytes).context(InvalidUtf8Snafu)?;
        Ok(text.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::{Engine, Error, MARKER};

    fn round_trip(text: &str) {
        let engine = Engine::new();
        let bytes = engine.serialize(&text.to_owned()).unwrap();
        assert_eq!(engine.deserialize::<String>(&bytes).unwrap(), text);
    }

    #[test]
    fn ascii() {
        round_trip("si vic pacem para bellum");
    }

    #[test]
    fn empty() {
        round_trip("");
    }

    #[test]
    fn multi_byte() {
        round_trip("góndola 換字式暗号 🦀");
    }

    #[test]
    fn payload_is_the_raw_utf8() {
        let engine = Engine::new();
        let bytes = engine.serialize(&"abcde".to_owned()).unwrap();
        assert_eq!(bytes[0], MARKER);
        assert_eq!(&bytes[1..], b"abcde");
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let engine = Engine::new();
        assert!(matches!(
            engine.deserialize::<String>(&[MARKER, 0xC3, 0x28]),
            Err(Error::InvalidUtf8 { .. })
        ));
    }
}
