//! Homogeneous sequences: an element count, then one length-prefixed encoded
//! unit per element. The element type always comes from the declared `Vec`
//! type, never from the data.

use bytes::{BufMut, BytesMut};
use snafu::ensure;

use crate::engine::{self, Engine, Error, NegativeCountSnafu, NegativeLengthSnafu};

use super::{Decodable, Encodable};

impl<T: Encodable> Encodable for Vec<T> {
    fn encode(&self, engine: &Engine, buf: &mut BytesMut, depth: usize) -> Result<(), Error> {
        buf.put_i32_ne(self.len() as i32);
        for element in self {
            let unit = engine.encode_unit(element, depth + 1)?;
            buf.put_i32_ne(unit.len() as i32);
            buf.put_slice(&unit);
        }
        Ok(())
    }
}

impl<T: Decodable> Decodable for Vec<T> {
    fn decode(engine: &Engine, bytes: &[u8], depth: usize) -> Result<Self, Error> {
        // an absent array unit carries no count at all
        if bytes.is_empty() {
            return Ok(Vec::new());
        }
        let mut pos = 0;
        let count = engine::read_i32(bytes, &mut pos)?;
        ensure!(count >= 0, NegativeCountSnafu { count });
        let mut elements = Vec::new();
        for _ in 0..count {
            let len = engine::read_i32(bytes, &mut pos)?;
            ensure!(len >= 0, NegativeLengthSnafu { len });
            let unit = engine::take(bytes, &mut pos, len as usize)?;
            elements.push(engine.decode_unit(unit, depth + 1)?);
        }
        Ok(elements)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::{Engine, Error, MARKER};

    #[test]
    fn numbers_round_trip() {
        let engine = Engine::new();
        let numbers = vec![1i32, 2, 3, 4, 6];
        let bytes = engine.serialize(&numbers).unwrap();
        assert_eq!(engine.deserialize::<Vec<i32>>(&bytes).unwrap(), numbers);
    }

    #[test]
    fn empty_array_round_trips() {
        let engine = Engine::new();
        let bytes = engine.serialize(&Vec::<i32>::new()).unwrap();
        // marker plus a zero count
        assert_eq!(bytes.len(), 5);
        assert!(engine.deserialize::<Vec<i32>>(&bytes).unwrap().is_empty());
    }

    #[test]
    fn strings_round_trip() {
        let engine = Engine::new();
        let words = vec!["alpha".to_owned(), String::new(), "β".to_owned()];
        let bytes = engine.serialize(&words).unwrap();
        assert_eq!(engine.deserialize::<Vec<String>>(&bytes).unwrap(), words);
    }

    #[test]
    fn truncated_element_is_rejected() {
        let engine = Engine::new();
        let bytes = engine.serialize(&vec![1i32, 2]).unwrap();
        assert!(matches!(
            engine.deserialize::<Vec<i32>>(&bytes[..bytes.len() - 2]),
            Err(Error::BufferOverrun { .. })
        ));
    }

    #[test]
    fn negative_count_is_rejected() {
        let engine = Engine::new();
        let mut bytes = vec![MARKER];
        bytes.extend_from_slice(&(-1i32).to_ne_bytes());
        assert!(matches!(
            engine.deserialize::<Vec<i32>>(&bytes),
            Err(Error::NegativeCount { .. })
        ));
    }
}
