use std::any::Any;

use bytes::BytesMut;

use crate::engine::{Engine, Error};

pub mod array;
pub mod primitive;
pub mod text;

/// Encoding half of the engine's dispatch.
///
/// Encode trusts the value's actual kind: the impl set is the closed union of
/// kinds the wire format can carry (raw numerics, text, arrays, composites and
/// the transparent wrappers below). Decoding makes the opposite bet, see
/// [`Decodable`].
pub trait Encodable: Any {
    /// Appends this value's payload, everything after the marker byte.
    fn encode(&self, engine: &Engine, buf: &mut BytesMut, depth: usize) -> Result<(), Error>;
}

/// Decoding half of the engine's dispatch.
///
/// A buffer carries no type information beyond its framing, so the
/// caller-declared type alone selects the codec and the payload boundary
/// rule.
pub trait Decodable: Any + Sized {
    /// Rebuilds a value from the payload of one unit.
    fn decode(engine: &Engine, bytes: &[u8], depth: usize) -> Result<Self, Error>;
}

// `Option` and `Box` are transparent on the wire: the unit of `Some(v)` or
// `Box<v>` is the unit of `v`, and an absent value is a bare marker. Both go
// back through the engine so custom codecs still intercept the inner type.

impl<T: Encodable> Encodable for Option<T> {
    fn encode(&self, engine: &Engine, buf: &mut BytesMut, depth: usize) -> Result<(), Error> {
        match self {
            None => Ok(()),
            Some(value) => engine.encode_payload(value, buf, depth),
        }
    }
}

impl<T: Decodable> Decodable for Option<T> {
    fn decode(engine: &Engine, bytes: &[u8], depth: usize) -> Result<Self, Error> {
        if bytes.is_empty() {
            return Ok(None);
        }
        engine.decode_payload(bytes, depth).map(Some)
    }
}

impl<T: Encodable> Encodable for Box<T> {
    fn encode(&self, engine: &Engine, buf: &mut BytesMut, depth: usize) -> Result<(), Error> {
        engine.encode_payload(&**self, buf, depth)
    }
}

impl<T: Decodable> Decodable for Box<T> {
    fn decode(engine: &Engine, bytes: &[u8], depth: usize) -> Result<Self, Error> {
        engine.decode_payload(bytes, depth).map(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::{Engine, MARKER};

    #[test]
    fn absent_value_is_a_bare_marker() {
        let engine = Engine::new();
        let bytes = engine.serialize(&None::<String>).unwrap();
        assert_eq!(bytes.as_ref(), &[MARKER]);
        assert_eq!(engine.deserialize::<Option<String>>(&bytes).unwrap(), None);
    }

    #[test]
    fn present_value_round_trips_through_option() {
        let engine = Engine::new();
        let bytes = engine.serialize(&Some(42i64)).unwrap();
        assert_eq!(engine.deserialize::<Option<i64>>(&bytes).unwrap(), Some(42));
        // the unit is indistinguishable from a bare i64
        assert_eq!(engine.deserialize::<i64>(&bytes).unwrap(), 42);
    }

    #[test]
    fn empty_text_decodes_as_absent() {
        let engine = Engine::new();
        let bytes = engine.serialize(&Some(String::new())).unwrap();
        assert_eq!(engine.deserialize::<Option<String>>(&bytes).unwrap(), None);
    }
}
