use std::any::{Any, TypeId};

use bytes::BytesMut;

use crate::engine::{ClosedCodecSnafu, Error};

pub mod timestamp;

/// An override encode/decode pair bound to one exact type.
///
/// A registered codec replaces the generic path for its type on both encode
/// and decode; the binding never extends to supertypes or other registrations.
pub trait Codec: Send + Sync + 'static {
    /// Writes the payload for `value`, everything after the marker byte.
    /// Fails if `value` is not the codec's bound type.
    fn encode(&self, value: &dyn Any, buf: &mut BytesMut) -> Result<(), Error>;

    /// Rebuilds a value of the bound type from one unit's payload.
    fn decode(&self, bytes: &[u8]) -> Result<Box<dyn Any>, Error>;

    /// Custom codecs are closed: the registry lives on the engine, and
    /// nesting another codec inside one is refused.
    fn register_custom(&mut self, _type_id: TypeId, _codec: Box<dyn Codec>) -> Result<(), Error> {
        ClosedCodecSnafu.fail()
    }
}
