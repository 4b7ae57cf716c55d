use std::{
    any::{Any, TypeId},
    collections::HashMap,
};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use snafu::{ensure, Location, OptionExt, Snafu};

use crate::{
    codec::Codec,
    value::{Decodable, Encodable},
};

/// Sentinel prefixed to every encoded unit and re-checked on decode. Not a
/// type tag, only an origin assertion.
pub const MARKER: u8 = 0;

/// Nesting bound for encode and decode recursion.
pub const MAX_DEPTH: usize = 128;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("empty buffer"))]
    EmptyBuffer {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("buffer does not start with the envelope marker"))]
    MissingMarker {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("need {need} bytes at offset {offset}, buffer has {len}"))]
    BufferOverrun {
        need: usize,
        offset: usize,
        len: usize,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("negative length field: {len}"))]
    NegativeLength {
        len: i32,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("negative element count: {count}"))]
    NegativeCount {
        count: i32,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("numeric payload is {got} bytes, {type_name} takes {expected}"))]
    NumericSize {
        type_name: &'static str,
        expected: usize,
        got: usize,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("payload is not valid utf-8"))]
    InvalidUtf8 {
        #[snafu(source)]
        error: std::str::Utf8Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("no field named {name}"))]
    UnknownField {
        name: String,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("value nests deeper than {} levels", MAX_DEPTH))]
    TooDeep {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("codec is bound to {bound}"))]
    CodecBound {
        bound: &'static str,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("codec produced a value that is not a {requested}"))]
    ForeignCodecValue {
        requested: &'static str,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("custom codecs accept no nested registrations"))]
    ClosedCodec {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("malformed timestamp text"))]
    MalformedTimestamp {
        #[snafu(source)]
        error: chrono::ParseError,
        #[snafu(implicit)]
        location: Location,
    },
}

/// Schema-less binary serialization engine.
///
/// Every encoded unit is the [`MARKER`] byte followed by a payload whose shape
/// depends on the value's kind; sub-values recurse into the engine so the
/// output is self-describing without an external schema.
///
/// The engine owns its custom codec registry. Registration takes `&mut self`
/// while encode and decode take `&self`, so swapping a codec mid-operation is
/// unrepresentable rather than a caller obligation.
#[derive(Default)]
pub struct Engine {
    codecs: HashMap<TypeId, Box<dyn Codec>>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `codec` for values of exactly type `T`, silently replacing
    /// any earlier registration for the same type. Registered types bypass the
    /// generic path on both encode and decode.
    pub fn register_custom<T: Any>(&mut self, codec: impl Codec) {
        self.codecs.insert(TypeId::of::<T>(), Box::new(codec));
    }

    /// Encodes `value` as one marker-prefixed unit. An absent value
    /// (`Option::None`) yields the minimal one-byte unit.
    #[tracing::instrument(skip_all)]
    pub fn serialize<T: Encodable>(&self, value: &T) -> Result<Bytes, Error> {
        self.encode_unit(value, 0)
    }

    /// Decodes one unit back into a `T`. The declared type alone selects the
    /// codec; the data never chooses.
    #[tracing::instrument(skip_all)]
    pub fn deserialize<T: Decodable>(&self, bytes: &[u8]) -> Result<T, Error> {
        self.decode_unit(bytes, 0)
    }

    /// Recursive encode entry point used by the array and composite codecs;
    /// `depth` counts nesting levels.
    pub fn encode_unit<T: Encodable>(&self, value: &T, depth: usize) -> Result<Bytes, Error> {
        ensure!(depth <= MAX_DEPTH, TooDeepSnafu);
        let mut buf = BytesMut::new();
        buf.put_u8(MARKER);
        self.encode_payload(value, &mut buf, depth)?;
        Ok(buf.freeze())
    }

    /// Recursive decode entry point; validates the marker, then hands the
    /// payload to whichever codec `T` selects.
    pub fn decode_unit<T: Decodable>(&self, bytes: &[u8], depth: usize) -> Result<T, Error> {
        ensure!(depth <= MAX_DEPTH, TooDeepSnafu);
        ensure!(!bytes.is_empty(), EmptyBufferSnafu);
        ensure!(bytes[0] == MARKER, MissingMarkerSnafu);
        self.decode_payload(&bytes[1..], depth)
    }

    pub(crate) fn encode_payload<T: Encodable>(
        &self,
        value: &T,
        buf: &mut BytesMut,
        depth: usize,
    ) -> Result<(), Error> {
        match self.codecs.get(&value.type_id()) {
            Some(codec) => codec.encode(value, buf),
            None => value.encode(self, buf, depth),
        }
    }

    pub(crate) fn decode_payload<T: Decodable>(
        &self,
        bytes: &[u8],
        depth: usize,
    ) -> Result<T, Error> {
        match self.codecs.get(&TypeId::of::<T>()) {
            Some(codec) => {
                let value = codec
                    .decode(bytes)?
                    .downcast::<T>()
                    .ok()
                    .context(ForeignCodecValueSnafu {
                        requested: std::any::type_name::<T>(),
                    })?;
                Ok(*value)
            }
            None => T::decode(self, bytes, depth),
        }
    }
}

/// Slices `len` bytes at `*pos`, advancing the cursor. Any overrun surfaces
/// here as a format error.
pub(crate) fn take<'a>(bytes: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8], Error> {
    let end = pos
        .checked_add(len)
        .filter(|end| *end <= bytes.len())
        .context(BufferOverrunSnafu {
            need: len,
            offset: *pos,
            len: bytes.len(),
        })?;
    let slice = &bytes[*pos..end];
    *pos = end;
    Ok(slice)
}

/// Reads one native-endian length field.
pub(crate) fn read_i32(bytes: &[u8], pos: &mut usize) -> Result<i32, Error> {
    let mut slice = take(bytes, pos, 4)?;
    Ok(slice.get_i32_ne())
}
