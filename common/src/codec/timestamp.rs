use std::any::Any;

use bytes::{BufMut, BytesMut};
use chrono::{DateTime, Utc};
use snafu::{OptionExt, ResultExt};

use crate::{
    engine::{CodecBoundSnafu, Engine, Error, InvalidUtf8Snafu, MalformedTimestampSnafu},
    printer::{Print, Printer},
    record::{self, Field, Record},
    value::{Decodable, Encodable},
};

use super::Codec;

/// Encodes a UTC timestamp as its RFC 3339 text, a locale-invariant form,
/// instead of walking fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampCodec;

impl Codec for TimestampCodec {
    #[tracing::instrument(skip_all)]
    fn encode(&self, value: &dyn Any, buf: &mut BytesMut) -> Result<(), Error> {
        let timestamp = value
            .downcast_ref::<DateTime<Utc>>()
            .context(CodecBoundSnafu {
                bound: "DateTime<Utc>",
            })?;
        buf.put_slice(timestamp.to_rfc3339().as_bytes());
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    fn decode(&self, bytes: &[u8]) -> Result<Box<dyn Any>, Error> {
        let text = std::str::from_utf8(bytes).context(InvalidUtf8Snafu)?;
        let timestamp = DateTime::parse_from_rfc3339(text)
            .context(MalformedTimestampSnafu)?
            .with_timezone(&Utc);
        Ok(Box::new(timestamp))
    }
}

// Without a registered codec a timestamp is just a composite with no public
// fields: a payload-less unit that decodes back to the epoch default.

impl Record for DateTime<Utc> {
    const FIELDS: &'static [Field<Self>] = &[];
}

impl Encodable for DateTime<Utc> {
    fn encode(&self, engine: &Engine, buf: &mut BytesMut, depth: usize) -> Result<(), Error> {
        record::encode_record(self, engine, buf, depth)
    }
}

impl Decodable for DateTime<Utc> {
    fn decode(engine: &Engine, bytes: &[u8], depth: usize) -> Result<Self, Error> {
        record::decode_record(engine, bytes, depth)
    }
}

impl Print for DateTime<Utc> {
    fn print(&self, _: &Printer, _: usize, out: &mut String) {
        out.push_str(&self.to_rfc3339());
    }
}
