//! Composite values. Instead of runtime introspection, every composite type
//! carries a compile-time field table; the wire walks that table in
//! declaration order on both passes.

use bytes::{BufMut, Bytes, BytesMut};
use snafu::{ensure, OptionExt, ResultExt};

use crate::engine::{
    self, Engine, Error, InvalidUtf8Snafu, NegativeLengthSnafu, UnknownFieldSnafu,
};

/// One entry of a composite type's field table: the wire name plus encode and
/// decode hooks that recurse through the engine.
pub struct Field<T> {
    pub name: &'static str,
    pub encode: fn(&T, &Engine, usize) -> Result<Bytes, Error>,
    pub decode: fn(&mut T, &Engine, &[u8], usize) -> Result<(), Error>,
}

/// A composite type with a compile-time field table, normally declared
/// through [`record!`](crate::record!). Table order is field declaration
/// order and is the wire order for both passes.
pub trait Record: Default + Sized + 'static {
    const FIELDS: &'static [Field<Self>];
}

/// Emits one field frame per table entry: name length, UTF-8 name, data
/// length, data. A field whose unit collapses to the bare marker is written
/// in the absent form, a zero data length with no data.
pub fn encode_record<T: Record>(
    value: &T,
    engine: &Engine,
    buf: &mut BytesMut,
    depth: usize,
) -> Result<(), Error> {
    for field in T::FIELDS {
        let unit = (field.encode)(value, engine, depth + 1)?;
        buf.put_i32_ne(field.name.len() as i32);
        buf.put_slice(field.name.as_bytes());
        if unit.len() <= 1 {
            buf.put_i32_ne(0);
        } else {
            buf.put_i32_ne(unit.len() as i32);
            buf.put_slice(&unit);
        }
    }
    Ok(())
}

/// Scans field frames into a default-constructed `T` until the cursor reaches
/// the end. An absent frame leaves its field at the default with no name
/// lookup; a present frame must name a table entry.
pub fn decode_record<T: Record>(engine: &Engine, bytes: &[u8], depth: usize) -> Result<T, Error> {
    let mut value = T::default();
    let mut pos = 0;
    while pos < bytes.len() {
        let name_len = engine::read_i32(bytes, &mut pos)?;
        ensure!(name_len >= 0, NegativeLengthSnafu { len: name_len });
        let name = std::str::from_utf8(engine::take(bytes, &mut pos, name_len as usize)?)
            .context(InvalidUtf8Snafu)?;
        let data_len = engine::read_i32(bytes, &mut pos)?;
        if data_len <= 0 {
            continue;
        }
        let data = engine::take(bytes, &mut pos, data_len as usize)?;
        let field = T::FIELDS
            .iter()
            .find(|field| field.name == name)
            .context(UnknownFieldSnafu { name })?;
        (field.decode)(&mut value, engine, data, depth + 1)?;
    }
    Ok(value)
}

/// Declares a composite type and builds its field table.
///
/// Generates the struct plus its [`Record`], [`Encodable`](crate::value::Encodable),
/// [`Decodable`](crate::value::Decodable) and [`Print`](crate::printer::Print)
/// impls. Fields encode and decode in declaration order; the type must
/// derive (or implement) `Default`.
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident: $ty:ty
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )+
        }

        impl $crate::record::Record for $name {
            const FIELDS: &'static [$crate::record::Field<Self>] = &[
                $(
                    $crate::record::Field {
                        name: stringify!($field),
                        encode: |record, engine, depth| engine.encode_unit(&record.$field, depth),
                        decode: |record, engine, bytes, depth| {
                            record.$field = engine.decode_unit(bytes, depth)?;
                            Ok(())
                        },
                    },
                )+
            ];
        }

        impl $crate::value::Encodable for $name {
            fn encode(
                &self,
                engine: &$crate::engine::Engine,
                buf: &mut $crate::bytes::BytesMut,
                depth: usize,
            ) -> Result<(), $crate::engine::Error> {
                $crate::record::encode_record(self, engine, buf, depth)
            }
        }

        impl $crate::value::Decodable for $name {
            fn decode(
                engine: &$crate::engine::Engine,
                bytes: &[u8],
                depth: usize,
            ) -> Result<Self, $crate::engine::Error> {
                $crate::record::decode_record(engine, bytes, depth)
            }
        }

        impl $crate::printer::Print for $name {
            fn print(&self, printer: &$crate::printer::Printer, indent: usize, out: &mut String) {
                out.push_str(stringify!($name));
                $(
                    out.push('\n');
                    for _ in 0..=indent {
                        out.push('\t');
                    }
                    out.push_str(concat!(stringify!($field), " = "));
                    printer.print_value(&self.$field, Some(stringify!($field)), indent + 1, out);
                )+
            }
        }
    };
}
