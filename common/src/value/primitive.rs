//! Fixed-size numerics as their native in-memory bytes. Size and byte order
//! are whatever the host uses; the format makes no portability promise.

use bytes::{BufMut, BytesMut};
use snafu::ensure;

use crate::engine::{Engine, Error, NumericSizeSnafu};

use super::{Decodable, Encodable};

macro_rules! raw_numeric {
    ($($ty:ty),* $(,)?) => {$(
        impl Encodable for $ty {
            fn encode(&self, _: &Engine, buf: &mut BytesMut, _: usize) -> Result<(), Error> {
                buf.put_slice(&self.to_ne_bytes());
                Ok(())
            }
        }

        impl Decodable for $ty {
            fn decode(_: &Engine, bytes: &[u8], _: usize) -> Result<Self, Error> {
                const SIZE: usize = std::mem::size_of::<$ty>();
                ensure!(
                    bytes.len() == SIZE,
                    NumericSizeSnafu {
                        type_name: stringify!($ty),
                        expected: SIZE,
                        got: bytes.len(),
                    }
                );
                let mut raw = [0u8; SIZE];
                raw.copy_from_slice(bytes);
                Ok(<$ty>::from_ne_bytes(raw))
            }
        }
    )*};
}

raw_numeric!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl Encodable for bool {
    fn encode(&self, _: &Engine, buf: &mut BytesMut, _: usize) -> Result<(), Error> {
        buf.put_u8(*self as u8);
        Ok(())
    }
}

impl Decodable for bool {
    fn decode(_: &Engine, bytes: &[u8], _: usize) -> Result<Self, Error> {
        ensure!(
            bytes.len() == 1,
            NumericSizeSnafu {
                type_name: "bool",
                expected: 1usize,
                got: bytes.len(),
            }
        );
        Ok(bytes[0] != 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::{Engine, Error};

    fn round_trip<T>(value: T)
    where
        T: super::Encodable + super::Decodable + PartialEq + std::fmt::Debug + Copy,
    {
        let engine = Engine::new();
        let bytes = engine.serialize(&value).unwrap();
        assert_eq!(engine.deserialize::<T>(&bytes).unwrap(), value);
    }

    #[test]
    fn integers() {
        round_trip(0i8);
        round_trip(i8::MIN);
        round_trip(i16::MAX);
        round_trip(0i32);
        round_trip(i32::MIN);
        round_trip(i32::MAX);
        round_trip(3213i32);
        round_trip(i64::MIN);
        round_trip(u8::MAX);
        round_trip(u16::MAX);
        round_trip(u32::MAX);
        round_trip(u64::MAX);
    }

    #[test]
    fn floats() {
        round_trip(0.0f32);
        round_trip(f32::MIN);
        round_trip(f64::MAX);
        round_trip(f64::NEG_INFINITY);

        let engine = Engine::new();
        let bytes = engine.serialize(&f64::NAN).unwrap();
        assert!(engine.deserialize::<f64>(&bytes).unwrap().is_nan());
    }

    #[test]
    fn booleans() {
        round_trip(true);
        round_trip(false);
    }

    #[test]
    fn unit_length_tracks_native_size() {
        let engine = Engine::new();
        assert_eq!(engine.serialize(&1i32).unwrap().len(), 5);
        assert_eq!(engine.serialize(&1.0f64).unwrap().len(), 9);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let engine = Engine::new();
        let bytes = engine.serialize(&7i64).unwrap();
        assert!(matches!(
            engine.deserialize::<i32>(&bytes),
            Err(Error::NumericSize { .. })
        ));
    }
}
