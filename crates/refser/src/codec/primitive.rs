// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codecs for booleans, integers, floats, characters and strings.
//!
//! Binary: fixed-width little-endian numbers, one byte booleans, `u32` scalar
//! values for characters, length-prefixed UTF-8 for strings.
//! Text: decimal ASCII numbers, `true`/`false`, quote-delimited strings.

use super::{Context, ValueCodec};
use crate::error::{DecodeError, DecodeResult, Result};
use crate::reflect::{PrimitiveKind, Reflect, Shape};
use crate::ser::{ByteReader, ByteWriter};
use std::marker::PhantomData;

/// Wire transcoding of one primitive type.
pub trait Primitive: Reflect + Default + PartialEq {
    const KIND: PrimitiveKind;

    fn write_binary(&self, w: &mut ByteWriter) -> Result<()>;

    fn read_binary(r: &mut ByteReader<'_>) -> DecodeResult<Self>;

    fn write_text(&self, w: &mut ByteWriter);

    fn read_text(r: &mut ByteReader<'_>) -> DecodeResult<Self>;
}

/// Parse the next bare token as a number.
fn parse_token<T: std::str::FromStr>(r: &mut ByteReader<'_>) -> DecodeResult<T> {
    let at = r.position();
    let token = r.read_token()?;
    token
        .parse::<T>()
        .map_err(|_| DecodeError::malformed(at, format!("invalid number '{}'", token)))
}

macro_rules! impl_numeric {
    ($type:ty, $kind:ident, $write:ident, $read:ident) => {
        impl Primitive for $type {
            const KIND: PrimitiveKind = PrimitiveKind::$kind;

            fn write_binary(&self, w: &mut ByteWriter) -> Result<()> {
                w.$write(*self);
                Ok(())
            }

            fn read_binary(r: &mut ByteReader<'_>) -> DecodeResult<Self> {
                r.$read()
            }

            fn write_text(&self, w: &mut ByteWriter) {
                w.write_display(self);
            }

            fn read_text(r: &mut ByteReader<'_>) -> DecodeResult<Self> {
                parse_token(r)
            }
        }
    };
}

impl_numeric!(i8, I8, write_i8, read_i8);
impl_numeric!(i16, I16, write_i16_le, read_i16_le);
impl_numeric!(i32, I32, write_i32_le, read_i32_le);
impl_numeric!(i64, I64, write_i64_le, read_i64_le);
impl_numeric!(u8, U8, write_u8, read_u8);
impl_numeric!(u16, U16, write_u16_le, read_u16_le);
impl_numeric!(u32, U32, write_u32_le, read_u32_le);
impl_numeric!(u64, U64, write_u64_le, read_u64_le);
impl_numeric!(f32, F32, write_f32_le, read_f32_le);
impl_numeric!(f64, F64, write_f64_le, read_f64_le);

impl Primitive for bool {
    const KIND: PrimitiveKind = PrimitiveKind::Bool;

    fn write_binary(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_bool(*self);
        Ok(())
    }

    fn read_binary(r: &mut ByteReader<'_>) -> DecodeResult<Self> {
        r.read_bool()
    }

    fn write_text(&self, w: &mut ByteWriter) {
        w.write_text_bool(*self);
    }

    fn read_text(r: &mut ByteReader<'_>) -> DecodeResult<Self> {
        let at = r.position();
        match r.read_token()? {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(DecodeError::malformed(
                at,
                format!("invalid boolean '{}'", other),
            )),
        }
    }
}

impl Primitive for char {
    const KIND: PrimitiveKind = PrimitiveKind::Char;

    fn write_binary(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_u32_le(u32::from(*self));
        Ok(())
    }

    fn read_binary(r: &mut ByteReader<'_>) -> DecodeResult<Self> {
        let at = r.position();
        let raw = r.read_u32_le()?;
        char::from_u32(raw).ok_or_else(|| {
            DecodeError::malformed(at, format!("invalid char scalar 0x{:x}", raw))
        })
    }

    fn write_text(&self, w: &mut ByteWriter) {
        let mut buf = [0u8; 4];
        w.write_quoted(self.encode_utf8(&mut buf));
    }

    fn read_text(r: &mut ByteReader<'_>) -> DecodeResult<Self> {
        let at = r.position();
        let s = r.read_quoted()?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(DecodeError::malformed(
                at,
                "expected exactly one character",
            )),
        }
    }
}

impl Primitive for String {
    const KIND: PrimitiveKind = PrimitiveKind::String;

    fn write_binary(&self, w: &mut ByteWriter) -> Result<()> {
        w.write_str(self)
    }

    fn read_binary(r: &mut ByteReader<'_>) -> DecodeResult<Self> {
        r.read_string()
    }

    fn write_text(&self, w: &mut ByteWriter) {
        w.write_quoted(self);
    }

    fn read_text(r: &mut ByteReader<'_>) -> DecodeResult<Self> {
        r.read_quoted()
    }
}

/// Codec for a single primitive type.
pub struct PrimitiveCodec<T: Primitive> {
    shape: Shape,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Primitive> PrimitiveCodec<T> {
    pub fn new() -> Self {
        Self {
            shape: T::shape(),
            _marker: PhantomData,
        }
    }
}

impl<T: Primitive> Default for PrimitiveCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Primitive> ValueCodec for PrimitiveCodec<T> {
    type Value = T;

    fn value_shape(&self) -> &Shape {
        &self.shape
    }

    fn is_default_value(&self, value: &T) -> bool {
        *value == T::default()
    }

    fn eq_values(&self, a: &T, b: &T) -> bool {
        a == b
    }

    fn encode_binary(&self, value: &T, w: &mut ByteWriter, _cx: &Context<'_>) -> Result<()> {
        value.write_binary(w)
    }

    fn decode_binary(&self, r: &mut ByteReader<'_>, _cx: &Context<'_>) -> DecodeResult<T> {
        T::read_binary(r)
    }

    fn encode_text(&self, value: &T, w: &mut ByteWriter, _cx: &Context<'_>) -> Result<()> {
        value.write_text(w);
        Ok(())
    }

    fn decode_text(&self, r: &mut ByteReader<'_>, _cx: &Context<'_>) -> DecodeResult<T> {
        r.skip_whitespace();
        T::read_text(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    fn roundtrip<T: Primitive + Clone + std::fmt::Debug>(values: &[T]) {
        let codec = PrimitiveCodec::<T>::new();
        for settings in [Settings::binary(), Settings::text()] {
            let cx = Context::new(&settings);
            for v in values {
                let mut w = ByteWriter::new();
                if settings.formatting == crate::settings::Formatting::Binary {
                    codec.encode_binary(v, &mut w, &cx).expect("encode");
                    let mut r = ByteReader::new(w.as_slice());
                    assert_eq!(&codec.decode_binary(&mut r, &cx).expect("decode"), v);
                    assert!(r.is_eof());
                } else {
                    codec.encode_text(v, &mut w, &cx).expect("encode");
                    let mut r = ByteReader::new(w.as_slice());
                    assert_eq!(&codec.decode_text(&mut r, &cx).expect("decode"), v);
                    assert!(r.is_eof());
                }
            }
        }
    }

    #[test]
    fn test_integer_extremes_roundtrip() {
        roundtrip(&[0i8, -1, i8::MIN, i8::MAX]);
        roundtrip(&[0i16, -300, i16::MIN, i16::MAX]);
        roundtrip(&[0i32, -70_000, i32::MIN, i32::MAX]);
        roundtrip(&[0i64, -1, i64::MIN, i64::MAX]);
        roundtrip(&[0u8, 1, u8::MAX]);
        roundtrip(&[0u16, u16::MAX]);
        roundtrip(&[0u32, u32::MAX]);
        roundtrip(&[0u64, u64::MAX]);
    }

    #[test]
    fn test_float_roundtrip_including_specials() {
        roundtrip(&[0.0f32, -1.5, f32::MAX, f32::MIN_POSITIVE, f32::INFINITY]);
        roundtrip(&[0.0f64, 0.1, -2.5e300, f64::MAX, f64::NEG_INFINITY]);
    }

    #[test]
    fn test_nan_text_roundtrip() {
        let codec = PrimitiveCodec::<f64>::new();
        let settings = Settings::text();
        let cx = Context::new(&settings);
        let mut w = ByteWriter::new();
        codec.encode_text(&f64::NAN, &mut w, &cx).expect("encode");
        assert_eq!(w.as_slice(), b"NaN");
        let mut r = ByteReader::new(w.as_slice());
        assert!(codec.decode_text(&mut r, &cx).expect("decode").is_nan());
    }

    #[test]
    fn test_bool_char_string_roundtrip() {
        roundtrip(&[true, false]);
        roundtrip(&['a', '\n', '"', 'é', '\u{1F980}']);
        roundtrip(&[
            String::new(),
            "plain".to_string(),
            "quote \" and \\ slash\nline".to_string(),
            "ünïcödé".to_string(),
        ]);
    }

    #[test]
    fn test_text_number_rejects_garbage() {
        let codec = PrimitiveCodec::<u16>::new();
        let settings = Settings::text();
        let cx = Context::new(&settings);
        let mut r = ByteReader::new(b"70000");
        assert!(codec
            .decode_text(&mut r, &cx)
            .expect_err("overflow")
            .is_recoverable());
    }

    #[test]
    fn test_invalid_char_scalar_is_malformed() {
        let bytes = 0xD800u32.to_le_bytes();
        let mut r = ByteReader::new(&bytes);
        assert!(char::read_binary(&mut r)
            .expect_err("surrogate")
            .is_recoverable());
    }

    #[test]
    fn test_is_default() {
        let codec = PrimitiveCodec::<String>::new();
        assert!(codec.is_default_value(&String::new()));
        assert!(!codec.is_default_value(&"x".to_string()));
    }
}
