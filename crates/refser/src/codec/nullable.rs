// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `Option<T>` codec.
//!
//! Binary carries a one byte presence flag before the inner value; text writes
//! the literal `null` for `None`.

use super::{unbox, Codec, Context, ValueCodec};
use crate::config::TEXT_NULL;
use crate::error::{DecodeResult, Result};
use crate::reflect::{Reflect, Shape};
use crate::ser::{ByteReader, ByteWriter};
use std::marker::PhantomData;
use std::sync::Arc;

pub struct NullableCodec<T: Reflect> {
    shape: Shape,
    inner: Arc<dyn Codec>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Reflect> NullableCodec<T> {
    pub fn new(inner: Arc<dyn Codec>) -> Self {
        Self {
            shape: <Option<T>>::shape(),
            inner,
            _marker: PhantomData,
        }
    }

    fn decode_inner(&self, value: Box<dyn std::any::Any>) -> DecodeResult<T> {
        unbox::<T>(value, self.inner.shape())
    }
}

impl<T: Reflect> ValueCodec for NullableCodec<T> {
    type Value = Option<T>;

    fn value_shape(&self) -> &Shape {
        &self.shape
    }

    fn is_default_value(&self, value: &Option<T>) -> bool {
        value.is_none()
    }

    fn is_null_value(&self, value: &Option<T>) -> bool {
        value.is_none()
    }

    fn eq_values(&self, a: &Option<T>, b: &Option<T>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => self.inner.values_equal(a, b),
            _ => false,
        }
    }

    fn encode_binary(&self, value: &Option<T>, w: &mut ByteWriter, cx: &Context<'_>) -> Result<()> {
        match value {
            Some(v) => {
                w.write_bool(true);
                self.inner.write_binary(v, w, cx)
            }
            None => {
                w.write_bool(false);
                Ok(())
            }
        }
    }

    fn decode_binary(&self, r: &mut ByteReader<'_>, cx: &Context<'_>) -> DecodeResult<Option<T>> {
        if !r.read_bool()? {
            return Ok(None);
        }
        let value = self.inner.read_binary(r, cx)?;
        self.decode_inner(value).map(Some)
    }

    fn encode_text(&self, value: &Option<T>, w: &mut ByteWriter, cx: &Context<'_>) -> Result<()> {
        match value {
            Some(v) => self.inner.write_text(v, w, cx),
            None => {
                w.write_text_null();
                Ok(())
            }
        }
    }

    fn decode_text(&self, r: &mut ByteReader<'_>, cx: &Context<'_>) -> DecodeResult<Option<T>> {
        r.skip_whitespace();
        if r.eat_token(TEXT_NULL) {
            return Ok(None);
        }
        let value = self.inner.read_text(r, cx)?;
        self.decode_inner(value).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CodecRegistry;
    use crate::settings::Settings;

    #[test]
    fn test_binary_presence_flag() {
        let registry = CodecRegistry::new();
        let codec = registry.get::<Option<u16>>().expect("codec");
        let settings = Settings::default();
        let cx = Context::new(&settings);

        let mut w = ByteWriter::new();
        codec.write_binary(&Some(7u16), &mut w, &cx).expect("some");
        codec.write_binary(&None::<u16>, &mut w, &cx).expect("none");
        assert_eq!(w.as_slice(), &[1, 7, 0, 0]);

        let mut r = ByteReader::new(w.as_slice());
        let a = codec.read_binary(&mut r, &cx).expect("some");
        let b = codec.read_binary(&mut r, &cx).expect("none");
        assert_eq!(a.downcast_ref::<Option<u16>>(), Some(&Some(7)));
        assert_eq!(b.downcast_ref::<Option<u16>>(), Some(&None));
    }

    #[test]
    fn test_text_null_literal() {
        let registry = CodecRegistry::new();
        let codec = registry.get::<Option<String>>().expect("codec");
        let settings = Settings::text();
        let cx = Context::new(&settings);

        let mut w = ByteWriter::new();
        codec.write_text(&None::<String>, &mut w, &cx).expect("none");
        assert_eq!(w.as_slice(), b"null");

        let mut r = ByteReader::new(b"  \"null\"");
        let v = codec.read_text(&mut r, &cx).expect("quoted");
        assert_eq!(
            v.downcast_ref::<Option<String>>(),
            Some(&Some("null".to_string()))
        );
    }

    #[test]
    fn test_null_and_default_predicates() {
        let registry = CodecRegistry::new();
        let codec = registry.get::<Option<i32>>().expect("codec");
        assert!(codec.is_null(&None::<i32>));
        assert!(codec.is_default(&None::<i32>));
        assert!(!codec.is_null(&Some(0i32)));
        assert!(!codec.is_default(&Some(0i32)));
        assert!(codec.values_equal(&Some(3i32), &Some(3i32)));
        assert!(!codec.values_equal(&Some(3i32), &None::<i32>));
    }
}
