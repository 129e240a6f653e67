// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `Box<T>` codec: writes and reads exactly what the inner codec does.

use super::{unbox, Codec, Context, ValueCodec};
use crate::error::{DecodeResult, Result};
use crate::reflect::{Reflect, Shape};
use crate::ser::{ByteReader, ByteWriter};
use std::marker::PhantomData;
use std::sync::Arc;

pub struct BoxedCodec<T: Reflect> {
    shape: Shape,
    inner: Arc<dyn Codec>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Reflect> BoxedCodec<T> {
    pub fn new(inner: Arc<dyn Codec>) -> Self {
        Self {
            shape: <Box<T>>::shape(),
            inner,
            _marker: PhantomData,
        }
    }
}

impl<T: Reflect> ValueCodec for BoxedCodec<T> {
    type Value = Box<T>;

    fn value_shape(&self) -> &Shape {
        &self.shape
    }

    fn is_default_value(&self, value: &Box<T>) -> bool {
        self.inner.is_default(&**value)
    }

    fn eq_values(&self, a: &Box<T>, b: &Box<T>) -> bool {
        self.inner.values_equal(&**a, &**b)
    }

    fn encode_binary(&self, value: &Box<T>, w: &mut ByteWriter, cx: &Context<'_>) -> Result<()> {
        self.inner.write_binary(&**value, w, cx)
    }

    fn decode_binary(&self, r: &mut ByteReader<'_>, cx: &Context<'_>) -> DecodeResult<Box<T>> {
        let value = self.inner.read_binary(r, cx)?;
        unbox::<T>(value, self.inner.shape()).map(Box::new)
    }

    fn encode_text(&self, value: &Box<T>, w: &mut ByteWriter, cx: &Context<'_>) -> Result<()> {
        self.inner.write_text(&**value, w, cx)
    }

    fn decode_text(&self, r: &mut ByteReader<'_>, cx: &Context<'_>) -> DecodeResult<Box<T>> {
        let value = self.inner.read_text(r, cx)?;
        unbox::<T>(value, self.inner.shape()).map(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CodecRegistry;
    use crate::settings::Settings;

    #[test]
    fn test_box_is_transparent() {
        let registry = CodecRegistry::new();
        let boxed = registry.get::<Box<u32>>().expect("boxed");
        let plain = registry.get::<u32>().expect("plain");
        let settings = Settings::default();
        let cx = Context::new(&settings);

        let mut a = ByteWriter::new();
        boxed.write(&Box::new(9u32), &mut a, &cx).expect("boxed write");
        let mut b = ByteWriter::new();
        plain.write(&9u32, &mut b, &cx).expect("plain write");
        assert_eq!(a.as_slice(), b.as_slice());

        let mut r = ByteReader::new(a.as_slice());
        let back = boxed.read(&mut r, &cx).expect("read");
        assert_eq!(back.downcast_ref::<Box<u32>>().map(|b| **b), Some(9));
        assert!(boxed.is_default(&Box::new(0u32)));
    }
}
