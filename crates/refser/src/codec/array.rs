// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `Vec<T>` codec.
//!
//! Binary: `count:u32` followed by each element. Text: `[a, b, c]`.
//! An empty vector is the array default, so it is elided like any other
//! default-valued field.

use super::{unbox, Codec, Context, ValueCodec};
use crate::config::{TEXT_BEGIN_ARRAY, TEXT_ELEMENT_SEPARATOR, TEXT_END_ARRAY};
use crate::error::{DecodeError, DecodeResult, Result};
use crate::reflect::{Reflect, Shape};
use crate::ser::{ByteReader, ByteWriter};
use std::marker::PhantomData;
use std::sync::Arc;

pub struct ArrayCodec<T: Reflect> {
    shape: Shape,
    element: Arc<dyn Codec>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Reflect> ArrayCodec<T> {
    pub fn new(element: Arc<dyn Codec>) -> Self {
        Self {
            shape: <Vec<T>>::shape(),
            element,
            _marker: PhantomData,
        }
    }
}

impl<T: Reflect> ValueCodec for ArrayCodec<T> {
    type Value = Vec<T>;

    fn value_shape(&self) -> &Shape {
        &self.shape
    }

    fn is_default_value(&self, value: &Vec<T>) -> bool {
        value.is_empty()
    }

    fn eq_values(&self, a: &Vec<T>, b: &Vec<T>) -> bool {
        a.len() == b.len()
            && a
                .iter()
                .zip(b.iter())
                .all(|(x, y)| self.element.values_equal(x, y))
    }

    fn encode_binary(&self, value: &Vec<T>, w: &mut ByteWriter, cx: &Context<'_>) -> Result<()> {
        w.write_length(value.len())?;
        let cx = cx.element();
        for item in value {
            self.element.write_binary(item, w, &cx)?;
        }
        Ok(())
    }

    fn decode_binary(&self, r: &mut ByteReader<'_>, cx: &Context<'_>) -> DecodeResult<Vec<T>> {
        let at = r.position();
        let count = r.read_u32_le()? as usize;
        // every element encodes to at least one byte
        if count > r.remaining() {
            let remaining = r.remaining();
            r.set_position(at);
            return Err(DecodeError::malformed(
                at,
                format!("array count {} exceeds remaining {} bytes", count, remaining),
            ));
        }
        let cx = cx.element();
        let mut out = Vec::with_capacity(count);
        // After a malformed element, keep reading so the cursor ends on the
        // array's extent; stop early if an element did not move the cursor.
        let mut damage = None;
        for _ in 0..count {
            let start = r.position();
            match self.element.read_binary(r, &cx) {
                Ok(item) if damage.is_none() => {
                    out.push(unbox::<T>(item, self.element.shape())?);
                }
                Ok(_) => {}
                Err(err @ DecodeError::Malformed { .. }) => {
                    let stalled = r.position() <= start;
                    if damage.is_none() {
                        damage = Some(err);
                    }
                    if stalled {
                        break;
                    }
                }
                Err(err) => return Err(err),
            }
        }
        match damage {
            Some(err) => Err(err),
            None => Ok(out),
        }
    }

    fn encode_text(&self, value: &Vec<T>, w: &mut ByteWriter, cx: &Context<'_>) -> Result<()> {
        let cx = cx.element();
        w.write_u8(TEXT_BEGIN_ARRAY);
        for (i, item) in value.iter().enumerate() {
            if i > 0 {
                w.write_u8(TEXT_ELEMENT_SEPARATOR);
                w.write_u8(b' ');
            }
            self.element.write_text(item, w, &cx)?;
        }
        w.write_u8(TEXT_END_ARRAY);
        Ok(())
    }

    fn decode_text(&self, r: &mut ByteReader<'_>, cx: &Context<'_>) -> DecodeResult<Vec<T>> {
        let cx = cx.element();
        r.skip_whitespace();
        r.expect(TEXT_BEGIN_ARRAY)?;
        r.skip_whitespace();
        let mut out = Vec::new();
        if r.eat(TEXT_END_ARRAY) {
            return Ok(out);
        }
        loop {
            let item = self.element.read_text(r, &cx)?;
            out.push(unbox::<T>(item, self.element.shape())?);
            r.skip_whitespace();
            if r.eat(TEXT_ELEMENT_SEPARATOR) {
                r.skip_whitespace();
                continue;
            }
            r.expect(TEXT_END_ARRAY)?;
            return Ok(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CodecRegistry;
    use crate::settings::Settings;

    #[test]
    fn test_binary_layout() {
        let registry = CodecRegistry::new();
        let codec = registry.get::<Vec<u8>>().expect("codec");
        let settings = Settings::default();
        let mut w = ByteWriter::new();
        codec
            .write(&vec![1u8, 2, 3], &mut w, &Context::new(&settings))
            .expect("write");
        assert_eq!(w.as_slice(), &[3, 0, 0, 0, 1, 2, 3]);
    }

    #[test]
    fn test_oversized_count_is_malformed() {
        let registry = CodecRegistry::new();
        let codec = registry.get::<Vec<u64>>().expect("codec");
        let settings = Settings::default();
        let data = [0xFF, 0xFF, 0xFF, 0x7F, 1, 2];
        let mut r = ByteReader::new(&data);
        let err = codec
            .read(&mut r, &Context::new(&settings))
            .expect_err("oversized");
        assert!(err.is_recoverable());
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn test_damaged_element_consumes_whole_array() {
        let registry = CodecRegistry::new();
        let codec = registry.get::<Vec<String>>().expect("codec");
        let settings = Settings::default();
        let mut w = ByteWriter::new();
        codec
            .write(
                &vec!["ab".to_string(), "(\0".to_string(), "cd".to_string()],
                &mut w,
                &Context::new(&settings),
            )
            .expect("write");
        let mut data = w.into_vec();
        data.push(b'}');
        // first element: invalid UTF-8 of the declared length
        data[8] = 0xFF;
        let mut r = ByteReader::new(&data);
        let err = codec
            .read(&mut r, &Context::new(&settings))
            .expect_err("damaged");
        assert!(err.is_recoverable());
        assert_eq!(r.position(), data.len() - 1);
    }

    #[test]
    fn test_text_roundtrip_nested() {
        let registry = CodecRegistry::new();
        let codec = registry.get::<Vec<Vec<String>>>().expect("codec");
        let settings = Settings::text();
        let cx = Context::new(&settings);
        let value = vec![
            vec!["a".to_string(), "b, c".to_string()],
            vec![],
            vec!["]".to_string()],
        ];
        let mut w = ByteWriter::new();
        codec.write(&value, &mut w, &cx).expect("write");
        assert_eq!(
            std::str::from_utf8(w.as_slice()).expect("utf8"),
            r#"[["a", "b, c"], [], ["]"]]"#
        );
        let mut r = ByteReader::new(w.as_slice());
        let back = codec.read(&mut r, &cx).expect("read");
        assert_eq!(back.downcast_ref::<Vec<Vec<String>>>(), Some(&value));
    }

    #[test]
    fn test_empty_is_default() {
        let registry = CodecRegistry::new();
        let codec = registry.get::<Vec<i32>>().expect("codec");
        assert!(codec.is_default(&Vec::<i32>::new()));
        assert!(!codec.is_default(&vec![0i32]));
        assert!(codec.values_equal(&vec![1i32, 2], &vec![1i32, 2]));
        assert!(!codec.values_equal(&vec![1i32], &vec![1i32, 2]));
    }
}
