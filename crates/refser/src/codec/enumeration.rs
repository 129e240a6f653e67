// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fieldless enumeration codec.
//!
//! Binary writes the discriminant as `i64`; text writes the quoted variant
//! name. Unknown discriminants and names are malformed, so a field holding a
//! variant removed from the schema is recovered like any damaged field.

use super::{Context, ValueCodec};
use crate::error::{DecodeError, DecodeResult, Error, Result};
use crate::reflect::{ReflectEnum, Shape};
use crate::ser::{ByteReader, ByteWriter};

pub struct EnumCodec<T: ReflectEnum> {
    shape: Shape,
    variants: Vec<(&'static str, i64)>,
    default: T,
}

impl<T: ReflectEnum> EnumCodec<T> {
    pub fn new() -> Self {
        Self {
            shape: T::shape(),
            variants: T::variants(),
            default: T::default(),
        }
    }

    fn name_of(&self, discriminant: i64) -> Option<&'static str> {
        self.variants
            .iter()
            .find(|(_, d)| *d == discriminant)
            .map(|(n, _)| *n)
    }

    fn discriminant_of(&self, name: &str) -> Option<i64> {
        self.variants
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, d)| *d)
    }
}

impl<T: ReflectEnum> Default for EnumCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ReflectEnum> ValueCodec for EnumCodec<T> {
    type Value = T;

    fn value_shape(&self) -> &Shape {
        &self.shape
    }

    fn is_default_value(&self, value: &T) -> bool {
        value.to_discriminant() == self.default.to_discriminant()
    }

    fn eq_values(&self, a: &T, b: &T) -> bool {
        a.to_discriminant() == b.to_discriminant()
    }

    fn encode_binary(&self, value: &T, w: &mut ByteWriter, _cx: &Context<'_>) -> Result<()> {
        w.write_i64_le(value.to_discriminant());
        Ok(())
    }

    fn decode_binary(&self, r: &mut ByteReader<'_>, _cx: &Context<'_>) -> DecodeResult<T> {
        let at = r.position();
        let raw = r.read_i64_le()?;
        T::from_discriminant(raw).ok_or_else(|| {
            DecodeError::malformed(
                at,
                format!("unknown discriminant {} for {}", raw, self.shape.type_name),
            )
        })
    }

    fn encode_text(&self, value: &T, w: &mut ByteWriter, _cx: &Context<'_>) -> Result<()> {
        let discriminant = value.to_discriminant();
        let name = self.name_of(discriminant).ok_or(Error::TypeMismatch {
            expected: self.shape.type_name,
        })?;
        w.write_quoted(name);
        Ok(())
    }

    fn decode_text(&self, r: &mut ByteReader<'_>, _cx: &Context<'_>) -> DecodeResult<T> {
        r.skip_whitespace();
        let at = r.position();
        let name = r.read_quoted()?;
        self.discriminant_of(&name)
            .and_then(T::from_discriminant)
            .ok_or_else(|| {
                DecodeError::malformed(
                    at,
                    format!("unknown variant '{}' for {}", name, self.shape.type_name),
                )
            })
    }
}
