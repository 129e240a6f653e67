// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec contract and the primitive/container codec family.
//!
//! A codec is bound to exactly one [`Shape`] and is immutable once built, so a
//! single instance is shared by every caller. [`Codec`] is the object-safe
//! surface used through `Arc<dyn Codec>`; most codecs implement the typed
//! [`ValueCodec`] instead and get `Codec` from the blanket impl.

mod array;
mod boxed;
mod deferred;
mod enumeration;
mod nullable;
mod primitive;

pub use array::ArrayCodec;
pub use boxed::BoxedCodec;
pub use deferred::DeferredCodec;
pub use enumeration::EnumCodec;
pub use nullable::NullableCodec;
pub use primitive::{Primitive, PrimitiveCodec};

use crate::error::{DecodeError, DecodeResult, Error, Result};
use crate::reflect::Shape;
use crate::ser::{ByteReader, ByteWriter};
use crate::settings::{Formatting, Settings};
use std::any::Any;

/// Per-call serialization state: active settings and recursion depth.
///
/// Contexts are copied, never shared: descending into a field payload yields a
/// new context one level deeper, so every frame has its own depth counter.
#[derive(Debug, Clone, Copy)]
pub struct Context<'s> {
    settings: &'s Settings,
    depth: u32,
    root: bool,
}

impl<'s> Context<'s> {
    /// Top-level context (depth 1).
    pub fn new(settings: &'s Settings) -> Self {
        Self {
            settings,
            depth: 1,
            root: true,
        }
    }

    pub fn settings(&self) -> &'s Settings {
        self.settings
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// True only for the value handed to the public entry point.
    pub fn is_root(&self) -> bool {
        self.root
    }

    /// Context for a field payload one record deeper.
    #[must_use]
    pub fn descend(&self) -> Self {
        Self {
            settings: self.settings,
            depth: self.depth.saturating_add(1),
            root: false,
        }
    }

    /// Context for a container element (same depth, never root).
    #[must_use]
    pub fn element(&self) -> Self {
        Self {
            root: false,
            ..*self
        }
    }

    /// Fields are written only while the depth is below `max_depth`.
    pub fn within_depth(&self) -> bool {
        self.depth < self.settings.max_depth
    }
}

/// Object-safe codec surface.
pub trait Codec: Send + Sync + 'static {
    fn shape(&self) -> &Shape;

    /// Value equals the shape's default/empty value.
    fn is_default(&self, value: &dyn Any) -> bool;

    /// Value is an absent nullable.
    fn is_null(&self, value: &dyn Any) -> bool;

    fn values_equal(&self, a: &dyn Any, b: &dyn Any) -> bool;

    fn write_binary(&self, value: &dyn Any, w: &mut ByteWriter, cx: &Context<'_>) -> Result<()>;

    fn read_binary(&self, r: &mut ByteReader<'_>, cx: &Context<'_>) -> DecodeResult<Box<dyn Any>>;

    fn write_text(&self, value: &dyn Any, w: &mut ByteWriter, cx: &Context<'_>) -> Result<()>;

    fn read_text(&self, r: &mut ByteReader<'_>, cx: &Context<'_>) -> DecodeResult<Box<dyn Any>>;

    /// Write in the encoding selected by `cx`.
    fn write(&self, value: &dyn Any, w: &mut ByteWriter, cx: &Context<'_>) -> Result<()> {
        match cx.settings().formatting {
            Formatting::Binary => self.write_binary(value, w, cx),
            Formatting::Text => self.write_text(value, w, cx),
        }
    }

    /// Read in the encoding selected by `cx`.
    fn read(&self, r: &mut ByteReader<'_>, cx: &Context<'_>) -> DecodeResult<Box<dyn Any>> {
        match cx.settings().formatting {
            Formatting::Binary => self.read_binary(r, cx),
            Formatting::Text => self.read_text(r, cx),
        }
    }
}

/// Typed codec; implementors get [`Codec`] through a blanket impl.
pub trait ValueCodec: Send + Sync + 'static {
    type Value: Any;

    fn value_shape(&self) -> &Shape;

    fn is_default_value(&self, value: &Self::Value) -> bool;

    fn is_null_value(&self, _value: &Self::Value) -> bool {
        false
    }

    fn eq_values(&self, a: &Self::Value, b: &Self::Value) -> bool;

    fn encode_binary(
        &self,
        value: &Self::Value,
        w: &mut ByteWriter,
        cx: &Context<'_>,
    ) -> Result<()>;

    fn decode_binary(&self, r: &mut ByteReader<'_>, cx: &Context<'_>)
        -> DecodeResult<Self::Value>;

    fn encode_text(&self, value: &Self::Value, w: &mut ByteWriter, cx: &Context<'_>)
        -> Result<()>;

    fn decode_text(&self, r: &mut ByteReader<'_>, cx: &Context<'_>) -> DecodeResult<Self::Value>;
}

impl<C: ValueCodec> Codec for C {
    fn shape(&self) -> &Shape {
        self.value_shape()
    }

    fn is_default(&self, value: &dyn Any) -> bool {
        value
            .downcast_ref::<C::Value>()
            .map_or(false, |v| self.is_default_value(v))
    }

    fn is_null(&self, value: &dyn Any) -> bool {
        value
            .downcast_ref::<C::Value>()
            .map_or(false, |v| self.is_null_value(v))
    }

    fn values_equal(&self, a: &dyn Any, b: &dyn Any) -> bool {
        match (a.downcast_ref::<C::Value>(), b.downcast_ref::<C::Value>()) {
            (Some(a), Some(b)) => self.eq_values(a, b),
            _ => false,
        }
    }

    fn write_binary(&self, value: &dyn Any, w: &mut ByteWriter, cx: &Context<'_>) -> Result<()> {
        let value = downcast::<C::Value>(value, self.value_shape())?;
        self.encode_binary(value, w, cx)
    }

    fn read_binary(&self, r: &mut ByteReader<'_>, cx: &Context<'_>) -> DecodeResult<Box<dyn Any>> {
        Ok(Box::new(self.decode_binary(r, cx)?))
    }

    fn write_text(&self, value: &dyn Any, w: &mut ByteWriter, cx: &Context<'_>) -> Result<()> {
        let value = downcast::<C::Value>(value, self.value_shape())?;
        self.encode_text(value, w, cx)
    }

    fn read_text(&self, r: &mut ByteReader<'_>, cx: &Context<'_>) -> DecodeResult<Box<dyn Any>> {
        Ok(Box::new(self.decode_text(r, cx)?))
    }
}

/// Borrow `value` as `T`, or report a mismatch against `shape`.
pub(crate) fn downcast<'v, T: Any>(value: &'v dyn Any, shape: &Shape) -> Result<&'v T> {
    value.downcast_ref::<T>().ok_or(Error::TypeMismatch {
        expected: shape.type_name,
    })
}

/// Unbox a value produced by a nested codec.
pub(crate) fn unbox<T: Any>(value: Box<dyn Any>, shape: &Shape) -> DecodeResult<T> {
    value
        .downcast::<T>()
        .map(|v| *v)
        .map_err(|_| {
            DecodeError::Fatal(Error::TypeMismatch {
                expected: shape.type_name,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::Reflect;
    use crate::registry::CodecRegistry;

    #[test]
    fn test_context_descend_and_element() {
        let settings = Settings::default().with_max_depth(3);
        let cx = Context::new(&settings);
        assert_eq!(cx.depth(), 1);
        assert!(cx.is_root());
        assert!(cx.within_depth());

        let child = cx.descend();
        assert_eq!(child.depth(), 2);
        assert!(!child.is_root());

        let elem = child.element();
        assert_eq!(elem.depth(), 2);

        assert!(!child.descend().within_depth());
    }

    #[test]
    fn test_write_rejects_foreign_value() {
        let registry = CodecRegistry::new();
        let codec = registry.get::<u32>().expect("u32 codec");
        let settings = Settings::default();
        let mut w = ByteWriter::new();
        let err = codec
            .write(&"not a u32", &mut w, &Context::new(&settings))
            .expect_err("mismatch");
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(codec.shape().type_id, u32::shape().type_id);
    }

    #[test]
    fn test_dispatch_follows_formatting() {
        let registry = CodecRegistry::new();
        let codec = registry.get::<i32>().expect("i32 codec");

        let binary = Settings::default();
        let mut w = ByteWriter::new();
        codec
            .write(&-2i32, &mut w, &Context::new(&binary))
            .expect("binary");
        assert_eq!(w.as_slice(), &(-2i32).to_le_bytes());

        let text = Settings::text();
        let mut w = ByteWriter::new();
        codec
            .write(&-2i32, &mut w, &Context::new(&text))
            .expect("text");
        assert_eq!(w.as_slice(), b"-2");
    }
}
