// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Forward reference to a codec that is still being derived.
//!
//! When a derivation asks the registry for a shape already on the derivation
//! stack (a recursive type), the registry hands out a `DeferredCodec` and binds
//! it once the real codec exists. The link is weak: the real codec owns the
//! deferred one through its field bindings.

use super::{Codec, Context};
use crate::error::{DecodeError, DecodeResult, Error, Result};
use crate::reflect::Shape;
use crate::ser::{ByteReader, ByteWriter};
use std::any::Any;
use std::sync::{Arc, OnceLock, Weak};

pub struct DeferredCodec {
    shape: Shape,
    target: OnceLock<Weak<dyn Codec>>,
}

impl DeferredCodec {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            target: OnceLock::new(),
        }
    }

    /// Point at the finished codec. Later binds are ignored.
    pub fn bind(&self, codec: &Arc<dyn Codec>) {
        let _ = self.target.set(Arc::downgrade(codec));
    }

    pub fn is_bound(&self) -> bool {
        self.target.get().is_some()
    }

    fn resolve(&self) -> Result<Arc<dyn Codec>> {
        self.target
            .get()
            .and_then(|weak| weak.upgrade())
            .ok_or(Error::Unresolved {
                type_name: self.shape.type_name,
            })
    }
}

impl Codec for DeferredCodec {
    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn is_default(&self, value: &dyn Any) -> bool {
        self.resolve().map_or(false, |c| c.is_default(value))
    }

    fn is_null(&self, value: &dyn Any) -> bool {
        self.resolve().map_or(false, |c| c.is_null(value))
    }

    fn values_equal(&self, a: &dyn Any, b: &dyn Any) -> bool {
        self.resolve().map_or(false, |c| c.values_equal(a, b))
    }

    fn write_binary(&self, value: &dyn Any, w: &mut ByteWriter, cx: &Context<'_>) -> Result<()> {
        self.resolve()?.write_binary(value, w, cx)
    }

    fn read_binary(&self, r: &mut ByteReader<'_>, cx: &Context<'_>) -> DecodeResult<Box<dyn Any>> {
        self.resolve().map_err(DecodeError::Fatal)?.read_binary(r, cx)
    }

    fn write_text(&self, value: &dyn Any, w: &mut ByteWriter, cx: &Context<'_>) -> Result<()> {
        self.resolve()?.write_text(value, w, cx)
    }

    fn read_text(&self, r: &mut ByteReader<'_>, cx: &Context<'_>) -> DecodeResult<Box<dyn Any>> {
        self.resolve().map_err(DecodeError::Fatal)?.read_text(r, cx)
    }
}

impl std::fmt::Debug for DeferredCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredCodec")
            .field("type_name", &self.shape.type_name)
            .field("bound", &self.is_bound())
            .finish()
    }
}
