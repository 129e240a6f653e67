// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Member tables for composite types and enumeration descriptors.

use super::{Reflect, Shape};
use crate::codec::Codec;
use crate::error::Result;
use crate::registry::CodecRegistry;
use std::any::Any;
use std::sync::Arc;

/// Read accessor: borrow one field of `T` as `Any`.
pub type GetFn<T> = fn(&T) -> &dyn Any;

/// Write accessor: move a decoded value into one field of `T`.
///
/// Returns the value back when it is not of the field's type.
pub type SetFn<T> = fn(&mut T, Box<dyn Any>) -> std::result::Result<(), Box<dyn Any>>;

/// Resolves the codec of one member's declared type.
pub type CodecFn = fn(&CodecRegistry) -> Result<Arc<dyn Codec>>;

/// Type-level field selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectMode {
    /// Every public member unless skipped.
    #[default]
    OptOut,
    /// Only members carrying an explicit marker.
    OptIn,
}

/// Typed access to a member's value.
pub struct Accessor<T> {
    pub shape: fn() -> Shape,
    pub codec: CodecFn,
    pub get: GetFn<T>,
    pub set: SetFn<T>,
}

/// One declared member of a composite type.
pub struct Member<T> {
    /// Rust identifier of the field.
    pub ident: &'static str,
    /// Wire name override.
    pub rename: Option<&'static str>,
    /// Wire index override.
    pub order: Option<u16>,
    pub skip: bool,
    /// Explicitly marked for serialization.
    pub include: bool,
    pub public: bool,
    /// Compiler-support storage (`_`-prefixed, `PhantomData`); never serialized.
    pub synthetic: bool,
    /// `None` for members that can never be serialized.
    pub accessor: Option<Accessor<T>>,
}

impl<T> Member<T> {
    /// Public member of declared type `F`.
    pub fn field<F: Reflect>(ident: &'static str, get: GetFn<T>, set: SetFn<T>) -> Self {
        Self {
            accessor: Some(Accessor {
                shape: F::shape,
                codec: CodecRegistry::get::<F>,
                get,
                set,
            }),
            ..Self::opaque(ident)
        }
    }

    /// Member without accessors (skipped, synthetic or unselected).
    pub fn opaque(ident: &'static str) -> Self {
        Self {
            ident,
            rename: None,
            order: None,
            skip: false,
            include: false,
            public: true,
            synthetic: false,
            accessor: None,
        }
    }

    #[must_use]
    pub fn rename(mut self, name: &'static str) -> Self {
        self.rename = Some(name);
        self
    }

    #[must_use]
    pub fn order(mut self, index: u16) -> Self {
        self.order = Some(index);
        self
    }

    #[must_use]
    pub fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    #[must_use]
    pub fn include(mut self) -> Self {
        self.include = true;
        self
    }

    #[must_use]
    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    #[must_use]
    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    /// Carries any explicit serialization marker.
    pub fn is_marked(&self) -> bool {
        self.include || self.rename.is_some() || self.order.is_some()
    }

    pub fn wire_name(&self) -> &'static str {
        self.rename.unwrap_or(self.ident)
    }
}

impl<T> std::fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Member")
            .field("ident", &self.ident)
            .field("rename", &self.rename)
            .field("order", &self.order)
            .field("skip", &self.skip)
            .field("include", &self.include)
            .field("public", &self.public)
            .field("synthetic", &self.synthetic)
            .field("accessible", &self.accessor.is_some())
            .finish()
    }
}

/// Struct with named fields, serialized by the structural codec.
pub trait Composite: Reflect + Default {
    const OBJECT_MODE: ObjectMode = ObjectMode::OptOut;

    /// Members in declaration order.
    fn members() -> Vec<Member<Self>>;
}

/// Fieldless enumeration, serialized by discriminant (binary) or name (text).
pub trait ReflectEnum: Reflect + Default {
    /// `(name, discriminant)` for every variant.
    fn variants() -> Vec<(&'static str, i64)>;

    fn to_discriminant(&self) -> i64;

    fn from_discriminant(value: i64) -> Option<Self>;
}
