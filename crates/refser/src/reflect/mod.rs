// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type shapes and the `Reflect` capability.
//!
//! A [`Shape`] is the identity of a type as the registry sees it: its
//! `TypeId`, a readable name, the unparametrised template name of generic
//! shapes, and what kind of codec it needs. Types opt into serialization by
//! implementing [`Reflect`], normally through `#[derive(Reflect)]`.
//!
//! # Example
//!
//! ```rust
//! use refser::{Reflect, Shape, ShapeKind};
//!
//! #[derive(Reflect, Default)]
//! #[refser(object)]
//! pub struct Position {
//!     pub x: f32,
//!     pub y: f32,
//! }
//!
//! let shape = Position::shape();
//! assert_eq!(shape.kind, ShapeKind::Composite);
//! assert!(shape.auto_permit);
//! ```

mod impls;
pub mod member;

pub use member::{Accessor, CodecFn, Composite, GetFn, Member, ObjectMode, ReflectEnum, SetFn};

use crate::codec::Codec;
use crate::error::Result;
use crate::registry::CodecRegistry;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Primitive value kinds with a dedicated codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    String,
}

/// Which codec family a shape belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Primitive(PrimitiveKind),
    /// Fieldless enumeration.
    Enum,
    /// `Vec<T>`.
    Array,
    /// `Option<T>`.
    Nullable,
    /// `Box<T>`, transparent on the wire.
    Boxed,
    /// Struct with named fields.
    Composite,
}

/// Identity of a type as seen by the codec registry.
#[derive(Debug, Clone)]
pub struct Shape {
    pub type_id: TypeId,
    pub type_name: &'static str,
    /// Unparametrised name of a generic shape (`"Option"`, `"Vec"`, ...).
    pub template: Option<&'static str>,
    pub kind: ShapeKind,
    /// Type reached after peeling `Option` and `Box` wrappers.
    pub core: TypeId,
    /// Shape is permitted without registration (`#[refser(object)]`).
    pub auto_permit: bool,
}

impl Shape {
    pub fn primitive<T: 'static>(kind: PrimitiveKind) -> Self {
        Self::plain::<T>(ShapeKind::Primitive(kind))
    }

    pub fn enumeration<T: 'static>() -> Self {
        Self::plain::<T>(ShapeKind::Enum)
    }

    pub fn composite<T: 'static>(template: Option<&'static str>, auto_permit: bool) -> Self {
        Self {
            template,
            auto_permit,
            ..Self::plain::<T>(ShapeKind::Composite)
        }
    }

    pub fn array<T: 'static>() -> Self {
        Self {
            template: Some("Vec"),
            ..Self::plain::<T>(ShapeKind::Array)
        }
    }

    pub fn nullable<T: 'static, Inner: Reflect>() -> Self {
        Self {
            template: Some("Option"),
            core: Inner::shape().core,
            ..Self::plain::<T>(ShapeKind::Nullable)
        }
    }

    pub fn boxed<T: 'static, Inner: Reflect>() -> Self {
        Self {
            template: Some("Box"),
            core: Inner::shape().core,
            ..Self::plain::<T>(ShapeKind::Boxed)
        }
    }

    fn plain<T: 'static>(kind: ShapeKind) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            template: None,
            kind,
            core: TypeId::of::<T>(),
            auto_permit: false,
        }
    }

    pub fn is_generic(&self) -> bool {
        self.template.is_some()
    }
}

/// Capability of a type to describe itself and build its codec.
pub trait Reflect: Any + Send + Sync + Sized {
    fn shape() -> Shape;

    /// Build the codec for `Self`, resolving nested codecs from `registry`.
    ///
    /// Called once per registry; callers go through [`CodecRegistry::get`].
    fn build_codec(registry: &CodecRegistry) -> Result<Arc<dyn Codec>>;
}

/// Object-safe view of a [`Reflect`] value, for untyped serialization.
pub trait DynReflect: Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn dyn_shape(&self) -> Shape;

    fn resolve_codec(&self, registry: &CodecRegistry) -> Result<Arc<dyn Codec>>;
}

impl<T: Reflect> DynReflect for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_shape(&self) -> Shape {
        T::shape()
    }

    fn resolve_codec(&self, registry: &CodecRegistry) -> Result<Arc<dyn Codec>> {
        registry.get::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_shape() {
        let shape = i32::shape();
        assert_eq!(shape.kind, ShapeKind::Primitive(PrimitiveKind::I32));
        assert_eq!(shape.type_id, TypeId::of::<i32>());
        assert_eq!(shape.core, shape.type_id);
        assert!(!shape.is_generic());
    }

    #[test]
    fn test_wrappers_peel_to_core() {
        let shape = <Option<Box<u64>>>::shape();
        assert_eq!(shape.kind, ShapeKind::Nullable);
        assert_eq!(shape.template, Some("Option"));
        assert_eq!(shape.core, TypeId::of::<u64>());
    }

    #[test]
    fn test_array_does_not_peel() {
        let shape = <Vec<String>>::shape();
        assert_eq!(shape.kind, ShapeKind::Array);
        assert_eq!(shape.template, Some("Vec"));
        assert_eq!(shape.core, TypeId::of::<Vec<String>>());
    }

    #[test]
    fn test_dyn_reflect_exposes_shape() {
        let value: Box<dyn DynReflect> = Box::new(String::from("x"));
        assert_eq!(value.dyn_shape().type_id, TypeId::of::<String>());
        assert!(value.as_any().downcast_ref::<String>().is_some());
    }
}
