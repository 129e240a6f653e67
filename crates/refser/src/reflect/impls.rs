// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `Reflect` for primitives and the standard container shapes.

use super::{Reflect, Shape};
use crate::codec::{ArrayCodec, BoxedCodec, Codec, NullableCodec, Primitive, PrimitiveCodec};
use crate::error::Result;
use crate::registry::CodecRegistry;
use std::sync::Arc;

macro_rules! impl_reflect_primitive {
    ($($type:ty),* $(,)?) => {
        $(
            impl Reflect for $type {
                fn shape() -> Shape {
                    Shape::primitive::<$type>(<$type as Primitive>::KIND)
                }

                fn build_codec(_registry: &CodecRegistry) -> Result<Arc<dyn Codec>> {
                    Ok(Arc::new(PrimitiveCodec::<$type>::new()))
                }
            }
        )*
    };
}

impl_reflect_primitive!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, char, String);

impl<T: Reflect> Reflect for Option<T> {
    fn shape() -> Shape {
        Shape::nullable::<Self, T>()
    }

    fn build_codec(registry: &CodecRegistry) -> Result<Arc<dyn Codec>> {
        let inner = registry.get::<T>()?;
        Ok(Arc::new(NullableCodec::<T>::new(inner)))
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn shape() -> Shape {
        Shape::boxed::<Self, T>()
    }

    fn build_codec(registry: &CodecRegistry) -> Result<Arc<dyn Codec>> {
        let inner = registry.get::<T>()?;
        Ok(Arc::new(BoxedCodec::<T>::new(inner)))
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn shape() -> Shape {
        Shape::array::<Self>()
    }

    fn build_codec(registry: &CodecRegistry) -> Result<Arc<dyn Codec>> {
        let element = registry.get::<T>()?;
        Ok(Arc::new(ArrayCodec::<T>::new(element)))
    }
}
