// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural codec for composite types.
//!
//! Derived once per type from its member table ([`Composite::members`]): the
//! eligible members become [`FieldBinding`]s with a unique wire index and
//! name, each holding the codec of the member's declared type.
//!
//! # Binary record layout
//!
//! ```text
//! [ '{' ]                                                nested records only
//! ( '(' index:u16 [ len:u32 name ':' ] [ present:u8 ] payload )*
//! '}'
//! ```
//!
//! Fields are written only while the context depth is below `max_depth`; the
//! break marker is written regardless, so a record cut off by depth still
//! decodes. Decoding is resilient: see the `binary` and `text` submodules.

mod binary;
mod binding;
mod text;

pub use binding::FieldBinding;

use crate::codec::{Context, ValueCodec};
use crate::error::{DecodeError, DecodeResult, Error, Result};
use crate::reflect::{Composite, ObjectMode, Shape};
use crate::registry::CodecRegistry;
use crate::settings::{
    ConvertBehaviour, DefaultValueHandling, NullValueHandling, ReferenceLoopHandling,
};
use crate::ser::{ByteReader, ByteWriter};
use binding::SlotAllocator;
use std::any::TypeId;
use std::collections::HashMap;

/// Codec derived for a composite type.
pub struct StructuralCodec<T: Composite> {
    shape: Shape,
    defaults: T,
    /// Sorted by wire index.
    bindings: Vec<FieldBinding<T>>,
    by_name: HashMap<String, usize>,
    by_index: HashMap<u16, usize>,
}

impl<T: Composite> StructuralCodec<T> {
    /// Build the binding table, resolving member codecs from `registry`.
    pub fn derive(registry: &CodecRegistry) -> Result<Self> {
        let shape = T::shape();
        let self_id = TypeId::of::<T>();
        let mut slots = SlotAllocator::default();
        let mut bindings = Vec::new();

        for member in T::members() {
            if member.skip || member.synthetic {
                continue;
            }
            let selected = match T::OBJECT_MODE {
                ObjectMode::OptIn => member.is_marked(),
                ObjectMode::OptOut => member.public || member.is_marked(),
            };
            if !selected {
                continue;
            }
            let Some(accessor) = member.accessor.as_ref() else {
                log::debug!(
                    "[StructuralCodec] {}.{} selected but has no accessor, skipped",
                    shape.type_name,
                    member.ident
                );
                continue;
            };

            let index = slots.index(member.order);
            let name = slots.name(member.wire_name());
            let codec = (accessor.codec)(registry)?;
            let recursive = (accessor.shape)().core == self_id;
            bindings.push(FieldBinding::new(
                index,
                name,
                member.ident,
                codec,
                recursive,
                accessor.get,
                accessor.set,
            ));
        }

        bindings.sort_by_key(|b| b.index);
        let by_name = bindings
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.clone(), i))
            .collect();
        let by_index = bindings
            .iter()
            .enumerate()
            .map(|(i, b)| (b.index, i))
            .collect();

        log::debug!(
            "[StructuralCodec] {} bound {} field(s)",
            shape.type_name,
            bindings.len()
        );

        Ok(Self {
            shape,
            defaults: T::default(),
            bindings,
            by_name,
            by_index,
        })
    }

    /// Bindings in wire-index order.
    pub fn bindings(&self) -> &[FieldBinding<T>] {
        &self.bindings
    }

    pub fn binding_by_name(&self, name: &str) -> Option<&FieldBinding<T>> {
        self.by_name.get(name).map(|&i| &self.bindings[i])
    }

    pub fn binding_by_index(&self, index: u16) -> Option<&FieldBinding<T>> {
        self.by_index.get(&index).map(|&i| &self.bindings[i])
    }

    /// Fail when a self-referential field meets `ReferenceLoopHandling::Error`.
    fn check_reference_loop(&self, cx: &Context<'_>) -> Result<()> {
        if cx.settings().reference_loop_handling != ReferenceLoopHandling::Error
            || !cx.within_depth()
        {
            return Ok(());
        }
        match self.bindings.iter().find(|b| b.recursive) {
            Some(binding) => Err(self.loop_error(binding)),
            None => Ok(()),
        }
    }

    fn loop_error(&self, binding: &FieldBinding<T>) -> Error {
        Error::ReferenceLoop {
            type_name: self.shape.type_name,
            field: binding.ident.to_string(),
        }
    }

    /// Reject records nested deeper than a writer with the same settings emits.
    fn check_decode_depth(&self, r: &ByteReader<'_>, cx: &Context<'_>) -> DecodeResult<()> {
        if cx.depth() > cx.settings().max_depth {
            return Err(DecodeError::malformed(
                r.position(),
                format!(
                    "{} nested deeper than max_depth {}",
                    self.shape.type_name,
                    cx.settings().max_depth
                ),
            ));
        }
        Ok(())
    }

    /// Guard used before decoding a field value.
    fn admit(&self, binding: &FieldBinding<T>, cx: &Context<'_>) -> DecodeResult<()> {
        if binding.recursive
            && cx.settings().reference_loop_handling == ReferenceLoopHandling::Error
        {
            return Err(DecodeError::Fatal(self.loop_error(binding)));
        }
        Ok(())
    }
}

/// What to do with one field on the write side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emit {
    /// No bytes at all.
    Omit,
    /// Header (and cleared presence flag), no payload.
    Absent,
    /// Header, presence flag when enabled, payload.
    Value,
}

fn classify<T>(binding: &FieldBinding<T>, value: &T, cx: &Context<'_>) -> Emit {
    let settings = cx.settings();
    let v = binding.value(value);
    let is_null = binding.codec.is_null(v);
    let is_default = !is_null && binding.codec.is_default(v);
    let write_null = settings.null_value_handling == NullValueHandling::DefaultValue;
    let write_default = settings.default_value_handling == DefaultValueHandling::Serialize;

    if (is_null && !write_null) || (is_default && !write_default) {
        Emit::Omit
    } else if is_null || is_default {
        Emit::Absent
    } else {
        Emit::Value
    }
}

impl<T: Composite> ValueCodec for StructuralCodec<T> {
    type Value = T;

    fn value_shape(&self) -> &Shape {
        &self.shape
    }

    fn is_default_value(&self, value: &T) -> bool {
        self.eq_values(value, &self.defaults)
    }

    fn eq_values(&self, a: &T, b: &T) -> bool {
        self.bindings
            .iter()
            .all(|binding| binding.codec.values_equal(binding.value(a), binding.value(b)))
    }

    fn encode_binary(&self, value: &T, w: &mut ByteWriter, cx: &Context<'_>) -> Result<()> {
        if cx.settings().convert_behaviour == ConvertBehaviour::Configuration {
            return Err(Error::InvalidSettings(
                "ConvertBehaviour::Configuration requires Formatting::Text".into(),
            ));
        }
        self.check_reference_loop(cx)?;
        self.write_record_binary(value, w, cx)
    }

    fn decode_binary(&self, r: &mut ByteReader<'_>, cx: &Context<'_>) -> DecodeResult<T> {
        if cx.settings().convert_behaviour == ConvertBehaviour::Configuration {
            return Err(DecodeError::Fatal(Error::InvalidSettings(
                "ConvertBehaviour::Configuration requires Formatting::Text".into(),
            )));
        }
        self.read_record_binary(r, cx)
    }

    fn encode_text(&self, value: &T, w: &mut ByteWriter, cx: &Context<'_>) -> Result<()> {
        self.check_reference_loop(cx)?;
        self.write_record_text(value, w, cx)
    }

    fn decode_text(&self, r: &mut ByteReader<'_>, cx: &Context<'_>) -> DecodeResult<T> {
        self.read_record_text(r, cx)
    }
}

impl<T: Composite> std::fmt::Debug for StructuralCodec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuralCodec")
            .field("type_name", &self.shape.type_name)
            .field("bindings", &self.bindings)
            .finish()
    }
}
