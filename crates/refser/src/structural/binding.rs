// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field bindings and the index/name assignment rules.

use crate::codec::Codec;
use crate::error::{DecodeError, DecodeResult, Error};
use crate::reflect::{GetFn, SetFn};
use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

/// One serializable member of a composite type.
pub struct FieldBinding<T> {
    /// Wire index, unique within the owning codec.
    pub index: u16,
    /// Wire name, unique within the owning codec.
    pub name: String,
    /// Rust identifier of the member.
    pub ident: &'static str,
    pub codec: Arc<dyn Codec>,
    /// Declared type reaches the owning type through `Option`/`Box` only.
    pub recursive: bool,
    get: GetFn<T>,
    set: SetFn<T>,
}

impl<T> FieldBinding<T> {
    pub(crate) fn new(
        index: u16,
        name: String,
        ident: &'static str,
        codec: Arc<dyn Codec>,
        recursive: bool,
        get: GetFn<T>,
        set: SetFn<T>,
    ) -> Self {
        Self {
            index,
            name,
            ident,
            codec,
            recursive,
            get,
            set,
        }
    }

    #[inline]
    pub fn value<'a>(&self, target: &'a T) -> &'a dyn Any {
        (self.get)(target)
    }

    /// Move a decoded value into the member.
    pub fn assign(&self, target: &mut T, value: Box<dyn Any>) -> DecodeResult<()> {
        (self.set)(target, value).map_err(|_| {
            DecodeError::Fatal(Error::TypeMismatch {
                expected: self.codec.shape().type_name,
            })
        })
    }
}

impl<T> std::fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBinding")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("ident", &self.ident)
            .field("type_name", &self.codec.shape().type_name)
            .field("recursive", &self.recursive)
            .finish()
    }
}

/// Hands out unique wire indices and names while a codec is derived.
///
/// Every member advances the running counter by one, including members with
/// an explicit order below it, so an explicit order can leave unused indices
/// behind. Those gaps are part of the wire layout: removing them would shift
/// the indices of existing data.
#[derive(Debug, Default)]
pub(crate) struct SlotAllocator {
    next: u16,
    indices: HashSet<u16>,
    names: HashSet<String>,
}

impl SlotAllocator {
    /// Index for the next member; an explicit order moves the counter past it.
    pub fn index(&mut self, requested: Option<u16>) -> u16 {
        let mut index = requested.unwrap_or(self.next);
        while self.indices.contains(&index) {
            index = index.wrapping_add(1);
        }
        self.indices.insert(index);
        self.next = self.next.wrapping_add(1);
        if index >= self.next {
            self.next = index.wrapping_add(1);
        }
        index
    }

    /// `base`, or `base0`, `base1`, ... when taken.
    pub fn name(&mut self, base: &str) -> String {
        if self.names.insert(base.to_string()) {
            return base.to_string();
        }
        let mut suffix = 0u32;
        loop {
            let candidate = format!("{}{}", base, suffix);
            if self.names.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}
