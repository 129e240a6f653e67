// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary records and the resilient record decoder.
//!
//! # Recovery
//!
//! ```text
//! Order          index -> binding ------------------------------> next field
//!                   \-- unknown / malformed -> resync
//!
//! NameAndOrder   name -> binding  (tier 1) ---------------------> next field
//!                   \-- index -> binding  (tier 2) -------------> next field
//!                          \-- resync  (tier 3)
//! ```
//!
//! Resync starts where the first failed attempt stopped reading, so bytes
//! inside a declared extent (a length prefix and its payload) are never taken
//! for markers. With no failed attempt, or a prefix that was not trusted, it
//! starts just after the field index. It then scans for the next field marker
//! that names a known binding, or for this record's break marker, stepping
//! over nested `{ ... }` records so their markers are not mistaken for ours.
//! Truncation ends the record with whatever was decoded so far.

use super::{classify, Emit, FieldBinding, StructuralCodec};
use crate::codec::Context;
use crate::config::{
    BEGIN_RECORD, BREAK_MARKER, FIELD_MARKER, MAX_FIELD_NAME_LEN, NAME_TERMINATOR,
};
use crate::error::{DecodeError, DecodeResult, Result};
use crate::reflect::Composite;
use crate::ser::{ByteReader, ByteWriter};
use crate::settings::ConvertBehaviour;

/// Record loop continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Next,
    Stop,
}

/// Result of decoding one field value with one binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Decoded,
    Truncated,
    /// Malformed; carries the offset the failed read stopped at.
    Failed(usize),
}

impl<T: Composite> StructuralCodec<T> {
    pub(super) fn write_record_binary(
        &self,
        value: &T,
        w: &mut ByteWriter,
        cx: &Context<'_>,
    ) -> Result<()> {
        if !cx.is_root() {
            w.write_u8(BEGIN_RECORD);
        }

        if cx.within_depth() {
            let named = cx.settings().convert_behaviour == ConvertBehaviour::NameAndOrder;
            let presence = cx.settings().writes_presence_flag();
            let field_cx = cx.descend();

            for binding in &self.bindings {
                let emit = classify(binding, value, cx);
                if emit == Emit::Omit {
                    continue;
                }
                w.write_u8(FIELD_MARKER);
                w.write_u16_le(binding.index);
                if named {
                    w.write_str(&binding.name)?;
                    w.write_u8(NAME_TERMINATOR);
                }
                if presence {
                    w.write_bool(emit == Emit::Value);
                }
                if emit == Emit::Value {
                    binding
                        .codec
                        .write_binary(binding.value(value), w, &field_cx)?;
                }
            }
        }

        w.write_u8(BREAK_MARKER);
        Ok(())
    }

    pub(super) fn read_record_binary(
        &self,
        r: &mut ByteReader<'_>,
        cx: &Context<'_>,
    ) -> DecodeResult<T> {
        if !cx.is_root() {
            self.check_decode_depth(r, cx)?;
            r.expect(BEGIN_RECORD)?;
        }

        let named = cx.settings().convert_behaviour == ConvertBehaviour::NameAndOrder;
        let field_cx = cx.descend();
        let mut out = T::default();

        loop {
            match r.peek_u8() {
                None => {
                    log::trace!(
                        "[StructuralCodec] {}: end of stream before break marker",
                        self.shape.type_name
                    );
                    break;
                }
                Some(BREAK_MARKER) => {
                    r.eat(BREAK_MARKER);
                    break;
                }
                Some(FIELD_MARKER) => {}
                Some(_) => {
                    if !self.resync(r, named) {
                        break;
                    }
                    continue;
                }
            }

            let flow = if named {
                self.read_named_field(r, &mut out, &field_cx)?
            } else {
                self.read_ordered_field(r, &mut out, &field_cx)?
            };
            if flow == Flow::Stop {
                break;
            }
        }

        Ok(out)
    }

    fn read_ordered_field(
        &self,
        r: &mut ByteReader<'_>,
        out: &mut T,
        cx: &Context<'_>,
    ) -> DecodeResult<Flow> {
        r.eat(FIELD_MARKER);
        let Ok(index) = r.read_u16_le() else {
            return Ok(Flow::Stop);
        };
        let after_index = r.position();
        let mut resume = after_index;

        match self.binding_by_index(index) {
            Some(binding) => match self.attempt(binding, out, r, cx)? {
                Attempt::Decoded => return Ok(Flow::Next),
                Attempt::Truncated => return Ok(Flow::Stop),
                Attempt::Failed(end) => resume = end.max(after_index),
            },
            None => log::trace!(
                "[StructuralCodec] {}: unknown field index {}",
                self.shape.type_name,
                index
            ),
        }

        r.set_position(resume);
        Ok(self.resync_flow(r, false))
    }

    fn read_named_field(
        &self,
        r: &mut ByteReader<'_>,
        out: &mut T,
        cx: &Context<'_>,
    ) -> DecodeResult<Flow> {
        r.eat(FIELD_MARKER);
        let Ok(index) = r.read_u16_le() else {
            return Ok(Flow::Stop);
        };
        let after_index = r.position();

        // Tier 1: match by name.
        let header = try_read_name(r);
        let mut tried = None;
        let mut resume = None;
        if let Some((name, _)) = &header {
            if let Some(binding) = self.binding_by_name(name) {
                if r.eat(NAME_TERMINATOR) {
                    tried = Some(binding.index);
                    match self.attempt(binding, out, r, cx)? {
                        Attempt::Decoded => return Ok(Flow::Next),
                        Attempt::Truncated => return Ok(Flow::Stop),
                        Attempt::Failed(end) => resume = Some(end),
                    }
                }
            }
        }

        // Tier 2: fall back to the declared index.
        r.set_position(after_index);
        let terminated = match &header {
            Some((_, end)) => {
                r.set_position(*end);
                r.eat(NAME_TERMINATOR) || r.skip_past(NAME_TERMINATOR)
            }
            None => r.skip_past(NAME_TERMINATOR),
        };
        if terminated {
            if let Some(binding) = self.binding_by_index(index) {
                if tried != Some(binding.index) {
                    log::trace!(
                        "[StructuralCodec] {}: field {} resolved by index",
                        self.shape.type_name,
                        index
                    );
                    match self.attempt(binding, out, r, cx)? {
                        Attempt::Decoded => return Ok(Flow::Next),
                        Attempt::Truncated => return Ok(Flow::Stop),
                        Attempt::Failed(end) => {
                            resume.get_or_insert(end);
                        }
                    }
                }
            }
        }

        // Tier 3: discard the field.
        r.set_position(resume.map_or(after_index, |end| end.max(after_index)));
        Ok(self.resync_flow(r, true))
    }

    /// Decode one value into `out`, classifying the failure.
    fn attempt(
        &self,
        binding: &FieldBinding<T>,
        out: &mut T,
        r: &mut ByteReader<'_>,
        cx: &Context<'_>,
    ) -> DecodeResult<Attempt> {
        match self.read_field_value(binding, out, r, cx) {
            Ok(()) => Ok(Attempt::Decoded),
            Err(DecodeError::Truncated { offset }) => {
                log::trace!(
                    "[StructuralCodec] {}.{} truncated at {}",
                    self.shape.type_name,
                    binding.name,
                    offset
                );
                Ok(Attempt::Truncated)
            }
            Err(DecodeError::Malformed { offset, reason }) => {
                log::trace!(
                    "[StructuralCodec] {}.{} malformed at {}: {}",
                    self.shape.type_name,
                    binding.name,
                    offset,
                    reason
                );
                Ok(Attempt::Failed(r.position()))
            }
            Err(fatal) => Err(fatal),
        }
    }

    fn read_field_value(
        &self,
        binding: &FieldBinding<T>,
        out: &mut T,
        r: &mut ByteReader<'_>,
        cx: &Context<'_>,
    ) -> DecodeResult<()> {
        self.admit(binding, cx)?;
        if cx.settings().writes_presence_flag() && !r.read_bool()? {
            return Ok(());
        }
        let value = binding.codec.read_binary(r, cx)?;
        binding.assign(out, value)
    }

    fn resync_flow(&self, r: &mut ByteReader<'_>, named: bool) -> Flow {
        if self.resync(r, named) {
            Flow::Next
        } else {
            Flow::Stop
        }
    }

    /// Scan to the next plausible field marker (true) or past this record's
    /// break marker (false). False as well when the stream runs out.
    fn resync(&self, r: &mut ByteReader<'_>, named: bool) -> bool {
        let start = r.position();
        let mut depth = 0usize;
        while let Some(b) = r.peek_u8() {
            match b {
                BEGIN_RECORD if matches!(r.peek_at(1), Some(FIELD_MARKER | BREAK_MARKER)) => {
                    depth += 1;
                }
                BREAK_MARKER if depth == 0 => {
                    r.eat(BREAK_MARKER);
                    log::trace!(
                        "[StructuralCodec] {}: discarded {} byte(s) up to break marker",
                        self.shape.type_name,
                        r.position() - start - 1
                    );
                    return false;
                }
                BREAK_MARKER => depth -= 1,
                FIELD_MARKER if depth == 0 && self.plausible_field(r, named) => {
                    log::trace!(
                        "[StructuralCodec] {}: resynced after {} byte(s)",
                        self.shape.type_name,
                        r.position() - start
                    );
                    return true;
                }
                _ => {}
            }
            r.set_position(r.position() + 1);
        }
        log::warn!(
            "[StructuralCodec] {}: record abandoned, no marker found after offset {}",
            self.shape.type_name,
            start
        );
        false
    }

    /// The field marker under the cursor introduces a known index or name.
    fn plausible_field(&self, r: &ByteReader<'_>, named: bool) -> bool {
        let (Some(lo), Some(hi)) = (r.peek_at(1), r.peek_at(2)) else {
            return false;
        };
        if self.by_index.contains_key(&u16::from_le_bytes([lo, hi])) {
            return true;
        }
        if !named {
            return false;
        }
        let mut ahead = r.clone();
        ahead.set_position(r.position() + 3);
        match try_read_name(&mut ahead) {
            Some((name, _)) => {
                self.by_name.contains_key(&name) && ahead.peek_u8() == Some(NAME_TERMINATOR)
            }
            None => false,
        }
    }
}

/// Read a length-prefixed field name if one is structurally present.
///
/// On success the cursor sits just past the name and the end offset is
/// returned alongside it.
fn try_read_name(r: &mut ByteReader<'_>) -> Option<(String, usize)> {
    let start = r.position();
    let len = r.read_u32_le().ok()? as usize;
    if len == 0 || len > MAX_FIELD_NAME_LEN || len > r.remaining() {
        r.set_position(start);
        return None;
    }
    let name = r
        .read_bytes(len)
        .ok()
        .and_then(|bytes| std::str::from_utf8(bytes).ok())
        .map(str::to_string);
    match name {
        Some(name) => Some((name, r.position())),
        None => {
            r.set_position(start);
            None
        }
    }
}
