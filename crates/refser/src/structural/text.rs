// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Text records.
//!
//! ```text
//! (0)"id": 4
//! (1)"child": {
//!   (0)"id": 5
//!   (1)"tags": ["a", "b"]
//! }
//! ```
//!
//! `Configuration` drops the `(index)` prefix. On decode each field header is
//! matched against the bindings (name first, then index, as the convert
//! behaviour allows); a field no binding can read is skipped to the end of
//! its line.

use super::{classify, Emit, FieldBinding, StructuralCodec};
use crate::codec::Context;
use crate::config::{
    TEXT_BEGIN_META, TEXT_BEGIN_OBJECT, TEXT_END_META, TEXT_END_OBJECT, TEXT_NEW_LINE,
    TEXT_QUOTE, TEXT_VALUE_SEPARATOR,
};
use crate::error::{DecodeError, DecodeResult, Result};
use crate::reflect::Composite;
use crate::ser::{ByteReader, ByteWriter};
use crate::settings::ConvertBehaviour;

/// Header of one text field line.
#[derive(Debug, Default)]
struct Header {
    index: Option<u16>,
    name: Option<String>,
}

impl<T: Composite> StructuralCodec<T> {
    pub(super) fn write_record_text(
        &self,
        value: &T,
        w: &mut ByteWriter,
        cx: &Context<'_>,
    ) -> Result<()> {
        let root = cx.is_root();
        if !root {
            w.write_u8(TEXT_BEGIN_OBJECT);
            w.write_u8(TEXT_NEW_LINE);
        }

        if cx.within_depth() {
            let with_index = cx.settings().convert_behaviour != ConvertBehaviour::Configuration;
            let field_cx = cx.descend();
            for binding in &self.bindings {
                if classify(binding, value, cx) == Emit::Omit {
                    continue;
                }
                w.write_indent(cx.depth().saturating_sub(1));
                if with_index {
                    w.write_u8(TEXT_BEGIN_META);
                    w.write_display(&binding.index);
                    w.write_u8(TEXT_END_META);
                }
                w.write_quoted(&binding.name);
                w.write_u8(TEXT_VALUE_SEPARATOR);
                w.write_u8(b' ');
                binding
                    .codec
                    .write_text(binding.value(value), w, &field_cx)?;
                w.write_u8(TEXT_NEW_LINE);
            }
        }

        if !root {
            w.write_indent(cx.depth().saturating_sub(2));
            w.write_u8(TEXT_END_OBJECT);
        }
        Ok(())
    }

    pub(super) fn read_record_text(
        &self,
        r: &mut ByteReader<'_>,
        cx: &Context<'_>,
    ) -> DecodeResult<T> {
        let root = cx.is_root();
        if !root {
            self.check_decode_depth(r, cx)?;
            r.skip_whitespace();
            r.expect(TEXT_BEGIN_OBJECT)?;
        }

        let field_cx = cx.descend();
        let mut out = T::default();

        loop {
            r.skip_whitespace();
            match r.peek_u8() {
                None => break,
                Some(TEXT_END_OBJECT) => {
                    r.eat(TEXT_END_OBJECT);
                    if root {
                        // stray closer at the top level
                        continue;
                    }
                    break;
                }
                Some(_) => {}
            }

            let field_start = r.position();
            match self.read_text_field(r, &mut out, &field_cx) {
                Ok(()) => {}
                Err(DecodeError::Truncated { .. }) => break,
                Err(DecodeError::Malformed { offset, reason }) => {
                    log::trace!(
                        "[StructuralCodec] {}: skipping text field at {} ({} at {})",
                        self.shape.type_name,
                        field_start,
                        reason,
                        offset
                    );
                    r.set_position(field_start);
                    if !r.skip_text_field() {
                        break;
                    }
                }
                Err(fatal) => return Err(fatal),
            }
        }

        Ok(out)
    }

    fn read_text_field(
        &self,
        r: &mut ByteReader<'_>,
        out: &mut T,
        cx: &Context<'_>,
    ) -> DecodeResult<()> {
        let header = read_header(r)?;
        let value_start = r.position();

        let mut candidates: Vec<&FieldBinding<T>> = Vec::with_capacity(2);
        let by_name = header.name.as_deref().and_then(|n| self.binding_by_name(n));
        let by_index = header.index.and_then(|i| self.binding_by_index(i));
        match cx.settings().convert_behaviour {
            ConvertBehaviour::Order => candidates.extend(by_index),
            ConvertBehaviour::NameAndOrder => {
                candidates.extend(by_name);
                if let Some(b) = by_index {
                    if !candidates.iter().any(|c| c.index == b.index) {
                        candidates.push(b);
                    }
                }
            }
            ConvertBehaviour::Configuration => candidates.extend(by_name),
        }

        let mut last = DecodeError::malformed(
            value_start,
            format!(
                "no binding for field {:?}/{:?}",
                header.index, header.name
            ),
        );
        for binding in candidates {
            r.set_position(value_start);
            self.admit(binding, cx)?;
            let decoded = binding
                .codec
                .read_text(r, cx)
                .and_then(|value| binding.assign(out, value));
            match decoded {
                Ok(()) => return Ok(()),
                Err(e @ DecodeError::Malformed { .. }) => {
                    log::trace!(
                        "[StructuralCodec] {}.{} rejected text value: {}",
                        self.shape.type_name,
                        binding.name,
                        e
                    );
                    last = e;
                }
                Err(e) => return Err(e),
            }
        }
        Err(last)
    }
}

/// `[(index)]["name"] :`
fn read_header(r: &mut ByteReader<'_>) -> DecodeResult<Header> {
    let mut header = Header::default();
    if r.eat(TEXT_BEGIN_META) {
        let at = r.position();
        let token = r.read_token()?;
        let index = token
            .parse::<u16>()
            .map_err(|_| DecodeError::malformed(at, format!("invalid field index '{}'", token)))?;
        header.index = Some(index);
        r.expect(TEXT_END_META)?;
        r.skip_whitespace();
    }
    if r.peek_u8() == Some(TEXT_QUOTE) {
        header.name = Some(r.read_quoted()?);
        r.skip_whitespace();
    }
    r.expect(TEXT_VALUE_SEPARATOR)?;
    Ok(header)
}
