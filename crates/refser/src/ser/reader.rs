// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked input cursor for both encodings.
//!
//! Every read reports `DecodeError::Truncated` when it runs past the end and
//! `DecodeError::Malformed` when the bytes are present but invalid, so the
//! record decoder can tell "stop here" from "skip this field".

use crate::config::{
    TEXT_BEGIN_ARRAY, TEXT_BEGIN_OBJECT, TEXT_END_ARRAY, TEXT_END_OBJECT, TEXT_ESCAPE,
    TEXT_NEW_LINE, TEXT_QUOTE,
};
use crate::error::{DecodeError, DecodeResult};

/// Generate little-endian read methods for primitive types
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> DecodeResult<$type> {
            let bytes = self.read_array::<$size>()?;
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Read cursor over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Seek to an absolute offset (clamped to the end of the buffer).
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.buf.len());
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn truncated(&self) -> DecodeError {
        DecodeError::Truncated { offset: self.pos }
    }

    pub fn peek_u8(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    pub fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.buf.get(self.pos + ahead).copied()
    }

    pub fn read_bytes(&mut self, len: usize) -> DecodeResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.truncated());
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(self.read_bytes(N)?);
        Ok(bytes)
    }

    // ------------------------------------------------------------------
    // Binary primitives
    // ------------------------------------------------------------------

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        let b = self.peek_u8().ok_or_else(|| self.truncated())?;
        self.pos += 1;
        Ok(b)
    }

    /// Strict boolean: only `0` and `1` are accepted.
    pub fn read_bool(&mut self) -> DecodeResult<bool> {
        let offset = self.pos;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::malformed(
                offset,
                format!("invalid boolean byte 0x{:02x}", other),
            )),
        }
    }

    impl_read_le!(read_i8, i8, 1);
    impl_read_le!(read_u16_le, u16, 2);
    impl_read_le!(read_i16_le, i16, 2);
    impl_read_le!(read_u32_le, u32, 4);
    impl_read_le!(read_i32_le, i32, 4);
    impl_read_le!(read_u64_le, u64, 8);
    impl_read_le!(read_i64_le, i64, 8);
    impl_read_le!(read_f32_le, f32, 4);
    impl_read_le!(read_f64_le, f64, 8);

    /// `len:u32` followed by that many bytes.
    ///
    /// A length larger than the rest of the buffer is reported as malformed:
    /// it is far more often a damaged prefix than a short stream. The cursor
    /// is left on the prefix so callers do not trust its extent.
    pub fn read_len_prefixed(&mut self) -> DecodeResult<&'a [u8]> {
        let offset = self.pos;
        let len = self.read_u32_le()? as usize;
        if len > self.remaining() {
            let remaining = self.remaining();
            self.pos = offset;
            return Err(DecodeError::malformed(
                offset,
                format!("length prefix {} exceeds remaining {}", len, remaining),
            ));
        }
        self.read_bytes(len)
    }

    pub fn read_string(&mut self) -> DecodeResult<String> {
        let offset = self.pos;
        let bytes = self.read_len_prefixed()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| DecodeError::malformed(offset, "string is not valid UTF-8"))
    }

    /// Offset of the next `byte` at or after the cursor, without moving.
    pub fn scan_to(&self, byte: u8) -> Option<usize> {
        self.buf[self.pos.min(self.buf.len())..]
            .iter()
            .position(|&b| b == byte)
            .map(|i| self.pos + i)
    }

    /// Advance just past the next `byte`; false (cursor at end) if absent.
    pub fn skip_past(&mut self, byte: u8) -> bool {
        match self.scan_to(byte) {
            Some(at) => {
                self.pos = at + 1;
                true
            }
            None => {
                self.pos = self.buf.len();
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Text primitives
    // ------------------------------------------------------------------

    pub fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\r' | b'\n') = self.peek_u8() {
            self.pos += 1;
        }
    }

    /// Consume `byte` if it is next.
    pub fn eat(&mut self, byte: u8) -> bool {
        if self.peek_u8() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, byte: u8) -> DecodeResult<()> {
        match self.peek_u8() {
            None => Err(self.truncated()),
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(DecodeError::malformed(
                self.pos,
                format!("expected '{}', found '{}'", byte as char, b as char),
            )),
        }
    }

    pub fn starts_with(&self, token: &[u8]) -> bool {
        self.buf[self.pos.min(self.buf.len())..].starts_with(token)
    }

    /// Consume `token` if the input continues with it.
    pub fn eat_token(&mut self, token: &[u8]) -> bool {
        if self.starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    /// Bare token (number, `true`, `null`...) up to the next delimiter.
    pub fn read_token(&mut self) -> DecodeResult<&'a str> {
        let start = self.pos;
        while let Some(b) = self.peek_u8() {
            if is_delimiter(b) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return match self.peek_u8() {
                None => Err(self.truncated()),
                Some(b) => Err(DecodeError::malformed(
                    start,
                    format!("expected a value, found '{}'", b as char),
                )),
            };
        }
        std::str::from_utf8(&self.buf[start..self.pos])
            .map_err(|_| DecodeError::malformed(start, "token is not valid UTF-8"))
    }

    /// Quote-delimited string, resolving escapes.
    pub fn read_quoted(&mut self) -> DecodeResult<String> {
        let start = self.pos;
        self.expect(TEXT_QUOTE)?;
        let mut out = Vec::new();
        loop {
            let b = self.read_u8()?;
            match b {
                TEXT_QUOTE => break,
                TEXT_ESCAPE => {
                    let at = self.pos;
                    out.push(match self.read_u8()? {
                        b'n' => b'\n',
                        b'r' => b'\r',
                        b't' => b'\t',
                        b'"' => b'"',
                        b'\\' => b'\\',
                        other => {
                            return Err(DecodeError::malformed(
                                at,
                                format!("unknown escape '\\{}'", other as char),
                            ))
                        }
                    });
                }
                _ => out.push(b),
            }
        }
        String::from_utf8(out).map_err(|_| DecodeError::malformed(start, "string is not valid UTF-8"))
    }

    /// Step over a quoted string without decoding it.
    pub fn skip_quoted(&mut self) -> DecodeResult<()> {
        self.expect(TEXT_QUOTE)?;
        loop {
            match self.read_u8()? {
                TEXT_QUOTE => return Ok(()),
                TEXT_ESCAPE => {
                    self.read_u8()?;
                }
                _ => {}
            }
        }
    }

    /// Skip the remainder of a damaged text field.
    ///
    /// Walks to the end of the current line at nesting level 0, stepping over
    /// quoted strings and balanced `{}` / `[]` groups. A `}` at level 0 is left
    /// in place for the record loop. Returns false when the input ran out.
    pub fn skip_text_field(&mut self) -> bool {
        let mut depth = 0usize;
        while let Some(b) = self.peek_u8() {
            match b {
                TEXT_QUOTE => {
                    if self.skip_quoted().is_err() {
                        return false;
                    }
                    continue;
                }
                TEXT_BEGIN_OBJECT | TEXT_BEGIN_ARRAY => depth += 1,
                TEXT_END_OBJECT if depth == 0 => return true,
                TEXT_END_OBJECT | TEXT_END_ARRAY => depth = depth.saturating_sub(1),
                TEXT_NEW_LINE if depth == 0 => {
                    self.pos += 1;
                    return true;
                }
                _ => {}
            }
            self.pos += 1;
        }
        false
    }
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'\t' | b'\r' | b'\n' | b',' | b':' | b'"' | b'(' | b')' | b'[' | b']' | b'{' | b'}'
    )
}
