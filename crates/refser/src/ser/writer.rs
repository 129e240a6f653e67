// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Growable, position-addressable output buffer.

use super::pool::{global_pool, BufferPool};
use crate::config::{
    TEXT_FALSE, TEXT_INDENT, TEXT_NULL, TEXT_QUOTE, TEXT_TRUE, WRITER_INITIAL_CAPACITY,
};
use crate::error::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Generate little-endian write methods for primitive types
macro_rules! impl_write_le {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) {
            self.write_bytes(&value.to_le_bytes());
        }
    };
}

/// Output buffer owned by exactly one serialize call.
///
/// Writes land at the cursor; the buffer grows geometrically when the cursor
/// runs past its capacity. Pooled writers return their storage on drop.
pub struct ByteWriter {
    buf: Vec<u8>,
    pos: usize,
    pool: Option<Arc<BufferPool>>,
}

impl ByteWriter {
    /// Unpooled writer with the default initial capacity.
    pub fn new() -> Self {
        Self::with_capacity(WRITER_INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            pos: 0,
            pool: None,
        }
    }

    /// Writer backed by a buffer borrowed from the shared pool.
    pub fn pooled() -> Self {
        Self::from_pool(global_pool())
    }

    pub fn from_pool(pool: Arc<BufferPool>) -> Self {
        Self {
            buf: pool.acquire(WRITER_INITIAL_CAPACITY),
            pos: 0,
            pool: Some(pool),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor. Seeking past the end zero-fills the gap on next write.
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Bytes written so far (high-water mark, not the cursor).
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Copy of the written bytes; the backing buffer stays with the writer.
    pub fn to_vec(&self) -> Vec<u8> {
        self.buf.clone()
    }

    /// Take the written bytes. A pooled writer gives up its buffer.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.pool = None;
        std::mem::take(&mut self.buf)
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.pos = 0;
    }

    fn ensure(&mut self, end: usize) {
        let cap = self.buf.capacity();
        if end > cap {
            let target = end.max(cap.saturating_mul(2)).max(WRITER_INITIAL_CAPACITY);
            self.buf.reserve_exact(target - self.buf.len());
        }
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        let end = self.pos + data.len();
        self.ensure(end);
        self.buf[self.pos..end].copy_from_slice(data);
        self.pos = end;
    }

    // ------------------------------------------------------------------
    // Binary primitives
    // ------------------------------------------------------------------

    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    impl_write_le!(write_i8, i8);
    impl_write_le!(write_u16_le, u16);
    impl_write_le!(write_i16_le, i16);
    impl_write_le!(write_u32_le, u32);
    impl_write_le!(write_i32_le, i32);
    impl_write_le!(write_u64_le, u64);
    impl_write_le!(write_i64_le, i64);
    impl_write_le!(write_f32_le, f32);
    impl_write_le!(write_f64_le, f64);

    /// `u32` length or element count; anything larger cannot be read back.
    pub fn write_length(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| Error::LengthOverflow { len })?;
        self.write_u32_le(len);
        Ok(())
    }

    /// `len:u32` followed by the raw bytes.
    pub fn write_len_prefixed(&mut self, data: &[u8]) -> Result<()> {
        self.write_length(data.len())?;
        self.write_bytes(data);
        Ok(())
    }

    pub fn write_str(&mut self, value: &str) -> Result<()> {
        self.write_len_prefixed(value.as_bytes())
    }

    // ------------------------------------------------------------------
    // Text primitives
    // ------------------------------------------------------------------

    pub fn write_text_bool(&mut self, value: bool) {
        self.write_bytes(if value { TEXT_TRUE } else { TEXT_FALSE });
    }

    pub fn write_text_null(&mut self) {
        self.write_bytes(TEXT_NULL);
    }

    /// Decimal rendering of a number (shortest round-trip form for floats).
    pub fn write_display<T: fmt::Display>(&mut self, value: &T) {
        // write_str below never fails
        let _ = fmt::Write::write_fmt(self, format_args!("{}", value));
    }

    /// Quote-delimited UTF-8 with `\"`, `\\`, `\n`, `\r`, `\t` escapes.
    pub fn write_quoted(&mut self, value: &str) {
        self.write_u8(TEXT_QUOTE);
        let bytes = value.as_bytes();
        let mut start = 0;
        for (i, &b) in bytes.iter().enumerate() {
            let escaped: &[u8] = match b {
                b'"' => b"\\\"",
                b'\\' => b"\\\\",
                b'\n' => b"\\n",
                b'\r' => b"\\r",
                b'\t' => b"\\t",
                _ => continue,
            };
            self.write_bytes(&bytes[start..i]);
            self.write_bytes(escaped);
            start = i + 1;
        }
        self.write_bytes(&bytes[start..]);
        self.write_u8(TEXT_QUOTE);
    }

    pub fn write_indent(&mut self, level: u32) {
        for _ in 0..level {
            self.write_bytes(TEXT_INDENT);
        }
    }
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for ByteWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_bytes(s.as_bytes());
        Ok(())
    }
}

impl Drop for ByteWriter {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.release(std::mem::take(&mut self.buf));
        }
    }
}

impl fmt::Debug for ByteWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteWriter")
            .field("len", &self.buf.len())
            .field("pos", &self.pos)
            .field("pooled", &self.pool.is_some())
            .finish()
    }
}
