// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire constants and engine limits - single source of truth.
//!
//! Every marker byte, text token and default limit used by the codecs lives
//! here. **Never hardcode a marker elsewhere**: the resilient decoder scans for
//! these exact values when it resynchronises after a corrupted field.
//!
//! # Binary record layout
//!
//! ```text
//! [ '{' ]                                  nested records only
//! '(' index:u16 [ len:u32 name ':' ] [ present:u8 ] payload    per field
//! '}'                                      always, one per record
//! ```

// =======================================================================
// Binary markers
// =======================================================================

/// Precedes every field record (`(`).
pub const FIELD_MARKER: u8 = b'(';

/// Terminates a record (`}`); written once per structural invocation.
pub const BREAK_MARKER: u8 = b'}';

/// Opens a nested record (`{`); the root record carries no opener.
pub const BEGIN_RECORD: u8 = b'{';

/// Follows the field name in name-aware mode (`:`).
pub const NAME_TERMINATOR: u8 = b':';

// =======================================================================
// Text tokens
// =======================================================================

pub const TEXT_BEGIN_OBJECT: u8 = b'{';
pub const TEXT_END_OBJECT: u8 = b'}';
pub const TEXT_BEGIN_ARRAY: u8 = b'[';
pub const TEXT_END_ARRAY: u8 = b']';
pub const TEXT_ELEMENT_SEPARATOR: u8 = b',';
pub const TEXT_QUOTE: u8 = b'"';
pub const TEXT_VALUE_SEPARATOR: u8 = b':';
pub const TEXT_BEGIN_META: u8 = b'(';
pub const TEXT_END_META: u8 = b')';
pub const TEXT_ESCAPE: u8 = b'\\';
pub const TEXT_NEW_LINE: u8 = b'\n';

/// Indentation unit for nested text records (two spaces).
pub const TEXT_INDENT: &[u8] = b"  ";

pub const TEXT_NULL: &[u8] = b"null";
pub const TEXT_TRUE: &[u8] = b"true";
pub const TEXT_FALSE: &[u8] = b"false";

// =======================================================================
// Limits and defaults
// =======================================================================

/// Default maximum record nesting written before fields are cut off.
pub const DEFAULT_MAX_DEPTH: u32 = 10;

/// Longest field name accepted while probing for a name in a damaged stream.
///
/// Field names are identifiers; anything longer is treated as garbage.
pub const MAX_FIELD_NAME_LEN: usize = 1024;

/// Initial capacity of a fresh writer buffer.
pub const WRITER_INITIAL_CAPACITY: usize = 512;

/// Number of idle buffers kept by the shared pool.
pub const POOL_CAPACITY: usize = 32;

/// Buffers grown beyond this size are dropped instead of pooled.
pub const POOL_MAX_RETAINED_BYTES: usize = 1 << 20;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_are_distinct() {
        let markers = [FIELD_MARKER, BREAK_MARKER, BEGIN_RECORD, NAME_TERMINATOR];
        for (i, a) in markers.iter().enumerate() {
            for b in &markers[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_pool_limits_are_sane() {
        assert!(WRITER_INITIAL_CAPACITY < POOL_MAX_RETAINED_BYTES);
        assert!(POOL_CAPACITY > 0);
    }
}
