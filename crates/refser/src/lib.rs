// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # refser - reflection-driven object serialization
//!
//! Converts typed object graphs to and from a compact, self-describing byte
//! stream in either a binary or a readable text encoding. Field layouts come
//! from `#[derive(Reflect)]`; no schema file is involved. Decoding tolerates
//! schema drift (renamed, reordered, added and removed fields) as well as
//! truncated or corrupted input.
//!
//! ## Quick Start
//!
//! ```rust
//! use refser::{deserialize, serialize, Reflect, Settings};
//!
//! #[derive(Reflect, Default, Debug, PartialEq)]
//! #[refser(object)]
//! pub struct Player {
//!     pub name: String,
//!     pub score: u32,
//!     pub inventory: Vec<String>,
//! }
//!
//! fn main() -> refser::Result<()> {
//!     let player = Player {
//!         name: "ada".into(),
//!         score: 1200,
//!         inventory: vec!["lamp".into()],
//!     };
//!     let settings = Settings::resilient();
//!     let bytes = serialize(&player, &settings)?;
//!     let back: Player = deserialize(&bytes, &settings)?;
//!     assert_eq!(back, player);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  api: serialize / serialize_object / deserialize                    |
//! +---------------------------------------------------------------------+
//! |  registry: allow-list, lazy derivation, codec cache                 |
//! +---------------------------------------------------------------------+
//! |  structural: field bindings, record writer, resilient decoder       |
//! |  codec: primitives, Option, Box, Vec, enums, deferred (recursive)   |
//! +---------------------------------------------------------------------+
//! |  ser: ByteReader / ByteWriter over pooled buffers                   |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Settings`] | Per-call formatting, field handling and depth limit |
//! | [`CodecRegistry`] | Allow-list and memoized codecs |
//! | [`StructuralCodec`] | Codec derived from a type's member table |
//! | [`Error`] | Everything a public call can fail with |

// Allow the derive macro to work inside this crate's tests
extern crate self as refser;

/// Public serialize/deserialize entry points.
pub mod api;
/// Codec contract, primitive and container codecs.
pub mod codec;
/// Wire constants and engine limits.
pub mod config;
/// Error types.
pub mod error;
/// Type shapes, the `Reflect` capability and member tables.
pub mod reflect;
/// Codec registry and allow-list.
pub mod registry;
/// Byte-stream reader/writer and buffer pool.
pub mod ser;
/// Per-call settings and the YAML settings loader.
pub mod settings;
/// Structural codec and resilient record decoding.
pub mod structural;

pub use api::{
    deserialize, deserialize_str, from_bytes, serialize, serialize_object, serialize_to_string,
    to_bytes,
};
pub use error::{DecodeError, DecodeResult, Error, Result};
pub use reflect::{
    Composite, DynReflect, Member, ObjectMode, PrimitiveKind, ReflectEnum, Shape, ShapeKind,
};
pub use registry::{CodecRegistry, LookupStats};
pub use ser::{BufferPool, ByteReader, ByteWriter};
pub use settings::{
    ConvertBehaviour, DefaultValueHandling, Formatting, NullValueHandling, ReferenceLoopHandling,
    Settings,
};
pub use structural::{FieldBinding, StructuralCodec};

#[cfg(feature = "settings-loaders")]
pub use settings::{SettingsDocument, SettingsLoader, SettingsProfile};

// Re-export Reflect trait and derive macro
pub use reflect::Reflect; // Trait (for type bounds)
pub use refser_codegen::Reflect; // Derive macro (for #[derive(refser::Reflect)])

/// refser version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
