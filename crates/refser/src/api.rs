// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Public serialize/deserialize entry points.
//!
//! Each call validates its [`Settings`], resolves the root codec from
//! `settings.resolver` and runs it over a pooled writer or a borrowed reader.
//! Field-level decode faults never escape; only the conditions listed on
//! [`Error`] do.

use crate::codec::{Codec, Context};
use crate::error::{Error, Result};
use crate::reflect::{DynReflect, Reflect};
use crate::ser::{ByteReader, ByteWriter};
use crate::settings::{Formatting, Settings};
use std::any::Any;
use std::sync::Arc;

/// Serialize `value` with `settings`.
pub fn serialize<T: Reflect>(value: &T, settings: &Settings) -> Result<Vec<u8>> {
    settings.validate()?;
    let codec = settings.resolver.get::<T>()?;
    encode(codec, value, settings)
}

/// Serialize a value known only through its object-safe view.
pub fn serialize_object(value: &dyn DynReflect, settings: &Settings) -> Result<Vec<u8>> {
    settings.validate()?;
    let codec = value.resolve_codec(&settings.resolver)?;
    encode(codec, value.as_any(), settings)
}

/// Serialize to text regardless of `settings.formatting`.
pub fn serialize_to_string<T: Reflect>(value: &T, settings: &Settings) -> Result<String> {
    let settings = settings.clone().with_formatting(Formatting::Text);
    let bytes = serialize(value, &settings)?;
    String::from_utf8(bytes).map_err(|e| Error::Decode {
        offset: e.utf8_error().valid_up_to(),
        reason: "text output is not valid UTF-8".into(),
    })
}

/// Deserialize a `T` from `bytes`.
///
/// Unknown, damaged or truncated fields are skipped; the returned value holds
/// defaults for anything that could not be read.
pub fn deserialize<T: Reflect>(bytes: &[u8], settings: &Settings) -> Result<T> {
    settings.validate()?;
    let codec = settings.resolver.get::<T>()?;
    let mut r = ByteReader::new(bytes);
    let value = codec
        .read(&mut r, &Context::new(settings))
        .map_err(|e| e.into_error())?;
    value
        .downcast::<T>()
        .map(|v| *v)
        .map_err(|_| Error::TypeMismatch {
            expected: std::any::type_name::<T>(),
        })
}

/// Deserialize a `T` from text regardless of `settings.formatting`.
pub fn deserialize_str<T: Reflect>(text: &str, settings: &Settings) -> Result<T> {
    let settings = settings.clone().with_formatting(Formatting::Text);
    deserialize(text.as_bytes(), &settings)
}

/// [`serialize`] with `Settings::default()`.
pub fn to_bytes<T: Reflect>(value: &T) -> Result<Vec<u8>> {
    serialize(value, &Settings::default())
}

/// [`deserialize`] with `Settings::default()`.
pub fn from_bytes<T: Reflect>(bytes: &[u8]) -> Result<T> {
    deserialize(bytes, &Settings::default())
}

fn encode(codec: Arc<dyn Codec>, value: &dyn Any, settings: &Settings) -> Result<Vec<u8>> {
    let mut w = ByteWriter::pooled();
    codec.write(value, &mut w, &Context::new(settings))?;
    Ok(w.to_vec())
}
