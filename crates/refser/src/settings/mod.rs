// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-call serializer settings.
//!
//! Every public call takes a [`Settings`]. The defaults produce compact binary
//! output, omit null and default fields, decode by declared order and cut
//! records off at depth 10.
//!
//! # Example
//!
//! ```rust
//! use refser::{ConvertBehaviour, Formatting, Settings};
//!
//! let settings = Settings::default()
//!     .with_convert_behaviour(ConvertBehaviour::NameAndOrder)
//!     .with_max_depth(4);
//! assert!(settings.validate().is_ok());
//!
//! let bad = Settings::default().with_convert_behaviour(ConvertBehaviour::Configuration);
//! assert!(bad.validate().is_err());
//! ```

#[cfg(feature = "settings-loaders")]
pub mod loader;

#[cfg(feature = "settings-loaders")]
pub use loader::{SettingsDocument, SettingsLoader, SettingsProfile};

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{Error, Result};
use crate::registry::CodecRegistry;
use std::fmt;
use std::sync::Arc;

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Formatting {
    /// Compact tagged binary records.
    #[default]
    Binary,
    /// Human-readable records, one field per line.
    Text,
}

/// How null (absent nullable) field values are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullValueHandling {
    /// Null fields are omitted entirely.
    #[default]
    Ignore,
    /// Null fields are written with a cleared presence flag.
    DefaultValue,
}

/// How fields holding their type's default value are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultValueHandling {
    /// Default-valued fields are omitted entirely.
    #[default]
    Ignore,
    /// Default-valued fields are written (with a presence flag).
    Serialize,
}

/// Field identification on the wire, and therefore the decode algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvertBehaviour {
    /// Index only. Fast, expects matching schemas.
    #[default]
    Order,
    /// Index and name. Tolerates renamed and reordered fields.
    NameAndOrder,
    /// Name only, for hand-authored text. Not valid with binary formatting.
    Configuration,
}

/// Policy for directly self-referential fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceLoopHandling {
    /// Recursion is bounded by `max_depth` only.
    #[default]
    Ignore,
    /// Any self-referential field fails the call.
    Error,
}

/// Settings recognised by every serialize/deserialize call.
#[derive(Clone)]
pub struct Settings {
    pub formatting: Formatting,
    pub null_value_handling: NullValueHandling,
    pub default_value_handling: DefaultValueHandling,
    pub convert_behaviour: ConvertBehaviour,
    pub reference_loop_handling: ReferenceLoopHandling,
    /// Records at this depth or deeper are written without fields.
    pub max_depth: u32,
    /// Registry used to resolve codecs.
    pub resolver: Arc<CodecRegistry>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            formatting: Formatting::Binary,
            null_value_handling: NullValueHandling::Ignore,
            default_value_handling: DefaultValueHandling::Ignore,
            convert_behaviour: ConvertBehaviour::Order,
            reference_loop_handling: ReferenceLoopHandling::Ignore,
            max_depth: DEFAULT_MAX_DEPTH,
            resolver: CodecRegistry::global(),
        }
    }
}

impl Settings {
    /// Compact binary preset (same as `default()`).
    pub fn binary() -> Self {
        Self::default()
    }

    /// Readable text preset with names and indices.
    pub fn text() -> Self {
        Self::default()
            .with_formatting(Formatting::Text)
            .with_convert_behaviour(ConvertBehaviour::NameAndOrder)
    }

    /// Binary preset that survives schema drift between versions.
    pub fn resilient() -> Self {
        Self::default().with_convert_behaviour(ConvertBehaviour::NameAndOrder)
    }

    #[must_use]
    pub fn with_formatting(mut self, formatting: Formatting) -> Self {
        self.formatting = formatting;
        self
    }

    #[must_use]
    pub fn with_null_value_handling(mut self, handling: NullValueHandling) -> Self {
        self.null_value_handling = handling;
        self
    }

    #[must_use]
    pub fn with_default_value_handling(mut self, handling: DefaultValueHandling) -> Self {
        self.default_value_handling = handling;
        self
    }

    #[must_use]
    pub fn with_convert_behaviour(mut self, behaviour: ConvertBehaviour) -> Self {
        self.convert_behaviour = behaviour;
        self
    }

    #[must_use]
    pub fn with_reference_loop_handling(mut self, handling: ReferenceLoopHandling) -> Self {
        self.reference_loop_handling = handling;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<CodecRegistry>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Whether a field record carries a presence flag before its payload.
    pub fn writes_presence_flag(&self) -> bool {
        self.null_value_handling == NullValueHandling::DefaultValue
            || self.default_value_handling == DefaultValueHandling::Serialize
    }

    /// Reject combinations that cannot be honoured.
    pub fn validate(&self) -> Result<()> {
        if self.formatting == Formatting::Binary
            && self.convert_behaviour == ConvertBehaviour::Configuration
        {
            return Err(Error::InvalidSettings(
                "ConvertBehaviour::Configuration requires Formatting::Text".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("formatting", &self.formatting)
            .field("null_value_handling", &self.null_value_handling)
            .field("default_value_handling", &self.default_value_handling)
            .field("convert_behaviour", &self.convert_behaviour)
            .field("reference_loop_handling", &self.reference_loop_handling)
            .field("max_depth", &self.max_depth)
            .field("resolver", &Arc::as_ptr(&self.resolver))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.formatting, Formatting::Binary);
        assert_eq!(s.null_value_handling, NullValueHandling::Ignore);
        assert_eq!(s.default_value_handling, DefaultValueHandling::Ignore);
        assert_eq!(s.convert_behaviour, ConvertBehaviour::Order);
        assert_eq!(s.reference_loop_handling, ReferenceLoopHandling::Ignore);
        assert_eq!(s.max_depth, 10);
        assert!(Arc::ptr_eq(&s.resolver, &CodecRegistry::global()));
        assert!(!s.writes_presence_flag());
    }

    #[test]
    fn test_presence_flag_rules() {
        let s = Settings::default().with_null_value_handling(NullValueHandling::DefaultValue);
        assert!(s.writes_presence_flag());
        let s = Settings::default().with_default_value_handling(DefaultValueHandling::Serialize);
        assert!(s.writes_presence_flag());
    }

    #[test]
    fn test_binary_configuration_rejected() {
        let s = Settings::binary().with_convert_behaviour(ConvertBehaviour::Configuration);
        assert!(matches!(s.validate(), Err(Error::InvalidSettings(_))));

        let s = s.with_formatting(Formatting::Text);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert_eq!(Settings::text().formatting, Formatting::Text);
        assert_eq!(
            Settings::resilient().convert_behaviour,
            ConvertBehaviour::NameAndOrder
        );
    }
}
