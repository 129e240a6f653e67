// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML settings profile loader.
//!
//! Lets deployments keep serializer settings next to the rest of their
//! configuration instead of in code.
//!
//! # Example YAML
//!
//! ```yaml
//! # serializer.yaml
//! default_profile: save_game
//! profiles:
//!   save_game:
//!     formatting: BINARY
//!     convert_behaviour: NAME_AND_ORDER
//!     default_value_handling: IGNORE
//!     max_depth: 16
//!
//!   editor:
//!     formatting: TEXT
//!     convert_behaviour: CONFIGURATION
//!     reference_loop_handling: ERROR
//! ```

use super::{
    ConvertBehaviour, DefaultValueHandling, Formatting, NullValueHandling, ReferenceLoopHandling,
    Settings,
};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// YAML settings profile loader.
pub struct SettingsLoader;

/// Root YAML document structure.
#[derive(Debug, Deserialize)]
pub struct SettingsDocument {
    /// Named settings profiles.
    #[serde(default)]
    pub profiles: HashMap<String, SettingsProfile>,

    /// Default profile name (optional).
    #[serde(default)]
    pub default_profile: Option<String>,
}

/// A single settings profile; omitted keys keep the engine default.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SettingsProfile {
    /// BINARY or TEXT
    pub formatting: Option<String>,

    /// IGNORE or DEFAULT_VALUE
    pub null_value_handling: Option<String>,

    /// IGNORE or SERIALIZE
    pub default_value_handling: Option<String>,

    /// ORDER, NAME_AND_ORDER or CONFIGURATION
    pub convert_behaviour: Option<String>,

    /// IGNORE or ERROR
    pub reference_loop_handling: Option<String>,

    pub max_depth: Option<u32>,
}

impl SettingsLoader {
    /// Load settings profiles from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<SettingsDocument> {
        let yaml_content = fs::read_to_string(path)?;
        Self::parse_yaml(&yaml_content)
    }

    /// Parse YAML content.
    pub fn parse_yaml(yaml_content: &str) -> Result<SettingsDocument> {
        serde_yaml::from_str(yaml_content)
            .map_err(|e| Error::Config(format!("Failed to parse YAML: {}", e)))
    }

    /// Get settings by profile name.
    pub fn get_profile(doc: &SettingsDocument, name: &str) -> Result<Settings> {
        let profile = doc
            .profiles
            .get(name)
            .ok_or_else(|| Error::Config(format!("Profile '{}' not found", name)))?;
        Self::profile_to_settings(profile)
    }

    /// Get the default profile, the only profile, or engine defaults.
    pub fn get_default_profile(doc: &SettingsDocument) -> Result<Settings> {
        if let Some(ref default_name) = doc.default_profile {
            Self::get_profile(doc, default_name)
        } else if doc.profiles.len() == 1 {
            match doc.profiles.values().next() {
                Some(profile) => Self::profile_to_settings(profile),
                None => Ok(Settings::default()),
            }
        } else {
            Ok(Settings::default())
        }
    }

    /// Convert a profile on top of `Settings::default()`.
    pub fn profile_to_settings(profile: &SettingsProfile) -> Result<Settings> {
        Self::apply_profile(Settings::default(), profile)
    }

    /// Overlay a profile on existing settings (keeps the resolver).
    pub fn apply_profile(mut settings: Settings, profile: &SettingsProfile) -> Result<Settings> {
        if let Some(ref fmt) = profile.formatting {
            settings.formatting = match fmt.to_uppercase().as_str() {
                "BINARY" => Formatting::Binary,
                "TEXT" => Formatting::Text,
                other => return Err(Error::Config(format!("Invalid formatting: {}", other))),
            };
        }

        if let Some(ref nvh) = profile.null_value_handling {
            settings.null_value_handling = match nvh.to_uppercase().as_str() {
                "IGNORE" => NullValueHandling::Ignore,
                "DEFAULT_VALUE" => NullValueHandling::DefaultValue,
                other => {
                    return Err(Error::Config(format!(
                        "Invalid null value handling: {}",
                        other
                    )))
                }
            };
        }

        if let Some(ref dvh) = profile.default_value_handling {
            settings.default_value_handling = match dvh.to_uppercase().as_str() {
                "IGNORE" => DefaultValueHandling::Ignore,
                "SERIALIZE" => DefaultValueHandling::Serialize,
                other => {
                    return Err(Error::Config(format!(
                        "Invalid default value handling: {}",
                        other
                    )))
                }
            };
        }

        if let Some(ref cb) = profile.convert_behaviour {
            settings.convert_behaviour = match cb.to_uppercase().as_str() {
                "ORDER" => ConvertBehaviour::Order,
                "NAME_AND_ORDER" => ConvertBehaviour::NameAndOrder,
                "CONFIGURATION" => ConvertBehaviour::Configuration,
                other => {
                    return Err(Error::Config(format!("Invalid convert behaviour: {}", other)))
                }
            };
        }

        if let Some(ref rlh) = profile.reference_loop_handling {
            settings.reference_loop_handling = match rlh.to_uppercase().as_str() {
                "IGNORE" => ReferenceLoopHandling::Ignore,
                "ERROR" => ReferenceLoopHandling::Error,
                other => {
                    return Err(Error::Config(format!(
                        "Invalid reference loop handling: {}",
                        other
                    )))
                }
            };
        }

        if let Some(depth) = profile.max_depth {
            settings.max_depth = depth;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from file (convenience).
    ///
    /// Uses `profile_name` when given, the document default otherwise.
    pub fn load_settings<P: AsRef<Path>>(path: P, profile_name: Option<&str>) -> Result<Settings> {
        let doc = Self::load_from_file(path)?;
        match profile_name {
            Some(name) => Self::get_profile(&doc, name),
            None => Self::get_default_profile(&doc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_yaml() {
        let yaml = r#"
profiles:
  fast:
    convert_behaviour: ORDER
"#;
        let doc = SettingsLoader::parse_yaml(yaml).expect("parse");
        let settings = SettingsLoader::get_profile(&doc, "fast").expect("profile");
        assert_eq!(settings.convert_behaviour, ConvertBehaviour::Order);
        assert_eq!(settings.max_depth, 10);
    }

    #[test]
    fn test_parse_full_profile() {
        let yaml = r#"
default_profile: editor
profiles:
  editor:
    formatting: TEXT
    null_value_handling: DEFAULT_VALUE
    default_value_handling: SERIALIZE
    convert_behaviour: CONFIGURATION
    reference_loop_handling: ERROR
    max_depth: 4
"#;
        let doc = SettingsLoader::parse_yaml(yaml).expect("parse");
        let s = SettingsLoader::get_default_profile(&doc).expect("default");
        assert_eq!(s.formatting, Formatting::Text);
        assert_eq!(s.null_value_handling, NullValueHandling::DefaultValue);
        assert_eq!(s.default_value_handling, DefaultValueHandling::Serialize);
        assert_eq!(s.convert_behaviour, ConvertBehaviour::Configuration);
        assert_eq!(s.reference_loop_handling, ReferenceLoopHandling::Error);
        assert_eq!(s.max_depth, 4);
    }

    #[test]
    fn test_case_insensitive() {
        let yaml = r#"
profiles:
  p:
    formatting: text
    convert_behaviour: name_and_order
"#;
        let doc = SettingsLoader::parse_yaml(yaml).expect("parse");
        let s = SettingsLoader::get_profile(&doc, "p").expect("profile");
        assert_eq!(s.formatting, Formatting::Text);
        assert_eq!(s.convert_behaviour, ConvertBehaviour::NameAndOrder);
    }

    #[test]
    fn test_invalid_formatting() {
        let yaml = r#"
profiles:
  p:
    formatting: XML
"#;
        let doc = SettingsLoader::parse_yaml(yaml).expect("parse");
        match SettingsLoader::get_profile(&doc, "p") {
            Err(Error::Config(msg)) => assert!(msg.contains("Invalid formatting")),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_binary_configuration_profile_rejected() {
        let yaml = r#"
profiles:
  p:
    convert_behaviour: CONFIGURATION
"#;
        let doc = SettingsLoader::parse_yaml(yaml).expect("parse");
        assert!(matches!(
            SettingsLoader::get_profile(&doc, "p"),
            Err(Error::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_profile_not_found() {
        let doc = SettingsLoader::parse_yaml("profiles: {}").expect("parse");
        assert!(matches!(
            SettingsLoader::get_profile(&doc, "missing"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_empty_document_yields_defaults() {
        let doc = SettingsLoader::parse_yaml("{}").expect("parse");
        let s = SettingsLoader::get_default_profile(&doc).expect("defaults");
        assert_eq!(s.formatting, Formatting::Binary);
    }
}
