// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Exact round-trip assertions
#![allow(clippy::unreadable_literal)] // Large test constants

//! Round-trip identity across both encodings and every field handling mode.

use refser::{
    deserialize, serialize, CodecRegistry, ConvertBehaviour, DefaultValueHandling, Formatting,
    NullValueHandling, Reflect, Settings,
};
use std::sync::Arc;

#[derive(Reflect, Default, Debug, Clone, Copy, PartialEq)]
enum Faction {
    #[default]
    Neutral,
    Red = 3,
    Blue = -4,
}

#[derive(Reflect, Default, Debug, Clone, PartialEq)]
#[refser(object)]
struct Stats {
    pub flag: bool,
    pub tiny: i8,
    pub small: i16,
    pub word: i32,
    pub wide: i64,
    pub byte: u8,
    pub port: u16,
    pub count: u32,
    pub big: u64,
    pub ratio: f32,
    pub precise: f64,
    pub glyph: char,
    pub label: String,
}

#[derive(Reflect, Default, Debug, Clone, PartialEq)]
#[refser(object)]
struct Slot<T: Reflect + Default> {
    pub item: T,
    pub quantity: u16,
}

#[derive(Reflect, Default, Debug, Clone, PartialEq)]
#[refser(object)]
struct Character {
    pub name: String,
    pub faction: Faction,
    pub stats: Stats,
    pub nickname: Option<String>,
    pub tags: Vec<String>,
    pub grid: Vec<Vec<i32>>,
    pub bag: Vec<Slot<String>>,
    pub rival: Option<Box<Character>>,
    #[refser(skip)]
    pub cached_power: u64,
}

fn registry() -> Arc<CodecRegistry> {
    let registry = CodecRegistry::new();
    registry.permit_template("Slot");
    Arc::new(registry)
}

fn all_settings() -> Vec<Settings> {
    let mut out = Vec::new();
    for formatting in [Formatting::Binary, Formatting::Text] {
        for convert in [ConvertBehaviour::Order, ConvertBehaviour::NameAndOrder] {
            for nulls in [NullValueHandling::Ignore, NullValueHandling::DefaultValue] {
                for defaults in [DefaultValueHandling::Ignore, DefaultValueHandling::Serialize] {
                    out.push(
                        Settings::default()
                            .with_resolver(registry())
                            .with_formatting(formatting)
                            .with_convert_behaviour(convert)
                            .with_null_value_handling(nulls)
                            .with_default_value_handling(defaults),
                    );
                }
            }
        }
    }
    out
}

fn roundtrip<T: Reflect + std::fmt::Debug + PartialEq>(value: &T, settings: &Settings) {
    let bytes = serialize(value, settings).expect("serialize");
    let back: T = deserialize(&bytes, settings).expect("deserialize");
    assert_eq!(&back, value, "settings: {:?}", settings);
}

fn extremes(max: bool) -> Stats {
    if max {
        Stats {
            flag: true,
            tiny: i8::MAX,
            small: i16::MAX,
            word: i32::MAX,
            wide: i64::MAX,
            byte: u8::MAX,
            port: u16::MAX,
            count: u32::MAX,
            big: u64::MAX,
            ratio: f32::MAX,
            precise: f64::MIN_POSITIVE,
            glyph: '\u{10FFFF}',
            label: "line\nbreak \"quoted\" \\ tab\t".into(),
        }
    } else {
        Stats {
            flag: false,
            tiny: i8::MIN,
            small: i16::MIN,
            word: i32::MIN,
            wide: i64::MIN,
            byte: 0,
            port: 1,
            count: 0,
            big: 1,
            ratio: -0.1,
            precise: -1.0e300,
            glyph: '"',
            label: String::new(),
        }
    }
}

fn character() -> Character {
    Character {
        name: "Mira".into(),
        faction: Faction::Blue,
        stats: extremes(true),
        nickname: Some("null".into()),
        tags: vec!["scout".into(), String::new(), "a, b".into()],
        grid: vec![vec![1, -2], vec![], vec![i32::MIN]],
        bag: vec![
            Slot {
                item: "rope".into(),
                quantity: 2,
            },
            Slot::default(),
        ],
        rival: Some(Box::new(Character {
            name: "Oren".into(),
            faction: Faction::Red,
            ..Default::default()
        })),
        cached_power: 0,
    }
}

#[test]
fn test_primitive_extremes_roundtrip() {
    for settings in all_settings() {
        roundtrip(&extremes(true), &settings);
        roundtrip(&extremes(false), &settings);
        roundtrip(&Stats::default(), &settings);
    }
}

#[test]
fn test_composite_roundtrip_every_mode() {
    for settings in all_settings() {
        roundtrip(&character(), &settings);
        roundtrip(&Character::default(), &settings);
    }
}

#[test]
fn test_top_level_values_roundtrip() {
    for settings in all_settings() {
        roundtrip(&-17i64, &settings);
        roundtrip(&String::from("top \"level\""), &settings);
        roundtrip(&vec![Faction::Red, Faction::Neutral], &settings);
        roundtrip(&Some(3.5f64), &settings);
        roundtrip(&Option::<u8>::None, &settings);
    }
}

#[test]
fn test_skipped_field_is_not_written() {
    let settings = Settings::default().with_resolver(registry());
    let mut value = character();
    value.cached_power = 9000;
    let bytes = serialize(&value, &settings).expect("serialize");
    let back: Character = deserialize(&bytes, &settings).expect("deserialize");
    assert_eq!(back.cached_power, 0);
    assert_eq!(back.name, "Mira");
}

#[test]
fn test_float_specials_survive_text() {
    #[derive(Reflect, Default, Debug)]
    #[refser(object)]
    struct Floats {
        pub nan: f64,
        pub up: f32,
        pub down: f64,
    }

    let settings = Settings::text().with_resolver(registry());
    let value = Floats {
        nan: f64::NAN,
        up: f32::INFINITY,
        down: f64::NEG_INFINITY,
    };
    let bytes = serialize(&value, &settings).expect("serialize");
    let back: Floats = deserialize(&bytes, &settings).expect("deserialize");
    assert!(back.nan.is_nan());
    assert_eq!(back.up, f32::INFINITY);
    assert_eq!(back.down, f64::NEG_INFINITY);
}

#[test]
fn test_default_fields_are_omitted_by_default() {
    let settings = Settings::default().with_resolver(registry());
    let bytes = serialize(&Stats::default(), &settings).expect("serialize");
    // root record with no fields: just the break marker
    assert_eq!(bytes, b"}");

    let serialize_all = settings.with_default_value_handling(DefaultValueHandling::Serialize);
    let bytes = serialize(&Stats::default(), &serialize_all).expect("serialize");
    // 13 field headers of 4 bytes (marker, index, presence) and the break marker
    assert_eq!(bytes.len(), 13 * 4 + 1);
}
