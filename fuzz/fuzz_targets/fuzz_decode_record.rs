// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use refser::{deserialize, ConvertBehaviour, NullValueHandling, Reflect, Settings};

#[derive(Reflect, Default, Debug)]
#[refser(object)]
struct Link {
    pub id: u32,
    pub label: String,
    pub next: Option<Box<Link>>,
}

#[derive(Reflect, Default, Debug)]
#[refser(object)]
struct Record {
    pub flag: bool,
    pub count: i64,
    pub ratio: f64,
    pub glyph: char,
    pub names: Vec<String>,
    pub matrix: Vec<Vec<u16>>,
    pub head: Option<Link>,
}

fuzz_target!(|data: &[u8]| {
    // A composite root never fails on arbitrary bytes: every fault is local to a field
    for settings in [
        Settings::binary(),
        Settings::resilient(),
        Settings::resilient().with_null_value_handling(NullValueHandling::DefaultValue),
        Settings::binary().with_convert_behaviour(ConvertBehaviour::Order).with_max_depth(4),
    ] {
        assert!(deserialize::<Record>(data, &settings).is_ok());
        assert!(deserialize::<Link>(data, &settings).is_ok());
    }
});
