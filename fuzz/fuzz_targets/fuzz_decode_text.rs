// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use refser::{deserialize, ConvertBehaviour, Reflect, Settings};

#[derive(Reflect, Default, Debug)]
#[refser(object)]
struct Panel {
    pub title: String,
    pub visible: bool,
    pub size: Vec<f32>,
    pub child: Option<Box<Panel>>,
}

fuzz_target!(|data: &[u8]| {
    let _ = deserialize::<Panel>(data, &Settings::text());
    let _ = deserialize::<Panel>(
        data,
        &Settings::text().with_convert_behaviour(ConvertBehaviour::Configuration),
    );
    let _ = deserialize::<Vec<Option<String>>>(data, &Settings::text());
});
