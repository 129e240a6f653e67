// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Allow-list, recursive derivation and concurrent first use of the registry.

use refser::{
    deserialize, serialize, serialize_object, CodecRegistry, DynReflect, Error, Reflect,
    Settings,
};
use std::sync::{Arc, Barrier};
use std::thread;

/// Not auto-permitted: needs `permit`.
#[derive(Reflect, Default, Debug, Clone, PartialEq)]
struct Credentials {
    pub user: String,
    pub token: String,
}

#[derive(Reflect, Default, Debug, Clone, PartialEq)]
#[refser(object)]
struct Session {
    pub id: u64,
    pub credentials: Option<Credentials>,
}

// Mutual recursion: Room -> Door -> Room.
#[derive(Reflect, Default, Debug, Clone, PartialEq)]
#[refser(object)]
struct Room {
    pub name: String,
    pub doors: Vec<Door>,
}

#[derive(Reflect, Default, Debug, Clone, PartialEq)]
#[refser(object)]
struct Door {
    pub locked: bool,
    pub leads_to: Option<Box<Room>>,
}

fn settings(registry: CodecRegistry) -> Settings {
    Settings::resilient().with_resolver(Arc::new(registry))
}

#[test]
fn test_unpermitted_type_is_rejected_both_ways() {
    let s = settings(CodecRegistry::new());
    let session = Session {
        id: 1,
        credentials: Some(Credentials::default()),
    };
    assert!(matches!(
        serialize(&session, &s),
        Err(Error::NotPermitted { .. })
    ));
    assert!(matches!(
        deserialize::<Session>(&[], &s),
        Err(Error::NotPermitted { .. })
    ));
    assert!(matches!(
        serialize(&Credentials::default(), &s),
        Err(Error::NotPermitted { .. })
    ));
}

#[test]
fn test_permit_enables_type() {
    let registry = CodecRegistry::new();
    registry.permit::<Credentials>();
    let s = settings(registry);
    let session = Session {
        id: 9,
        credentials: Some(Credentials {
            user: "ops".into(),
            token: "t0k".into(),
        }),
    };
    let bytes = serialize(&session, &s).expect("serialize");
    assert_eq!(deserialize::<Session>(&bytes, &s).expect("deserialize"), session);
}

#[test]
fn test_mutual_recursion_roundtrip() {
    let s = settings(CodecRegistry::new());
    let cellar = Room {
        name: "cellar".into(),
        doors: vec![],
    };
    let hall = Room {
        name: "hall".into(),
        doors: vec![
            Door {
                locked: true,
                leads_to: Some(Box::new(cellar)),
            },
            Door::default(),
        ],
    };
    let bytes = serialize(&hall, &s).expect("serialize");
    assert_eq!(deserialize::<Room>(&bytes, &s).expect("deserialize"), hall);
}

#[test]
fn test_untyped_entry_point() {
    let s = settings(CodecRegistry::new());
    let values: Vec<Box<dyn DynReflect>> = vec![
        Box::new(7u32),
        Box::new(String::from("seven")),
        Box::new(Room::default()),
    ];
    for value in &values {
        let bytes = serialize_object(value.as_ref(), &s).expect("serialize");
        assert!(!bytes.is_empty());
    }
    let bytes = serialize_object(values[1].as_ref(), &s).expect("serialize");
    assert_eq!(deserialize::<String>(&bytes, &s).expect("deserialize"), "seven");
}

#[test]
fn test_warm_then_concurrent_use() {
    let registry = Arc::new(CodecRegistry::new());
    registry.warm::<Room>().expect("warm");
    let warmed = registry.len();
    assert!(warmed >= 4);

    let s = Settings::default().with_resolver(Arc::clone(&registry));
    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8u64)
        .map(|i| {
            let s = s.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let room = Room {
                    name: format!("room-{}", i),
                    doors: vec![Door::default(); i as usize],
                };
                for _ in 0..100 {
                    let bytes = serialize(&room, &s).expect("serialize");
                    let back: Room = deserialize(&bytes, &s).expect("deserialize");
                    assert_eq!(back, room);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread");
    }
    assert_eq!(registry.len(), warmed);
    assert!(registry.stats().hits > 0);
}

#[test]
fn test_concurrent_first_derivation() {
    for _ in 0..20 {
        let registry = Arc::new(CodecRegistry::new());
        let barrier = Arc::new(Barrier::new(6));
        let handles: Vec<_> = (0..6)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.get::<Room>().expect("derive")
                })
            })
            .collect();
        let codecs: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .collect();
        assert!(codecs.iter().all(|c| Arc::ptr_eq(c, &codecs[0])));
    }
}

#[test]
fn test_install_global_swaps_default_registry() {
    let custom = Arc::new(CodecRegistry::new());
    custom.permit::<Credentials>();
    let previous = CodecRegistry::install_global(Arc::clone(&custom));
    assert!(Arc::ptr_eq(&CodecRegistry::global(), &custom));

    let creds = Credentials {
        user: "root".into(),
        token: String::new(),
    };
    let bytes = refser::to_bytes(&creds).expect("serialize");
    assert_eq!(refser::from_bytes::<Credentials>(&bytes).expect("deserialize"), creds);

    CodecRegistry::install_global(previous);
}
