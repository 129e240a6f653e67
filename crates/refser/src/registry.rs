// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec registry: allow-list, derivation and caching.
//!
//! # Architecture
//!
//! ```text
//! CodecRegistry
//! +-- codecs: DashMap<TypeId, Arc<dyn Codec>>       published, lock-free reads
//! +-- permitted / permitted_templates: DashSet      allow-list
//! +-- derivation: ReentrantMutex<DerivationState>   one derivation at a time
//!     +-- pending: TypeId -> DeferredCodec          shapes on the derivation stack
//!     +-- staged: TypeId -> Arc<dyn Codec>          built, not yet published
//! ```
//!
//! # Lookup Flow
//!
//! 1. Cache hit -> return the published codec
//! 2. Shape not permitted -> `Error::NotPermitted`
//! 3. Take the derivation lock (re-entrant: nested shapes derive on the same thread)
//! 4. Shape already on the stack -> return its deferred codec (recursive type)
//! 5. Build, bind the deferred codec, stage the result
//! 6. Outermost derivation done -> publish everything staged
//!
//! Publication is all-or-nothing per outermost lookup, so a concurrent reader
//! never observes a codec whose deferred self-references are still unbound.

use crate::codec::{Codec, DeferredCodec};
use crate::error::{Error, Result};
use crate::reflect::{Reflect, Shape, ShapeKind};
use arc_swap::ArcSwap;
use dashmap::{DashMap, DashSet};
use parking_lot::ReentrantMutex;
use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Process-wide default registry, swappable at runtime.
static GLOBAL_REGISTRY: OnceLock<ArcSwap<CodecRegistry>> = OnceLock::new();

fn global_slot() -> &'static ArcSwap<CodecRegistry> {
    GLOBAL_REGISTRY.get_or_init(|| ArcSwap::from_pointee(CodecRegistry::new()))
}

/// Cache hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Default)]
struct DerivationState {
    pending: HashMap<TypeId, Arc<DeferredCodec>>,
    staged: HashMap<TypeId, Arc<dyn Codec>>,
    nesting: usize,
}

/// Resolves, derives and caches codecs for permitted shapes.
pub struct CodecRegistry {
    codecs: DashMap<TypeId, Arc<dyn Codec>>,
    permitted: DashSet<TypeId>,
    permitted_templates: DashSet<&'static str>,
    derivation: ReentrantMutex<RefCell<DerivationState>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CodecRegistry {
    /// Registry with every primitive plus the `Option` and `Box` templates permitted.
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.permit::<bool>();
        registry.permit::<i8>();
        registry.permit::<i16>();
        registry.permit::<i32>();
        registry.permit::<i64>();
        registry.permit::<u8>();
        registry.permit::<u16>();
        registry.permit::<u32>();
        registry.permit::<u64>();
        registry.permit::<f32>();
        registry.permit::<f64>();
        registry.permit::<char>();
        registry.permit::<String>();
        registry.permit_template("Option");
        registry.permit_template("Box");
        registry
    }

    /// Registry with an empty allow-list; only arrays and enumerations resolve.
    pub fn empty() -> Self {
        Self {
            codecs: DashMap::new(),
            permitted: DashSet::new(),
            permitted_templates: DashSet::new(),
            derivation: ReentrantMutex::new(RefCell::new(DerivationState::default())),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Current process-wide registry.
    pub fn global() -> Arc<CodecRegistry> {
        global_slot().load_full()
    }

    /// Replace the process-wide registry, returning the previous one.
    ///
    /// Settings built earlier keep the registry they captured.
    pub fn install_global(registry: Arc<CodecRegistry>) -> Arc<CodecRegistry> {
        log::info!("[CodecRegistry] installing new global registry");
        global_slot().swap(registry)
    }

    // ===================================================================
    // Allow-list
    // ===================================================================

    /// Permit one concrete shape.
    pub fn permit<T: Reflect>(&self) {
        self.permitted.insert(TypeId::of::<T>());
    }

    /// Permit every instantiation of a generic template (`"Option"`, `"Pair"`...).
    pub fn permit_template(&self, template: &'static str) {
        self.permitted_templates.insert(template);
    }

    /// Arrays and enumerations are always permitted.
    pub fn is_permitted(&self, shape: &Shape) -> bool {
        match shape.kind {
            ShapeKind::Array | ShapeKind::Enum => true,
            _ => {
                shape.auto_permit
                    || self.permitted.contains(&shape.type_id)
                    || shape
                        .template
                        .map_or(false, |t| self.permitted_templates.contains(t))
            }
        }
    }

    // ===================================================================
    // Lookup
    // ===================================================================

    /// Codec for `T`, deriving and caching it on first use.
    pub fn get<T: Reflect>(&self) -> Result<Arc<dyn Codec>> {
        let type_id = TypeId::of::<T>();
        if let Some(codec) = self.cached(type_id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(codec);
        }

        let shape = T::shape();
        if !self.is_permitted(&shape) {
            log::debug!("[CodecRegistry] rejected {}", shape.type_name);
            return Err(Error::NotPermitted {
                type_name: shape.type_name,
            });
        }

        let guard = self.derivation.lock();
        // Another thread may have published while we waited for the lock.
        if let Some(codec) = self.cached(type_id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(codec);
        }

        let deferred = {
            let mut state = guard.borrow_mut();
            if let Some(codec) = state.staged.get(&type_id) {
                return Ok(Arc::clone(codec));
            }
            if let Some(deferred) = state.pending.get(&type_id) {
                log::trace!("[CodecRegistry] deferring recursive {}", shape.type_name);
                return Ok(Arc::clone(deferred) as Arc<dyn Codec>);
            }
            let deferred = Arc::new(DeferredCodec::new(shape.clone()));
            state.pending.insert(type_id, Arc::clone(&deferred));
            state.nesting += 1;
            deferred
        };

        self.misses.fetch_add(1, Ordering::Relaxed);
        let built = T::build_codec(self);

        let mut state = guard.borrow_mut();
        state.nesting -= 1;
        state.pending.remove(&type_id);

        match built {
            Ok(codec) => {
                deferred.bind(&codec);
                state.staged.insert(type_id, Arc::clone(&codec));
                if state.nesting == 0 {
                    for (id, staged) in state.staged.drain() {
                        self.codecs.insert(id, staged);
                    }
                }
                log::debug!("[CodecRegistry] derived codec for {}", shape.type_name);
                Ok(codec)
            }
            Err(e) => {
                if state.nesting == 0 {
                    state.staged.clear();
                }
                log::debug!(
                    "[CodecRegistry] derivation of {} failed: {}",
                    shape.type_name,
                    e
                );
                Err(e)
            }
        }
    }

    /// Derive the codec for `T` ahead of first use.
    pub fn warm<T: Reflect>(&self) -> Result<()> {
        self.get::<T>().map(|_| ())
    }

    /// Published codec for a type, if any.
    pub fn cached(&self, type_id: TypeId) -> Option<Arc<dyn Codec>> {
        self.codecs.get(&type_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Number of published codecs.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    pub fn stats(&self) -> LookupStats {
        LookupStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codecs", &self.codecs.len())
            .field("permitted", &self.permitted.len())
            .field("permitted_templates", &self.permitted_templates.len())
            .field("stats", &self.stats())
            .finish()
    }
}
