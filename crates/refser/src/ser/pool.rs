// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lock-free pool of writer buffers.
//!
//! Serialize calls borrow a `Vec<u8>` from the pool for the lifetime of their
//! [`ByteWriter`](super::ByteWriter) and hand it back on drop, so steady-state
//! serialization does not allocate a fresh buffer per call.
//!
//! # Design
//! - **Lock-free:** crossbeam `ArrayQueue` freelist (MPMC-safe)
//! - **Bounded:** at most `capacity` idle buffers, oversized buffers are dropped
//! - **Metrics:** tracks exhaustion events (freelist empty on acquire)

use crate::config::{POOL_CAPACITY, POOL_MAX_RETAINED_BYTES};
use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared buffer pool used by pooled writers.
static GLOBAL_BUFFER_POOL: OnceLock<Arc<BufferPool>> = OnceLock::new();

/// Return the process-wide buffer pool, creating it on first use.
pub fn global_pool() -> Arc<BufferPool> {
    GLOBAL_BUFFER_POOL
        .get_or_init(|| Arc::new(BufferPool::new(POOL_CAPACITY, POOL_MAX_RETAINED_BYTES)))
        .clone()
}

/// Bounded freelist of reusable byte buffers.
pub struct BufferPool {
    freelist: ArrayQueue<Vec<u8>>,
    max_retained: usize,
    /// Count of acquires that found the freelist empty (diagnostic)
    exhausted_count: AtomicU64,
}

impl BufferPool {
    /// Create an empty pool holding up to `capacity` idle buffers.
    ///
    /// Buffers whose capacity exceeds `max_retained` bytes are not returned.
    pub fn new(capacity: usize, max_retained: usize) -> Self {
        Self {
            freelist: ArrayQueue::new(capacity.max(1)),
            max_retained,
            exhausted_count: AtomicU64::new(0),
        }
    }

    /// Take a cleared buffer with at least `min_capacity` bytes reserved.
    pub fn acquire(&self, min_capacity: usize) -> Vec<u8> {
        match self.freelist.pop() {
            Some(mut buf) => {
                buf.clear();
                buf.reserve(min_capacity);
                buf
            }
            None => {
                self.exhausted_count.fetch_add(1, Ordering::Relaxed);
                Vec::with_capacity(min_capacity)
            }
        }
    }

    /// Hand a buffer back. Oversized buffers and overflow are dropped.
    pub fn release(&self, mut buf: Vec<u8>) {
        if buf.capacity() == 0 || buf.capacity() > self.max_retained {
            return;
        }
        buf.clear();
        // Full freelist: let the buffer go.
        let _ = self.freelist.push(buf);
    }

    /// Number of idle buffers ready for reuse.
    pub fn available(&self) -> usize {
        self.freelist.len()
    }

    pub fn capacity(&self) -> usize {
        self.freelist.capacity()
    }

    pub fn exhausted_count(&self) -> u64 {
        self.exhausted_count.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("available", &self.available())
            .field("capacity", &self.capacity())
            .field("max_retained", &self.max_retained)
            .field("exhausted_count", &self.exhausted_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_on_empty_pool_counts_exhaustion() {
        let pool = BufferPool::new(2, 4096);
        let buf = pool.acquire(64);
        assert!(buf.capacity() >= 64);
        assert_eq!(pool.exhausted_count(), 1);
    }

    #[test]
    fn test_released_buffer_is_reused_cleared() {
        let pool = BufferPool::new(2, 4096);
        let mut buf = pool.acquire(16);
        buf.extend_from_slice(b"stale");
        pool.release(buf);
        assert_eq!(pool.available(), 1);

        let reused = pool.acquire(8);
        assert!(reused.is_empty());
        assert_eq!(pool.available(), 0);
        assert_eq!(pool.exhausted_count(), 1);
    }

    #[test]
    fn test_oversized_buffer_is_dropped() {
        let pool = BufferPool::new(2, 128);
        pool.release(Vec::with_capacity(4096));
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_full_freelist_drops_overflow() {
        let pool = BufferPool::new(1, 4096);
        pool.release(Vec::with_capacity(32));
        pool.release(Vec::with_capacity(32));
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_global_pool_is_shared() {
        let a = global_pool();
        let b = global_pool();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
