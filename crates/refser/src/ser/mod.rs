// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte-stream reader/writer and pooled buffer storage.

pub mod pool;
pub mod reader;
pub mod writer;

pub use pool::{global_pool, BufferPool};
pub use reader::ByteReader;
pub use writer::ByteWriter;
