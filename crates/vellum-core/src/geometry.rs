// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Geometry containers whose vertex and index buffers are uploaded ahead of use.

use crate::prepare::Preparable;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};

/// The binding role of a geometry buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Per-vertex attribute data.
    Vertex,
    /// Element indices.
    Index,
}

/// A CPU-side buffer awaiting upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryBuffer {
    /// How the buffer is bound when drawn.
    pub kind: BufferKind,
    /// The raw bytes to upload.
    pub data: Vec<u8>,
}

/// A set of buffers drawn together.
#[derive(Debug, Default)]
pub struct Geometry {
    buffers: Vec<GeometryBuffer>,
    destroyed: AtomicBool,
}

impl Geometry {
    /// Creates a geometry from its buffers.
    pub fn new(buffers: Vec<GeometryBuffer>) -> Self {
        Self {
            buffers,
            destroyed: AtomicBool::new(false),
        }
    }

    /// Returns the buffers of this geometry.
    pub fn buffers(&self) -> &[GeometryBuffer] {
        &self.buffers
    }

    /// Total size in bytes of all buffers.
    pub fn byte_len(&self) -> usize {
        self.buffers.iter().map(|buffer| buffer.data.len()).sum()
    }

    /// Marks the geometry destroyed. Pending uploads of it are dropped.
    pub fn destroy(&self) {
        self.destroyed.store(true, Ordering::Release);
    }
}

impl Preparable for Geometry {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }
}
