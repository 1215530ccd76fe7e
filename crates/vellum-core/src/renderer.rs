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

//! An opaque handle to the render context that owns a preparation pipeline.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A cheap, cloneable, type-erased reference to the owning renderer.
///
/// The preparation pipeline never inspects the renderer; it only stores the
/// handle and passes it through to upload hooks, which may downcast it to the
/// concrete render context they know how to drive.
#[derive(Clone)]
pub struct RendererHandle(Arc<dyn Any + Send + Sync>);

impl RendererHandle {
    /// Wraps a renderer value.
    pub fn new<R: Any + Send + Sync>(renderer: R) -> Self {
        Self(Arc::new(renderer))
    }

    /// Wraps an already shared renderer.
    pub fn from_arc<R: Any + Send + Sync>(renderer: Arc<R>) -> Self {
        Self(renderer)
    }

    /// Attempts to view the renderer as a concrete type.
    pub fn downcast_ref<R: Any>(&self) -> Option<&R> {
        self.0.downcast_ref::<R>()
    }

    /// Returns `true` if both handles point at the same renderer.
    pub fn ptr_eq(&self, other: &RendererHandle) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl fmt::Debug for RendererHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RendererHandle")
            .field(&Arc::as_ptr(&self.0))
            .finish()
    }
}
