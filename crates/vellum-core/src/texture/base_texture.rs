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

use super::{BaseTextureHandle, BaseTextureRef};
use crate::prepare::Preparable;
use crate::resource::Resource;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

/// A GPU texture backed by at most one [`Resource`].
///
/// The resource reports its size and content changes back to the texture;
/// uploaders compare [`dirty_id`](BaseTexture::dirty_id) against the id they
/// last uploaded to decide whether work is needed.
pub struct BaseTexture {
    this: Weak<BaseTexture>,
    resource: RwLock<Option<Arc<dyn Resource>>>,
    real_size: Mutex<(u32, u32)>,
    dirty_id: AtomicU64,
    destroyed: AtomicBool,
}

impl BaseTexture {
    /// Creates an empty texture with no resource.
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            resource: RwLock::new(None),
            real_size: Mutex::new((0, 0)),
            dirty_id: AtomicU64::new(0),
            destroyed: AtomicBool::new(false),
        })
    }

    /// Creates a texture and binds `resource` to it.
    pub fn from_resource(resource: Arc<dyn Resource>) -> Arc<Self> {
        let texture = Self::new();
        texture.set_resource(resource);
        texture
    }

    /// Replaces the backing resource, unbinding the previous one.
    pub fn set_resource(&self, resource: Arc<dyn Resource>) {
        let Some(handle) = self.handle() else {
            return;
        };

        let previous = self.resource.write().unwrap().replace(resource.clone());
        if let Some(previous) = previous {
            previous.unbind(&handle);
        }
        resource.bind(&handle);
    }

    /// Returns the backing resource, if any.
    pub fn resource(&self) -> Option<Arc<dyn Resource>> {
        self.resource.read().unwrap().clone()
    }

    /// Real width in pixels, as last reported by the resource.
    pub fn real_width(&self) -> u32 {
        self.real_size.lock().unwrap().0
    }

    /// Real height in pixels, as last reported by the resource.
    pub fn real_height(&self) -> u32 {
        self.real_size.lock().unwrap().1
    }

    /// A texture is valid once it has a non-zero size.
    pub fn valid(&self) -> bool {
        let (width, height) = *self.real_size.lock().unwrap();
        width > 0 && height > 0
    }

    /// Monotonic counter bumped by every [`update`](BaseTextureHandle::update).
    pub fn dirty_id(&self) -> u64 {
        self.dirty_id.load(Ordering::Acquire)
    }

    /// Unbinds the resource and marks the texture destroyed.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        let resource = self.resource.write().unwrap().take();
        if let (Some(resource), Some(handle)) = (resource, self.handle()) {
            resource.unbind(&handle);
        }
    }

    /// Returns `true` once [`destroy`](BaseTexture::destroy) has been called.
    pub fn destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    fn handle(&self) -> Option<BaseTextureRef> {
        self.this
            .upgrade()
            .map(|texture| texture as BaseTextureRef)
    }
}

impl BaseTextureHandle for BaseTexture {
    fn set_real_size(&self, width: u32, height: u32) {
        *self.real_size.lock().unwrap() = (width, height);
    }

    fn update(&self) {
        if !self.destroyed() {
            self.dirty_id.fetch_add(1, Ordering::AcqRel);
        }
    }
}

impl Preparable for BaseTexture {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed()
    }
}

impl fmt::Debug for BaseTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseTexture")
            .field("real_size", &*self.real_size.lock().unwrap())
            .field("dirty_id", &self.dirty_id())
            .field("destroyed", &self.destroyed())
            .finish()
    }
}
