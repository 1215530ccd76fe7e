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

//! Texture resources: the data sources that back a [`BaseTexture`](crate::texture::BaseTexture).
//!
//! A resource owns pixel data (or the means to fetch it) and reports its size
//! and content changes to the one handle it is bound to. The shared
//! bookkeeping lives in [`ResourceCore`]; concrete kinds only decide how
//! their data is produced.

mod array;
mod buffer;
mod image;

pub use self::array::*;
pub use self::buffer::*;
pub use self::image::*;

use crate::error::ResourceError;
use crate::texture::{same_handle, BaseTextureHandle, BaseTextureRef};
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Sizing options applied to every resource built from a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceOptions {
    /// Width in pixels; `0` when unknown until load.
    pub width: u32,
    /// Height in pixels; `0` when unknown until load.
    pub height: u32,
}

impl ResourceOptions {
    /// Creates options with an explicit size.
    pub const fn sized(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A data source for a texture.
#[async_trait]
pub trait Resource: Send + Sync + fmt::Debug + 'static {
    /// Shared size, binding and lifetime state.
    fn core(&self) -> &ResourceCore;

    /// Exposes the concrete type for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Width in pixels.
    fn width(&self) -> u32 {
        self.core().width()
    }

    /// Height in pixels.
    fn height(&self) -> u32 {
        self.core().height()
    }

    /// `true` once the resource knows a non-zero size.
    fn valid(&self) -> bool {
        self.core().valid()
    }

    /// Binds this resource to a texture handle.
    fn bind(&self, handle: &BaseTextureRef) {
        self.core().bind(handle);
    }

    /// Releases the binding if it belongs to `handle`.
    fn unbind(&self, handle: &BaseTextureRef) {
        self.core().unbind(handle);
    }

    /// `true` if [`load`](Resource::load) has work to do.
    fn needs_load(&self) -> bool {
        false
    }

    /// Fetches the resource's data. Resources without a load step resolve
    /// immediately.
    async fn load(&self) -> Result<(), ResourceError> {
        Ok(())
    }

    /// Releases the resource's data and its binding.
    fn destroy(&self) {
        self.core().destroy();
    }

    /// `true` once [`destroy`](Resource::destroy) has been called.
    fn destroyed(&self) -> bool {
        self.core().is_destroyed()
    }
}

#[derive(Default)]
struct CoreState {
    width: u32,
    height: u32,
    bound: Option<Weak<dyn BaseTextureHandle>>,
}

/// Size, validity and binding state shared by every resource kind.
///
/// The bound handle is held weakly: a texture owns its resource, never the
/// other way round.
#[derive(Default)]
pub struct ResourceCore {
    state: Mutex<CoreState>,
    destroyed: AtomicBool,
}

impl ResourceCore {
    /// Creates core state with an initial size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: Mutex::new(CoreState {
                width,
                height,
                bound: None,
            }),
            destroyed: AtomicBool::new(false),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.state.lock().unwrap().width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.state.lock().unwrap().height
    }

    /// `true` once both dimensions are non-zero.
    pub fn valid(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.width > 0 && state.height > 0
    }

    /// Binds `handle`, replacing any previous binding, and reports the
    /// current size to it if one is known.
    pub fn bind(&self, handle: &BaseTextureRef) {
        let (width, height) = {
            let mut state = self.state.lock().unwrap();
            state.bound = Some(Arc::downgrade(handle));
            (state.width, state.height)
        };
        if width > 0 && height > 0 {
            handle.set_real_size(width, height);
        }
    }

    /// Clears the binding if it is `handle`. Returns `false` for any other
    /// handle, leaving the binding untouched.
    pub fn unbind(&self, handle: &BaseTextureRef) -> bool {
        let mut state = self.state.lock().unwrap();
        let matches = state
            .bound
            .as_ref()
            .is_some_and(|bound| std::ptr::addr_eq(bound.as_ptr(), Arc::as_ptr(handle)));
        if matches {
            state.bound = None;
        } else {
            log::warn!("Ignoring unbind from a texture this resource is not bound to.");
        }
        matches
    }

    /// Returns the bound handle while it is still alive.
    pub fn bound(&self) -> Option<BaseTextureRef> {
        self.state
            .lock()
            .unwrap()
            .bound
            .as_ref()
            .and_then(Weak::upgrade)
    }

    /// Returns `true` if `handle` is the current binding.
    pub fn is_bound_to(&self, handle: &BaseTextureRef) -> bool {
        self.bound().is_some_and(|bound| same_handle(&bound, handle))
    }

    /// Changes the size. The bound handle hears about it only when the size
    /// actually differs from the previous one.
    pub fn resize(&self, width: u32, height: u32) {
        let bound = {
            let mut state = self.state.lock().unwrap();
            if state.width == width && state.height == height {
                return;
            }
            state.width = width;
            state.height = height;
            state.bound.as_ref().and_then(Weak::upgrade)
        };
        if let Some(handle) = bound {
            handle.set_real_size(width, height);
        }
    }

    /// Signals new content to the bound handle.
    pub fn update(&self) {
        if self.is_destroyed() {
            return;
        }
        if let Some(handle) = self.bound() {
            handle.update();
        }
    }

    /// Marks the resource destroyed and forgets the binding without calling
    /// back into the handle. Returns `false` if it was already destroyed.
    pub fn destroy(&self) -> bool {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.state.lock().unwrap().bound = None;
        true
    }

    /// `true` once [`destroy`](ResourceCore::destroy) has been called.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for ResourceCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("ResourceCore")
            .field("width", &state.width)
            .field("height", &state.height)
            .field("bound", &state.bound.is_some())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

/// Describes where a resource comes from.
#[derive(Debug, Clone)]
pub enum ResourceSource {
    /// An image file to decode on load.
    Url(PathBuf),
    /// An already constructed resource.
    Resource(Arc<dyn Resource>),
}

impl From<&str> for ResourceSource {
    fn from(url: &str) -> Self {
        ResourceSource::Url(PathBuf::from(url))
    }
}

impl From<String> for ResourceSource {
    fn from(url: String) -> Self {
        ResourceSource::Url(PathBuf::from(url))
    }
}

impl From<PathBuf> for ResourceSource {
    fn from(path: PathBuf) -> Self {
        ResourceSource::Url(path)
    }
}

impl From<Arc<dyn Resource>> for ResourceSource {
    fn from(resource: Arc<dyn Resource>) -> Self {
        ResourceSource::Resource(resource)
    }
}

/// Builds the resource a descriptor refers to.
///
/// URLs become [`ImageResource`]s; existing resources are passed through.
pub fn auto_detect_resource(source: ResourceSource, options: ResourceOptions) -> Arc<dyn Resource> {
    match source {
        ResourceSource::Url(path) => Arc::new(ImageResource::with_options(path, options)),
        ResourceSource::Resource(resource) => resource,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct SpyHandle {
        resizes: AtomicUsize,
        updates: AtomicUsize,
        last_size: Mutex<(u32, u32)>,
    }

    impl BaseTextureHandle for SpyHandle {
        fn set_real_size(&self, width: u32, height: u32) {
            self.resizes.fetch_add(1, Ordering::SeqCst);
            *self.last_size.lock().unwrap() = (width, height);
        }

        fn update(&self) {
            self.updates.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn bind_reports_known_size() {
        let core = ResourceCore::new(16, 8);
        let spy = Arc::new(SpyHandle::default());
        let handle: BaseTextureRef = spy.clone();

        core.bind(&handle);

        assert_eq!(spy.resizes.load(Ordering::SeqCst), 1);
        assert_eq!(*spy.last_size.lock().unwrap(), (16, 8));
        assert!(core.is_bound_to(&handle));
    }

    #[test]
    fn bind_without_size_stays_silent() {
        let core = ResourceCore::default();
        let spy = Arc::new(SpyHandle::default());
        let handle: BaseTextureRef = spy.clone();

        core.bind(&handle);

        assert_eq!(spy.resizes.load(Ordering::SeqCst), 0);
        assert!(!core.valid());
    }

    #[test]
    fn resize_notifies_only_on_change() {
        let core = ResourceCore::new(4, 4);
        let spy = Arc::new(SpyHandle::default());
        let handle: BaseTextureRef = spy.clone();
        core.bind(&handle);

        core.resize(4, 4);
        core.resize(8, 4);
        core.resize(8, 4);

        assert_eq!(spy.resizes.load(Ordering::SeqCst), 2);
        assert_eq!(core.width(), 8);
    }

    #[test]
    fn unbind_ignores_foreign_handle() {
        let core = ResourceCore::new(1, 1);
        let bound: BaseTextureRef = Arc::new(SpyHandle::default());
        let foreign: BaseTextureRef = Arc::new(SpyHandle::default());
        core.bind(&bound);

        assert!(!core.unbind(&foreign));
        assert!(core.is_bound_to(&bound));
        assert!(core.unbind(&bound));
        assert!(core.bound().is_none());
    }

    #[test]
    fn destroy_drops_binding_without_callbacks() {
        let core = ResourceCore::new(2, 2);
        let spy = Arc::new(SpyHandle::default());
        let handle: BaseTextureRef = spy.clone();
        core.bind(&handle);

        assert!(core.destroy());
        assert!(!core.destroy());
        core.update();

        assert!(core.bound().is_none());
        assert_eq!(spy.updates.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn url_sources_become_image_resources() {
        let resource = auto_detect_resource("layers/0.png".into(), ResourceOptions::default());
        assert!(resource.as_any().is::<ImageResource>());
        assert!(resource.needs_load());
    }
}
