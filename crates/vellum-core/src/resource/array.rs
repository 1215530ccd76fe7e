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

use super::{auto_detect_resource, Resource, ResourceCore, ResourceOptions, ResourceSource};
use crate::error::ResourceError;
use crate::texture::{BaseTextureHandle, BaseTextureRef};
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};
use tokio::task::JoinSet;

/// One slot of an [`ArrayResource`].
///
/// The slot's resource binds to the slot itself rather than to the shared
/// texture, so per-layer size reports never reach the shared texture. The
/// `bound` flag records whether the slot currently participates in the
/// array's texture binding. While bound, content updates are forwarded to
/// the shared texture, except during an array load, which reports once at
/// the end.
pub struct ArrayLayer {
    index: usize,
    this: Weak<ArrayLayer>,
    array: Weak<ResourceCore>,
    loads_in_flight: Arc<AtomicUsize>,
    resource: RwLock<Option<Arc<dyn Resource>>>,
    bound: AtomicBool,
    real_size: Mutex<(u32, u32)>,
    dirty_id: AtomicU64,
}

impl ArrayLayer {
    fn new(
        index: usize,
        array: Weak<ResourceCore>,
        loads_in_flight: Arc<AtomicUsize>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            index,
            this: this.clone(),
            array,
            loads_in_flight,
            resource: RwLock::new(None),
            bound: AtomicBool::new(false),
            real_size: Mutex::new((0, 0)),
            dirty_id: AtomicU64::new(0),
        })
    }

    /// Position of this slot in the array.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The resource held by this slot, if populated.
    pub fn resource(&self) -> Option<Arc<dyn Resource>> {
        self.resource.read().unwrap().clone()
    }

    /// `true` while the array is bound to a texture and this slot is populated.
    pub fn is_bound(&self) -> bool {
        self.bound.load(Ordering::Acquire)
    }

    /// Width last reported by the slot's resource.
    pub fn real_width(&self) -> u32 {
        self.real_size.lock().unwrap().0
    }

    /// Height last reported by the slot's resource.
    pub fn real_height(&self) -> u32 {
        self.real_size.lock().unwrap().1
    }

    /// Bumped whenever the slot's resource reports new content.
    pub fn dirty_id(&self) -> u64 {
        self.dirty_id.load(Ordering::Acquire)
    }

    fn handle(&self) -> Option<BaseTextureRef> {
        self.this.upgrade().map(|layer| layer as BaseTextureRef)
    }

    fn set_resource(&self, resource: Arc<dyn Resource>) {
        let Some(handle) = self.handle() else {
            return;
        };
        let previous = self.resource.write().unwrap().replace(resource.clone());
        if let Some(previous) = previous {
            previous.unbind(&handle);
        }
        resource.bind(&handle);
    }

    fn set_bound(&self, bound: bool) {
        let populated = self.resource.read().unwrap().is_some();
        self.bound.store(bound && populated, Ordering::Release);
    }

    fn release(&self) {
        self.bound.store(false, Ordering::Release);
        if let Some(resource) = self.resource.write().unwrap().take() {
            resource.destroy();
        }
    }
}

impl BaseTextureHandle for ArrayLayer {
    fn set_real_size(&self, width: u32, height: u32) {
        *self.real_size.lock().unwrap() = (width, height);
    }

    fn update(&self) {
        self.dirty_id.fetch_add(1, Ordering::AcqRel);
        if !self.is_bound() || self.loads_in_flight.load(Ordering::Acquire) > 0 {
            return;
        }
        if let Some(array) = self.array.upgrade() {
            array.update();
        }
    }
}

impl fmt::Debug for ArrayLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayLayer")
            .field("index", &self.index)
            .field("populated", &self.resource.read().unwrap().is_some())
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// A texture-array resource: a fixed number of independently loaded layers
/// bound to one shared texture.
///
/// The array owns its layers. Size and content changes are reported to the
/// shared texture once per array operation, not once per layer.
#[derive(Debug)]
pub struct ArrayResource {
    core: Arc<ResourceCore>,
    items: Vec<Arc<ArrayLayer>>,
    loads_in_flight: Arc<AtomicUsize>,
}

impl ArrayResource {
    /// Creates `length` empty slots sharing the size in `options`.
    pub fn with_length(length: usize, options: ResourceOptions) -> Self {
        let core = Arc::new(ResourceCore::new(options.width, options.height));
        let loads_in_flight = Arc::new(AtomicUsize::new(0));
        let items = (0..length)
            .map(|index| ArrayLayer::new(index, Arc::downgrade(&core), loads_in_flight.clone()))
            .collect();
        Self {
            core,
            items,
            loads_in_flight,
        }
    }

    /// Creates one slot per source, building each layer's resource from its
    /// descriptor with the shared `options`.
    pub fn from_sources<I, S>(sources: I, options: ResourceOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ResourceSource>,
    {
        let sources: Vec<ResourceSource> = sources.into_iter().map(Into::into).collect();
        let array = Self::with_length(sources.len(), options);
        for (layer, source) in array.items.iter().zip(sources) {
            array.place(layer, auto_detect_resource(source, options));
        }
        array
    }

    /// Number of slots. Fixed at construction.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` for an array without slots.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The slots, in layer order.
    pub fn items(&self) -> &[Arc<ArrayLayer>] {
        &self.items
    }

    /// Returns the slot at `index`.
    pub fn layer(&self, index: usize) -> Result<&Arc<ArrayLayer>, ResourceError> {
        self.items.get(index).ok_or(ResourceError::OutOfBounds {
            index,
            length: self.items.len(),
        })
    }

    /// Puts `resource` into the slot at `index`.
    ///
    /// The index is checked before anything changes. If the array is bound
    /// to a texture, the slot joins that binding immediately.
    pub fn add_resource_at(
        &self,
        resource: Arc<dyn Resource>,
        index: usize,
    ) -> Result<&Self, ResourceError> {
        let layer = self.layer(index)?;
        if self.core.is_destroyed() {
            return Err(ResourceError::Destroyed);
        }
        self.place(layer, resource);
        Ok(self)
    }

    /// Loads every slot that still needs loading and resolves with the array.
    ///
    /// The shared texture is resized and updated once, after all layers have
    /// loaded. The first layer failure fails the whole load; layers that had
    /// already loaded stay loaded.
    pub async fn load(self: &Arc<Self>) -> Result<Arc<Self>, ResourceError> {
        self.load_layers().await?;
        Ok(Arc::clone(self))
    }

    fn place(&self, layer: &ArrayLayer, resource: Arc<dyn Resource>) {
        if resource.valid() && !self.core.valid() {
            self.core.resize(resource.width(), resource.height());
        }
        layer.set_resource(resource);
        layer.set_bound(self.core.bound().is_some());
    }

    async fn load_layers(&self) -> Result<(), ResourceError> {
        if self.core.is_destroyed() {
            return Err(ResourceError::Destroyed);
        }

        let pending: Vec<Arc<dyn Resource>> = self
            .items
            .iter()
            .filter_map(|layer| layer.resource())
            .filter(|resource| resource.needs_load())
            .collect();
        log::debug!(
            "Loading {} of {} array layers.",
            pending.len(),
            self.items.len()
        );

        let in_flight = LoadsInFlight::enter(&self.loads_in_flight);
        let mut tasks = JoinSet::new();
        for resource in pending {
            tasks.spawn(async move { resource.load().await });
        }
        let mut outcome = Ok(());
        while let Some(joined) = tasks.join_next().await {
            let loaded = joined
                .map_err(|e| ResourceError::TaskFailed(e.to_string()))
                .and_then(|loaded| loaded);
            if let Err(e) = loaded {
                outcome = Err(e);
                break;
            }
        }
        // Remaining layers must stop before forwarding resumes.
        tasks.shutdown().await;
        drop(in_flight);
        outcome?;

        if self.core.is_destroyed() {
            return Err(ResourceError::Destroyed);
        }

        let (width, height) = self
            .items
            .iter()
            .filter_map(|layer| layer.resource())
            .find(|resource| resource.valid())
            .map(|resource| (resource.width(), resource.height()))
            .unwrap_or((self.core.width(), self.core.height()));
        self.core.resize(width, height);
        self.core.update();
        Ok(())
    }
}

/// Holds layer update forwarding off for the duration of an array load.
struct LoadsInFlight<'a>(&'a AtomicUsize);

impl<'a> LoadsInFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for LoadsInFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

#[async_trait]
impl Resource for ArrayResource {
    fn core(&self) -> &ResourceCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn bind(&self, handle: &BaseTextureRef) {
        if self.core.is_destroyed() {
            return;
        }
        self.core.bind(handle);
        for layer in &self.items {
            layer.set_bound(true);
        }
        self.core.update();
    }

    fn unbind(&self, handle: &BaseTextureRef) {
        if self.core.unbind(handle) {
            for layer in &self.items {
                layer.set_bound(false);
            }
        }
    }

    fn needs_load(&self) -> bool {
        !self.core.is_destroyed()
            && self
                .items
                .iter()
                .filter_map(|layer| layer.resource())
                .any(|resource| resource.needs_load())
    }

    async fn load(&self) -> Result<(), ResourceError> {
        self.load_layers().await
    }

    fn destroy(&self) {
        if self.core.destroy() {
            for layer in &self.items {
                layer.release();
            }
            log::debug!("Destroyed array resource with {} layers.", self.items.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::BufferResource;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct SpyTexture {
        resizes: AtomicUsize,
        updates: AtomicUsize,
    }

    impl BaseTextureHandle for SpyTexture {
        fn set_real_size(&self, _width: u32, _height: u32) {
            self.resizes.fetch_add(1, Ordering::SeqCst);
        }

        fn update(&self) {
            self.updates.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn pixels(size: u32) -> Arc<dyn Resource> {
        Arc::new(BufferResource::new(vec![0; (size * size * 4) as usize], size, size))
    }

    #[test]
    fn add_resource_at_fills_the_slot() {
        let array = ArrayResource::with_length(3, ResourceOptions::sized(4, 4));
        let resource = pixels(4);

        array.add_resource_at(resource.clone(), 2).unwrap();

        let stored = array.items()[2].resource().unwrap();
        assert!(Arc::ptr_eq(&stored, &resource));
        assert!(array.items()[0].resource().is_none());
    }

    #[test]
    fn add_resource_at_rejects_out_of_bounds() {
        let array = ArrayResource::with_length(5, ResourceOptions::sized(100, 100));

        let err = array.add_resource_at(pixels(4), 10).unwrap_err();

        assert_eq!(err, ResourceError::OutOfBounds { index: 10, length: 5 });
        assert!(err.to_string().contains("out of bounds"));
        assert!(array.items().iter().all(|layer| layer.resource().is_none()));
    }

    #[test]
    fn first_valid_resource_sizes_an_unsized_array() {
        let array = ArrayResource::with_length(2, ResourceOptions::default());
        array.add_resource_at(pixels(8), 1).unwrap();
        assert_eq!((array.width(), array.height()), (8, 8));
    }

    #[test]
    fn bind_reports_size_once_and_marks_populated_slots() {
        let array = ArrayResource::with_length(3, ResourceOptions::sized(16, 16));
        array.add_resource_at(pixels(16), 0).unwrap();
        array.add_resource_at(pixels(16), 1).unwrap();
        let spy = Arc::new(SpyTexture::default());
        let handle: BaseTextureRef = spy.clone();

        array.bind(&handle);

        assert_eq!(spy.resizes.load(Ordering::SeqCst), 1);
        assert_eq!(spy.updates.load(Ordering::SeqCst), 1);
        assert!(array.items()[0].is_bound());
        assert!(array.items()[1].is_bound());
        assert!(!array.items()[2].is_bound());
    }

    #[test]
    fn slot_added_while_bound_joins_the_binding() {
        let array = ArrayResource::with_length(2, ResourceOptions::sized(4, 4));
        let handle: BaseTextureRef = Arc::new(SpyTexture::default());
        array.bind(&handle);

        array.add_resource_at(pixels(4), 1).unwrap();

        assert!(array.items()[1].is_bound());
    }

    #[test]
    fn layer_content_change_reaches_the_shared_texture() {
        let array = ArrayResource::with_length(2, ResourceOptions::sized(2, 2));
        let layer = Arc::new(BufferResource::new(vec![0; 16], 2, 2));
        array.add_resource_at(layer.clone(), 0).unwrap();
        let spy = Arc::new(SpyTexture::default());
        let handle: BaseTextureRef = spy.clone();
        array.bind(&handle);
        assert_eq!(spy.updates.load(Ordering::SeqCst), 1);

        layer.write(vec![255; 16]);

        assert_eq!(spy.updates.load(Ordering::SeqCst), 2);
        assert_eq!(spy.resizes.load(Ordering::SeqCst), 1);
        assert_eq!(array.items()[0].dirty_id(), 1);

        array.unbind(&handle);
        layer.write(vec![0; 16]);

        assert_eq!(spy.updates.load(Ordering::SeqCst), 2);
        assert_eq!(array.items()[0].dirty_id(), 2);
    }

    #[test]
    fn unbind_with_foreign_handle_is_a_no_op() {
        let array = ArrayResource::with_length(1, ResourceOptions::sized(4, 4));
        array.add_resource_at(pixels(4), 0).unwrap();
        let bound: BaseTextureRef = Arc::new(SpyTexture::default());
        let foreign: BaseTextureRef = Arc::new(SpyTexture::default());
        array.bind(&bound);

        array.unbind(&foreign);
        assert!(array.core().is_bound_to(&bound));
        assert!(array.items()[0].is_bound());

        array.unbind(&bound);
        assert!(array.core().bound().is_none());
        assert!(!array.items()[0].is_bound());
    }

    #[test]
    fn destroy_releases_every_slot() {
        let array = ArrayResource::with_length(5, ResourceOptions::sized(100, 100));
        let resource = pixels(100);
        array.add_resource_at(resource.clone(), 0).unwrap();
        let spy = Arc::new(SpyTexture::default());
        let handle: BaseTextureRef = spy.clone();
        array.bind(&handle);
        let updates_before = spy.updates.load(Ordering::SeqCst);

        array.destroy();

        assert!(array.destroyed());
        assert!(resource.destroyed());
        assert!(array.items().iter().all(|layer| layer.resource().is_none()));
        assert!(array.core().bound().is_none());
        assert_eq!(spy.updates.load(Ordering::SeqCst), updates_before);
        assert_eq!(
            array.add_resource_at(pixels(1), 0).unwrap_err(),
            ResourceError::Destroyed
        );
    }

    #[tokio::test]
    async fn load_of_valid_layers_resolves_with_the_array() {
        let array = Arc::new(ArrayResource::with_length(2, ResourceOptions::sized(4, 4)));
        array.add_resource_at(pixels(4), 0).unwrap();
        array.add_resource_at(pixels(4), 1).unwrap();
        assert!(!array.needs_load());

        let loaded = array.load().await.unwrap();

        assert!(Arc::ptr_eq(&loaded, &array));
    }
}
