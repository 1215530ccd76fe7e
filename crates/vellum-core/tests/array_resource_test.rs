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

use anyhow::Result;
use async_trait::async_trait;
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};
use tokio::sync::Notify;
use vellum_core::resource::{
    ArrayResource, BufferResource, ImageResource, Resource, ResourceCore, ResourceOptions,
};
use vellum_core::texture::{BaseTexture, BaseTextureHandle, BaseTextureRef};
use vellum_core::ResourceError;

// --- Test Setup: a spy texture and image fixtures on disk ---
#[derive(Default)]
struct SpyTexture {
    set_real_size_calls: AtomicUsize,
    update_calls: AtomicUsize,
    last_size: Mutex<(u32, u32)>,
}

impl BaseTextureHandle for SpyTexture {
    fn set_real_size(&self, width: u32, height: u32) {
        self.set_real_size_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_size.lock().unwrap() = (width, height);
    }

    fn update(&self) {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> Result<PathBuf> {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255])).save(&path)?;
    Ok(path)
}

/// A layer whose load blocks until the test opens the gate.
#[derive(Debug, Default)]
struct GatedResource {
    core: ResourceCore,
    started: Notify,
    gate: Notify,
}

#[async_trait]
impl Resource for GatedResource {
    fn core(&self) -> &ResourceCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn needs_load(&self) -> bool {
        !self.core.valid()
    }

    async fn load(&self) -> Result<(), ResourceError> {
        self.started.notify_one();
        self.gate.notified().await;
        self.core.resize(32, 32);
        self.core.update();
        Ok(())
    }
}

fn fixture_layers(count: usize) -> Result<(TempDir, Vec<PathBuf>)> {
    let dir = tempdir()?;
    let path = write_png(dir.path(), "slug.png", 100, 100)?;
    Ok((dir, vec![path; count]))
}
// ---

#[test]
fn create_by_length_then_destroy() {
    let resource = ArrayResource::with_length(5, ResourceOptions::sized(100, 100));
    assert_eq!(resource.len(), 5);

    resource.destroy();

    assert!(resource.destroyed());
    assert!(resource.items().iter().all(|layer| layer.resource().is_none()));
}

#[test]
fn add_resource_at_errors_out_of_bounds() -> Result<()> {
    let (_dir, layers) = fixture_layers(1)?;
    let resource = ArrayResource::with_length(5, ResourceOptions::sized(100, 100));
    let image: Arc<dyn Resource> = Arc::new(ImageResource::new(&layers[0]));

    let err = resource.add_resource_at(image, 10).unwrap_err();

    assert!(err.to_string().contains("out of bounds"));
    assert!(resource.items().iter().all(|layer| layer.resource().is_none()));
    resource.destroy();
    Ok(())
}

#[tokio::test]
async fn load_array_of_url_resources() -> Result<()> {
    let (_dir, layers) = fixture_layers(4)?;
    let resource = Arc::new(ArrayResource::from_sources(
        layers.clone(),
        ResourceOptions::sized(100, 100),
    ));
    let spy = Arc::new(SpyTexture::default());
    let base_texture: BaseTextureRef = spy.clone();

    resource.bind(&base_texture);
    let res = resource.load().await?;

    assert!(Arc::ptr_eq(&res, &resource));
    assert_eq!(spy.set_real_size_calls.load(Ordering::SeqCst), 1);
    assert_eq!(*spy.last_size.lock().unwrap(), (100, 100));
    for layer in resource.items() {
        let item = layer.resource().expect("every layer is populated");
        assert!(item.valid());
        assert_eq!(item.width(), 100);
        assert_eq!(item.height(), 100);
        assert_eq!((layer.real_width(), layer.real_height()), (100, 100));
    }

    resource.unbind(&base_texture);
    resource.destroy();
    Ok(())
}

#[tokio::test]
async fn layers_are_scaled_to_the_shared_size() -> Result<()> {
    let dir = tempdir()?;
    let small = write_png(dir.path(), "small.png", 10, 20)?;
    let resource = Arc::new(ArrayResource::from_sources(
        vec![small.clone(), small],
        ResourceOptions::sized(64, 64),
    ));

    resource.load().await?;

    for layer in resource.items() {
        let item = layer.resource().unwrap();
        assert_eq!((item.width(), item.height()), (64, 64));
    }
    Ok(())
}

#[tokio::test]
async fn failed_layer_fails_the_whole_load() -> Result<()> {
    let (dir, mut layers) = fixture_layers(2)?;
    layers.push(dir.path().join("missing.png"));
    let resource = Arc::new(ArrayResource::from_sources(layers, ResourceOptions::sized(100, 100)));
    let spy = Arc::new(SpyTexture::default());
    let base_texture: BaseTextureRef = spy.clone();
    resource.bind(&base_texture);
    let updates_after_bind = spy.update_calls.load(Ordering::SeqCst);

    let err = resource.load().await.unwrap_err();

    assert!(matches!(err, ResourceError::LoadFailed { .. }));
    assert_eq!(spy.set_real_size_calls.load(Ordering::SeqCst), 1);
    assert_eq!(spy.update_calls.load(Ordering::SeqCst), updates_after_bind);
    Ok(())
}

#[tokio::test]
async fn load_after_destroy_is_rejected() -> Result<()> {
    let (_dir, layers) = fixture_layers(2)?;
    let resource = Arc::new(ArrayResource::from_sources(layers, ResourceOptions::sized(100, 100)));

    resource.destroy();

    assert_eq!(resource.load().await.unwrap_err(), ResourceError::Destroyed);
    Ok(())
}

#[tokio::test]
async fn destroy_during_load_discards_the_result() -> Result<()> {
    let resource = Arc::new(ArrayResource::with_length(2, ResourceOptions::default()));
    let gated = Arc::new(GatedResource::default());
    resource.add_resource_at(gated.clone(), 0)?;
    resource.add_resource_at(Arc::new(BufferResource::new(vec![0; 64], 4, 4)), 1)?;
    let spy = Arc::new(SpyTexture::default());
    let base_texture: BaseTextureRef = spy.clone();
    resource.bind(&base_texture);
    let resizes_after_bind = spy.set_real_size_calls.load(Ordering::SeqCst);
    let updates_after_bind = spy.update_calls.load(Ordering::SeqCst);

    let loading = tokio::spawn({
        let resource = resource.clone();
        async move { resource.load().await }
    });
    gated.started.notified().await;
    resource.destroy();
    gated.gate.notify_one();

    let result = loading.await?;

    assert!(matches!(result, Err(ResourceError::Destroyed)));
    assert!(resource.destroyed());
    assert_eq!(spy.set_real_size_calls.load(Ordering::SeqCst), resizes_after_bind);
    assert_eq!(spy.update_calls.load(Ordering::SeqCst), updates_after_bind);
    Ok(())
}

#[tokio::test]
async fn base_texture_tracks_array_size_through_load() -> Result<()> {
    let (_dir, layers) = fixture_layers(3)?;
    let resource = Arc::new(ArrayResource::from_sources(layers, ResourceOptions::default()));
    let texture = BaseTexture::from_resource(resource.clone());
    assert!(!texture.valid());

    resource.load().await?;

    assert_eq!((texture.real_width(), texture.real_height()), (100, 100));
    // One update from binding, one from the completed load.
    assert_eq!(texture.dirty_id(), 2);
    Ok(())
}
