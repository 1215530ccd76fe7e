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

use super::{Resource, ResourceCore, ResourceOptions};
use crate::error::ResourceError;
use ::image::imageops::FilterType;
use ::image::{ImageReader, RgbaImage};
use async_trait::async_trait;
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A texture resource decoded from an image file.
///
/// The size is unknown until [`load`](Resource::load) completes. When the
/// resource was created with a non-zero target size the decoded image is
/// scaled to it, so every layer of an array shares one size.
#[derive(Debug)]
pub struct ImageResource {
    url: PathBuf,
    target: ResourceOptions,
    core: ResourceCore,
    pixels: Mutex<Option<Arc<RgbaImage>>>,
    loaded: AtomicBool,
}

impl ImageResource {
    /// Creates an unloaded image resource for `url`.
    pub fn new(url: impl Into<PathBuf>) -> Self {
        Self::with_options(url, ResourceOptions::default())
    }

    /// Creates an unloaded image resource that is scaled to `options` on load.
    pub fn with_options(url: impl Into<PathBuf>, options: ResourceOptions) -> Self {
        Self {
            url: url.into(),
            target: options,
            core: ResourceCore::default(),
            pixels: Mutex::new(None),
            loaded: AtomicBool::new(false),
        }
    }

    /// The file this resource decodes.
    pub fn url(&self) -> &Path {
        &self.url
    }

    /// The decoded RGBA pixels, once loaded.
    pub fn pixels(&self) -> Option<Arc<RgbaImage>> {
        self.pixels.lock().unwrap().clone()
    }

    fn decode(path: &Path, target: ResourceOptions) -> Result<RgbaImage, String> {
        let image = ImageReader::open(path)
            .map_err(|e| e.to_string())?
            .with_guessed_format()
            .map_err(|e| e.to_string())?
            .decode()
            .map_err(|e| e.to_string())?
            .to_rgba8();

        let wants_resize = target.width > 0
            && target.height > 0
            && (image.width() != target.width || image.height() != target.height);
        if wants_resize {
            Ok(::image::imageops::resize(
                &image,
                target.width,
                target.height,
                FilterType::Triangle,
            ))
        } else {
            Ok(image)
        }
    }
}

#[async_trait]
impl Resource for ImageResource {
    fn core(&self) -> &ResourceCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn needs_load(&self) -> bool {
        !self.loaded.load(Ordering::Acquire) && !self.core.is_destroyed()
    }

    async fn load(&self) -> Result<(), ResourceError> {
        if self.core.is_destroyed() {
            return Err(ResourceError::Destroyed);
        }
        if self.loaded.load(Ordering::Acquire) {
            return Ok(());
        }

        let path = self.url.clone();
        let target = self.target;
        let decoded = tokio::task::spawn_blocking(move || Self::decode(&path, target))
            .await
            .map_err(|e| ResourceError::TaskFailed(e.to_string()))?
            .map_err(|reason| ResourceError::LoadFailed {
                source: self.url.display().to_string(),
                reason,
            })?;

        // Destroyed while decoding: the result has nowhere to go.
        if self.core.is_destroyed() {
            return Err(ResourceError::Destroyed);
        }

        let (width, height) = decoded.dimensions();
        *self.pixels.lock().unwrap() = Some(Arc::new(decoded));
        self.loaded.store(true, Ordering::Release);
        log::debug!("Loaded image '{}' ({width}x{height}).", self.url.display());

        self.core.resize(width, height);
        self.core.update();
        Ok(())
    }

    fn destroy(&self) {
        if self.core.destroy() {
            self.pixels.lock().unwrap().take();
        }
    }
}
