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

//! The context handed to every upload hook.

use std::fmt;
use std::sync::Arc;
use vellum_core::geometry::Geometry;
use vellum_core::texture::BaseTexture;
use vellum_core::RendererHandle;

/// The GPU-side half of the built-in upload hooks.
///
/// Implemented by the render backend; returns `true` when the resource was
/// uploaded (or was already resident).
pub trait ResourceUploader: Send + Sync {
    /// Uploads a base texture and its resource's data.
    fn upload_texture(&self, renderer: &RendererHandle, texture: &BaseTexture) -> bool;

    /// Uploads the buffers of a geometry.
    fn upload_geometry(&self, renderer: &RendererHandle, geometry: &Geometry) -> bool;
}

/// Renderer plus uploader, passed to every upload hook.
#[derive(Clone)]
pub struct UploadHelper {
    renderer: RendererHandle,
    uploader: Arc<dyn ResourceUploader>,
}

impl UploadHelper {
    /// Bundles a renderer with the uploader that drives it.
    pub fn new(renderer: RendererHandle, uploader: Arc<dyn ResourceUploader>) -> Self {
        Self { renderer, uploader }
    }

    /// The renderer uploads are issued against.
    pub fn renderer(&self) -> &RendererHandle {
        &self.renderer
    }

    /// The backend uploader.
    pub fn uploader(&self) -> &dyn ResourceUploader {
        self.uploader.as_ref()
    }
}

impl fmt::Debug for UploadHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadHelper")
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}
