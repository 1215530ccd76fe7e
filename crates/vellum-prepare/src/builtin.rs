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

//! The hooks every scheduler starts with.
//!
//! Find hooks recognise the first-party item kinds (base textures, texture
//! views, geometry and objects exposing them); upload hooks hand the queued
//! textures and geometry to the [`ResourceUploader`](crate::ResourceUploader).

use crate::helper::UploadHelper;
use crate::hooks::{FindHook, HookChain, UploadHook};
use crate::queue::UploadQueue;
use vellum_core::geometry::Geometry;
use vellum_core::texture::{BaseTexture, Texture};
use vellum_core::PreparableRef;

/// Number of built-in find hooks.
pub const DEFAULT_FIND_HOOKS: usize = 5;

/// Number of built-in upload hooks.
pub const DEFAULT_UPLOAD_HOOKS: usize = 2;

/// Queues every base texture an item renders with.
pub fn find_multiple_base_textures(item: &PreparableRef, queue: &mut UploadQueue) -> bool {
    let textures = item.textures();
    if textures.is_empty() {
        return false;
    }
    for texture in textures {
        queue.push(texture);
    }
    true
}

/// Queues an item that is itself a base texture.
pub fn find_base_texture(item: &PreparableRef, queue: &mut UploadQueue) -> bool {
    if !item.as_any().is::<BaseTexture>() {
        return false;
    }
    queue.push(item.clone());
    true
}

/// Queues the base texture behind a texture view.
pub fn find_texture(item: &PreparableRef, queue: &mut UploadQueue) -> bool {
    let Some(texture) = item.as_any().downcast_ref::<Texture>() else {
        return false;
    };
    let base: PreparableRef = texture.base_texture().clone();
    queue.push(base);
    true
}

/// Queues an item that is itself geometry.
pub fn find_geometry(item: &PreparableRef, queue: &mut UploadQueue) -> bool {
    if !item.as_any().is::<Geometry>() {
        return false;
    }
    queue.push(item.clone());
    true
}

/// Queues the geometry an item draws.
pub fn find_mesh_geometry(item: &PreparableRef, queue: &mut UploadQueue) -> bool {
    match item.geometry() {
        Some(geometry) => {
            queue.push(geometry);
            true
        }
        None => false,
    }
}

/// Uploads a queued base texture.
pub fn upload_base_texture(helper: Option<&UploadHelper>, item: &PreparableRef) -> bool {
    let Some(texture) = item.as_any().downcast_ref::<BaseTexture>() else {
        return false;
    };
    match helper {
        Some(helper) => helper.uploader().upload_texture(helper.renderer(), texture),
        None => {
            log::trace!("No upload helper set; skipping base texture upload.");
            false
        }
    }
}

/// Uploads queued geometry.
pub fn upload_geometry(helper: Option<&UploadHelper>, item: &PreparableRef) -> bool {
    let Some(geometry) = item.as_any().downcast_ref::<Geometry>() else {
        return false;
    };
    match helper {
        Some(helper) => helper.uploader().upload_geometry(helper.renderer(), geometry),
        None => {
            log::trace!("No upload helper set; skipping geometry upload.");
            false
        }
    }
}

/// The built-in find chain, in run order.
pub fn default_find_hooks() -> HookChain<FindHook> {
    let mut chain = HookChain::<FindHook>::new();
    chain
        .register("find_multiple_base_textures", find_multiple_base_textures)
        .register("find_base_texture", find_base_texture)
        .register("find_texture", find_texture)
        .register("find_geometry", find_geometry)
        .register("find_mesh_geometry", find_mesh_geometry);
    chain
}

/// The built-in upload chain, in run order.
pub fn default_upload_hooks() -> HookChain<UploadHook> {
    let mut chain = HookChain::<UploadHook>::new();
    chain
        .register("upload_base_texture", upload_base_texture)
        .register("upload_geometry", upload_geometry);
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chains_match_advertised_counts() {
        assert_eq!(default_find_hooks().len(), DEFAULT_FIND_HOOKS);
        assert_eq!(default_upload_hooks().len(), DEFAULT_UPLOAD_HOOKS);
    }

    #[test]
    fn texture_view_queues_its_base_texture() {
        let base = BaseTexture::new();
        let view: PreparableRef = std::sync::Arc::new(Texture::new(base.clone()));
        let mut queue = UploadQueue::new();

        assert!(default_find_hooks().run(&view, &mut queue));

        let expected: PreparableRef = base;
        assert_eq!(queue.len(), 1);
        assert!(queue.contains(&expected));
    }

    #[test]
    fn upload_without_helper_declines() {
        let item: PreparableRef = BaseTexture::new();
        assert!(!default_upload_hooks().run(None, &item));
    }
}
