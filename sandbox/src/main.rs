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

// Vellum Sandbox
// Prepares an array texture and a mesh against a backend that only logs.
//
// Usage: sandbox [image paths...]
// With no paths, the array layers are filled from in-memory buffers.

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use vellum_core::geometry::{BufferKind, Geometry, GeometryBuffer};
use vellum_core::resource::{ArrayResource, BufferResource, ResourceOptions};
use vellum_core::texture::BaseTexture;
use vellum_core::{ManualTicker, Preparable, RendererHandle};
use vellum_prepare::{BasePrepare, PrepareConfig, ResourceUploader, UploadHelper};

const CONFIG_PATH: &str = "sandbox/prepare.ron";
const LAYER_SIZE: u32 = 64;

struct LoggingUploader;

impl ResourceUploader for LoggingUploader {
    fn upload_texture(&self, _renderer: &RendererHandle, texture: &BaseTexture) -> bool {
        if !texture.valid() {
            log::warn!("Skipping texture without a size.");
            return false;
        }
        log::info!(
            "Uploading texture {}x{} (dirty id {}).",
            texture.real_width(),
            texture.real_height(),
            texture.dirty_id()
        );
        true
    }

    fn upload_geometry(&self, _renderer: &RendererHandle, geometry: &Geometry) -> bool {
        log::info!(
            "Uploading geometry: {} buffers, {} bytes.",
            geometry.buffers().len(),
            geometry.byte_len()
        );
        true
    }
}

/// A scene node grouping what one frame draws.
struct Scene {
    children: Vec<Arc<dyn Preparable>>,
}

impl Preparable for Scene {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn children(&self) -> Vec<Arc<dyn Preparable>> {
        self.children.clone()
    }
}

fn load_config() -> Result<PrepareConfig> {
    match std::fs::read_to_string(CONFIG_PATH) {
        Ok(text) => Ok(PrepareConfig::from_ron_str(&text)?),
        Err(e) => {
            log::warn!("Could not read '{CONFIG_PATH}' ({e}); using defaults.");
            Ok(PrepareConfig::default())
        }
    }
}

async fn build_array(paths: Vec<PathBuf>) -> Result<Arc<ArrayResource>> {
    if paths.is_empty() {
        let array = ArrayResource::with_length(3, ResourceOptions::sized(LAYER_SIZE, LAYER_SIZE));
        for index in 0..array.len() {
            let shade = (index as u8).wrapping_mul(80);
            let data = vec![shade; (LAYER_SIZE * LAYER_SIZE * 4) as usize];
            let layer = BufferResource::new(data, LAYER_SIZE, LAYER_SIZE);
            array.add_resource_at(Arc::new(layer), index)?;
        }
        return Ok(Arc::new(array));
    }

    let array = Arc::new(ArrayResource::from_sources(paths, ResourceOptions::default()));
    Ok(array.load().await?)
}

#[tokio::main]
async fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let ticker = Arc::new(ManualTicker::new());
    let renderer = RendererHandle::new("sandbox");
    let prepare = BasePrepare::with_config(renderer.clone(), ticker.clone(), &config);
    prepare.set_upload_hook_helper(Some(UploadHelper::new(renderer, Arc::new(LoggingUploader))));

    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    let array = build_array(paths).await?;
    log::info!("Array texture ready with {} layers.", array.len());

    let texture = BaseTexture::from_resource(array.clone());
    let geometry = Arc::new(Geometry::new(vec![
        GeometryBuffer {
            kind: BufferKind::Vertex,
            data: vec![0; 4 * 5 * 4],
        },
        GeometryBuffer {
            kind: BufferKind::Index,
            data: vec![0; 6 * 2],
        },
    ]));
    let scene = Scene {
        children: vec![texture as Arc<dyn Preparable>, geometry],
    };

    // Nothing is queued yet, so an empty scene settles before this returns.
    prepare.upload_with(Arc::new(Scene { children: Vec::new() }), || {
        log::info!("Empty scene settled immediately.");
    });
    let handle = prepare.upload(Arc::new(scene));

    let mut frame = 0;
    while prepare.is_ticking() {
        frame += 1;
        log::debug!("Frame {frame}: {} items queued.", prepare.queue_len());
        ticker.tick();
    }
    handle.await?;
    log::info!("Scene prepared after {frame} frames.");

    prepare.destroy();
    Ok(())
}
