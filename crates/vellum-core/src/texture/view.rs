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

use super::BaseTexture;
use crate::prepare::Preparable;
use std::any::Any;
use std::sync::Arc;

/// A rectangular region of a base texture, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width of the region.
    pub width: u32,
    /// Height of the region.
    pub height: u32,
}

/// A view onto a [`BaseTexture`]. Preparing a view uploads its base texture.
#[derive(Debug, Clone)]
pub struct Texture {
    base_texture: Arc<BaseTexture>,
    frame: Option<Frame>,
}

impl Texture {
    /// Creates a view covering the whole base texture.
    pub fn new(base_texture: Arc<BaseTexture>) -> Self {
        Self {
            base_texture,
            frame: None,
        }
    }

    /// Creates a view restricted to `frame`.
    pub fn with_frame(base_texture: Arc<BaseTexture>, frame: Frame) -> Self {
        Self {
            base_texture,
            frame: Some(frame),
        }
    }

    /// The texture this view samples from.
    pub fn base_texture(&self) -> &Arc<BaseTexture> {
        &self.base_texture
    }

    /// The sampled region; the full texture when no frame was given.
    pub fn frame(&self) -> Frame {
        self.frame.unwrap_or(Frame {
            x: 0,
            y: 0,
            width: self.base_texture.real_width(),
            height: self.base_texture.real_height(),
        })
    }
}

impl Preparable for Texture {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_destroyed(&self) -> bool {
        self.base_texture.destroyed()
    }
}
