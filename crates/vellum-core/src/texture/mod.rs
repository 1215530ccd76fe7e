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

//! Base textures and the handle contract resources report size changes to.

mod base_texture;
mod view;

pub use base_texture::*;
pub use view::*;

use std::sync::Arc;

/// The receiving end of a resource binding.
///
/// A resource bound to a handle reports its real pixel size through
/// [`set_real_size`](BaseTextureHandle::set_real_size) and signals new
/// content through [`update`](BaseTextureHandle::update).
pub trait BaseTextureHandle: Send + Sync {
    /// Records the real pixel dimensions of the bound resource.
    fn set_real_size(&self, width: u32, height: u32);

    /// Marks the texture dirty so its content is re-uploaded.
    fn update(&self);
}

/// A shared reference to a base texture handle.
pub type BaseTextureRef = Arc<dyn BaseTextureHandle>;

/// Returns `true` if both handles point at the same texture.
pub fn same_handle(a: &BaseTextureRef, b: &BaseTextureRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
