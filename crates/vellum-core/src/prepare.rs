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

//! The capability contract for objects handed to the preparation pipeline.
//!
//! Items are duck-typed: the pipeline only asks whether an item has been
//! destroyed and, for containers, which children to visit. Everything else is
//! discovered by hooks through [`Preparable::as_any`] downcasts or the
//! optional capability accessors below.

use crate::geometry::Geometry;
use crate::texture::BaseTexture;
use std::any::Any;
use std::sync::Arc;

/// A shared reference to a preparable item. Identity is pointer identity.
pub type PreparableRef = Arc<dyn Preparable>;

/// An object that may be discovered and uploaded by the preparation pipeline.
pub trait Preparable: Any + Send + Sync {
    /// Exposes the concrete type for hook-side downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns `true` once the item has been destroyed. Destroyed items are
    /// dropped from the upload queue without reaching any upload hook.
    fn is_destroyed(&self) -> bool {
        false
    }

    /// Child items to run discovery on after this one (scene containers).
    fn children(&self) -> Vec<PreparableRef> {
        Vec::new()
    }

    /// Base textures this item renders with, if it owns several.
    fn textures(&self) -> Vec<Arc<BaseTexture>> {
        Vec::new()
    }

    /// Geometry this item draws, if any.
    fn geometry(&self) -> Option<Arc<Geometry>> {
        None
    }
}

/// Returns `true` if both references point at the same item.
pub fn same_item(a: &PreparableRef, b: &PreparableRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
