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

use super::{Resource, ResourceCore};
use async_trait::async_trait;
use std::any::Any;
use std::sync::Mutex;

/// Raw pixel data of a known size. Valid as soon as it is created.
#[derive(Debug)]
pub struct BufferResource {
    core: ResourceCore,
    data: Mutex<Vec<u8>>,
}

impl BufferResource {
    /// Wraps `data` as a `width` x `height` resource.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            core: ResourceCore::new(width, height),
            data: Mutex::new(data),
        }
    }

    /// Length of the pixel data in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.lock().unwrap().len()
    }

    /// Replaces the pixel data and signals the bound texture.
    pub fn write(&self, data: Vec<u8>) {
        *self.data.lock().unwrap() = data;
        self.core.update();
    }
}

#[async_trait]
impl Resource for BufferResource {
    fn core(&self) -> &ResourceCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn destroy(&self) {
        if self.core.destroy() {
            self.data.lock().unwrap().clear();
        }
    }
}
