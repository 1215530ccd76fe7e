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

//! The deduplicated worklist of items awaiting upload.

use std::collections::VecDeque;
use vellum_core::prepare::same_item;
use vellum_core::PreparableRef;

/// A FIFO of preparable items, deduplicated by identity.
#[derive(Default, Clone)]
pub struct UploadQueue {
    items: VecDeque<PreparableRef>,
}

impl UploadQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `item` unless it is already queued. Returns `true` if added.
    pub fn push(&mut self, item: PreparableRef) -> bool {
        if self.contains(&item) {
            return false;
        }
        self.items.push_back(item);
        true
    }

    /// `true` if this exact item is queued.
    pub fn contains(&self, item: &PreparableRef) -> bool {
        self.items.iter().any(|queued| same_item(queued, item))
    }

    /// Removes and returns the oldest item.
    pub fn pop_front(&mut self) -> Option<PreparableRef> {
        self.items.pop_front()
    }

    /// Moves every item of `other` to the back of this queue, skipping
    /// duplicates. Returns how many were added.
    pub fn append(&mut self, other: UploadQueue) -> usize {
        let mut added = 0;
        for item in other.items {
            if self.push(item) {
                added += 1;
            }
        }
        added
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops every queued item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Iterates the queue front to back.
    pub fn iter(&self) -> impl Iterator<Item = &PreparableRef> {
        self.items.iter()
    }
}

impl std::fmt::Debug for UploadQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadQueue")
            .field("len", &self.items.len())
            .finish()
    }
}
