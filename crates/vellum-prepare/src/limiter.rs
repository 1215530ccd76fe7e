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

//! Per-frame budgets bounding how much of the queue one tick may process.

use std::time::{Duration, Instant};

/// Decides how many queued items a single frame may process.
pub trait UploadLimiter: Send {
    /// Resets the budget at the start of a frame.
    fn begin_frame(&mut self);

    /// Consumes budget for one item. Returns `false` once the frame is spent.
    fn allowed_to_upload(&mut self) -> bool;
}

/// Allows a fixed number of items per frame.
#[derive(Debug, Clone)]
pub struct CountLimiter {
    max_items_per_frame: usize,
    items_left: usize,
}

impl CountLimiter {
    /// Creates a limiter allowing `max_items_per_frame` items per frame.
    pub fn new(max_items_per_frame: usize) -> Self {
        Self {
            max_items_per_frame,
            items_left: 0,
        }
    }
}

impl UploadLimiter for CountLimiter {
    fn begin_frame(&mut self) {
        self.items_left = self.max_items_per_frame;
    }

    fn allowed_to_upload(&mut self) -> bool {
        if self.items_left == 0 {
            return false;
        }
        self.items_left -= 1;
        true
    }
}

/// Allows items until a wall-clock budget for the frame is spent.
#[derive(Debug, Clone)]
pub struct TimeLimiter {
    max_per_frame: Duration,
    frame_start: Instant,
}

impl TimeLimiter {
    /// Creates a limiter with a per-frame time budget.
    pub fn new(max_per_frame: Duration) -> Self {
        Self {
            max_per_frame,
            frame_start: Instant::now(),
        }
    }
}

impl UploadLimiter for TimeLimiter {
    fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    fn allowed_to_upload(&mut self) -> bool {
        self.frame_start.elapsed() < self.max_per_frame
    }
}
