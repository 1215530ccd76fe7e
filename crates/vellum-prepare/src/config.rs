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

//! Scheduler configuration, loadable from RON.

use crate::error::PrepareError;
use crate::limiter::{CountLimiter, TimeLimiter, UploadLimiter};
use serde::Deserialize;
use std::time::Duration;

/// Default number of queued items processed per frame.
pub const UPLOADS_PER_FRAME: usize = 4;

/// Tunables for [`BasePrepare`](crate::BasePrepare).
///
/// ```ron
/// (
///     uploads_per_frame: 8,
///     frame_budget_ms: Some(2),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PrepareConfig {
    /// Items processed per frame when no time budget is set.
    pub uploads_per_frame: usize,
    /// Optional per-frame time budget in milliseconds. Takes precedence over
    /// `uploads_per_frame` when present.
    pub frame_budget_ms: Option<u64>,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            uploads_per_frame: UPLOADS_PER_FRAME,
            frame_budget_ms: None,
        }
    }
}

impl PrepareConfig {
    /// Parses a configuration from RON text. Missing fields keep their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self, PrepareError> {
        let config: Self = ron::from_str(text).map_err(|e| PrepareError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects budgets that would never let an item through.
    pub fn validate(&self) -> Result<(), PrepareError> {
        if self.uploads_per_frame == 0 {
            return Err(PrepareError::Config("uploads_per_frame must be at least 1".to_string()));
        }
        if self.frame_budget_ms == Some(0) {
            return Err(PrepareError::Config("frame_budget_ms must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Builds the limiter this configuration describes.
    ///
    /// Every frame processes at least one item: a zero count is raised to
    /// one and a zero time budget falls back to the count limiter.
    pub fn limiter(&self) -> Box<dyn UploadLimiter> {
        match self.frame_budget_ms {
            Some(ms) if ms > 0 => Box::new(TimeLimiter::new(Duration::from_millis(ms))),
            _ => Box::new(CountLimiter::new(self.uploads_per_frame.max(1))),
        }
    }
}
