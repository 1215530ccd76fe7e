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

//! # Vellum Prepare
//!
//! Uploads renderable resources to the GPU ahead of use, a bounded slice per
//! frame, so preparing a large scene never stalls the render loop.
//!
//! The pipeline is driven by two ordered [`HookChain`]s. Find hooks inspect
//! each item handed to [`BasePrepare::upload`] (and its children) and push
//! whatever needs uploading into the [`UploadQueue`]. On every frame tick the
//! scheduler pops a slice of the queue and offers each entry to the upload
//! hooks. Once the queue drains, every pending completion settles together.

pub mod builtin;
pub mod config;
pub mod error;
pub mod helper;
pub mod hooks;
pub mod limiter;
pub mod queue;
pub mod scheduler;

pub use config::{PrepareConfig, UPLOADS_PER_FRAME};
pub use error::PrepareError;
pub use helper::{ResourceUploader, UploadHelper};
pub use hooks::{FindHook, HookChain, UploadHook};
pub use limiter::{CountLimiter, TimeLimiter, UploadLimiter};
pub use queue::UploadQueue;
pub use scheduler::{BasePrepare, PrepareHandle};
