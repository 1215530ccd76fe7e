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

//! # Vellum Core
//!
//! Foundational crate containing the contracts shared by the preparation
//! pipeline and the texture resources it feeds: the frame ticker, the opaque
//! renderer handle, the preparable item capability, base textures and the
//! resource family (including the multi-layer [`resource::ArrayResource`]).

#![warn(missing_docs)]

pub mod error;
pub mod geometry;
pub mod prepare;
pub mod renderer;
pub mod resource;
pub mod texture;
pub mod ticker;

pub use error::ResourceError;
pub use prepare::{Preparable, PreparableRef};
pub use renderer::RendererHandle;
pub use ticker::{ManualTicker, TickCallback, Ticker, TickerSubscription};
