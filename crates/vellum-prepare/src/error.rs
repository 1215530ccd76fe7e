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

//! Errors surfaced by the preparation pipeline.

use std::fmt;

/// An error observed by callers of the preparation pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareError {
    /// The scheduler was destroyed before the queue drained; the completion
    /// was forfeited rather than resolved.
    Abandoned,
    /// A configuration document could not be parsed.
    Config(String),
}

impl fmt::Display for PrepareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrepareError::Abandoned => {
                write!(f, "Preparation was abandoned before the upload queue drained")
            }
            PrepareError::Config(msg) => write!(f, "Invalid prepare configuration: {msg}"),
        }
    }
}

impl std::error::Error for PrepareError {}
