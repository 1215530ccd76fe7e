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

//! Defines the error type shared by texture resources.

use std::fmt;

/// An error related to the creation, population or loading of a texture resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// A slot index fell outside `[0, length)` of a multi-layer resource.
    OutOfBounds {
        /// The index that was requested.
        index: usize,
        /// The number of slots the resource owns.
        length: usize,
    },
    /// A resource failed to load its backing data.
    LoadFailed {
        /// The source (path or label) that failed to load.
        source: String,
        /// The underlying decoder or I/O error.
        reason: String,
    },
    /// The resource was destroyed before the operation could take effect.
    Destroyed,
    /// A background load task panicked or was cancelled by the runtime.
    TaskFailed(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::OutOfBounds { index, length } => {
                write!(f, "Index {index} is out of bounds (length {length})")
            }
            ResourceError::LoadFailed { source, reason } => {
                write!(f, "Failed to load resource from '{source}': {reason}")
            }
            ResourceError::Destroyed => write!(f, "Resource has been destroyed."),
            ResourceError::TaskFailed(msg) => write!(f, "Resource load task failed: {msg}"),
        }
    }
}

impl std::error::Error for ResourceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_message_names_index_and_length() {
        let err = ResourceError::OutOfBounds {
            index: 10,
            length: 5,
        };
        let message = err.to_string();
        assert!(message.contains("out of bounds"));
        assert!(message.contains("10"));
        assert!(message.contains('5'));
    }

    #[test]
    fn load_failed_message_includes_source() {
        let err = ResourceError::LoadFailed {
            source: "layers/0.png".into(),
            reason: "file not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to load resource from 'layers/0.png': file not found"
        );
    }
}
