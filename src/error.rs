/*
   Copyright (C) 2026 l5yth

   Licensed under the Apache License, Version 2.0 (the "License");
   you may not use this file except in compliance with the License.
   You may obtain a copy of the License at

       http://www.apache.org/licenses/LICENSE-2.0

   Unless required by applicable law or agreed to in writing, software
   distributed under the License is distributed on an "AS IS" BASIS,
   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
   See the License for the specific language governing permissions and
   limitations under the License.
*/

//! Error taxonomy for the embedding facade.

use std::{io, path::PathBuf};

/// Failure modes surfaced to embedding callers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration could not be read or is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Storage connection could not be opened or has been closed.
    #[error("storage unavailable at {}: {reason}", path.display())]
    StorageUnavailable { path: PathBuf, reason: String },

    /// A query on an open connection failed, e.g. a constraint violation.
    #[error("backend operation failed: {0}")]
    Backend(#[source] rusqlite::Error),

    /// Backend application construction failed.
    #[error("application init failed: {0}")]
    AppInitFailed(String),

    /// The render loop returned an error.
    #[error("tui run error: {0}")]
    UiLoopFailed(#[source] io::Error),

    /// Writing progress overlay escape sequences failed.
    #[error("progress overlay write failed: {0}")]
    OverlayIo(#[source] io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn storage(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
