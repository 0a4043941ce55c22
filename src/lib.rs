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

//! Embedding facade for the assistant terminal UI.
//!
//! Wires configuration, storage, the backend application and the terminal
//! UI together:
//!
//! ```no_run
//! use std::path::Path;
//! use tokio_util::sync::CancellationToken;
//!
//! # fn main() -> Result<(), tether::Error> {
//! let cwd = Path::new(".");
//! let cfg = tether::new_config(cwd, None, false)?;
//! tether::run_with_progress_bar(&CancellationToken::new(), &cfg, cwd)?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod bridge;
pub mod capability;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod overlay;
pub mod runner;
pub mod storage;
pub mod tui;

use std::{io::IsTerminal, path::Path};

use tokio_util::sync::CancellationToken;

pub use crate::{
    app::App,
    config::Config,
    error::{Error, Result},
    runner::{run_tui, run_with_progress_bar, shutdown},
    storage::Db,
};

/// Resolve configuration for `cwd`; see [`Config::init`].
pub fn new_config(cwd: &Path, data_dir: Option<&Path>, debug: bool) -> Result<Config> {
    Config::init(cwd, data_dir, debug)
}

/// Open the storage connection under `data_dir`.
pub fn connect(cancel: &CancellationToken, data_dir: &Path) -> Result<Db> {
    storage::connect(cancel, data_dir)
}

/// Build a backend application bound to `db` and `cfg`.
pub fn new_app(cancel: &CancellationToken, db: &Db, cfg: &Config) -> Result<App> {
    App::new(cancel, db, cfg)
}

/// Whether `stream` is an interactive terminal.
pub fn is_terminal<S: IsTerminal>(stream: &S) -> bool {
    capability::is_terminal(stream)
}
