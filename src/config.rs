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

//! Configuration discovery and resolution.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    capability::{EnvLookup, ProcessEnv},
    error::{Error, Result},
};

/// Project config files, checked in order inside the working directory.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["tether.json", ".tether.json"];

/// Default data directory name, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = ".tether";

/// Environment fallback for the data directory.
pub const DATA_DIR_ENV: &str = "TETHER_DATA_DIR";

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Canonical working directory the application operates in.
    pub working_dir: PathBuf,
    pub options: Options,
}

/// Resolved options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Absolute directory holding the database and logs.
    pub data_directory: PathBuf,
    /// Progress overlay flag: unset means enabled.
    pub progress: Option<bool>,
    pub debug: bool,
    pub tui: TuiOptions,
}

/// Terminal UI options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TuiOptions {
    /// Deliver mouse events to the UI. When false every mouse event is
    /// filtered out before it reaches UI state.
    pub mouse: bool,
}

impl Default for TuiOptions {
    fn default() -> Self {
        Self { mouse: true }
    }
}

/// On-disk shape of a project config file. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    options: FileOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileOptions {
    data_directory: Option<PathBuf>,
    progress: Option<bool>,
    debug: bool,
    tui: TuiOptions,
}

impl Config {
    /// Resolve configuration for `cwd`.
    ///
    /// `data_dir` wins over the config file, which wins over
    /// `TETHER_DATA_DIR`, which wins over `<cwd>/.tether`.
    pub fn init(cwd: &Path, data_dir: Option<&Path>, debug: bool) -> Result<Self> {
        Self::init_with_env(cwd, data_dir, debug, &ProcessEnv)
    }

    /// Like [`Config::init`] with an explicit environment source.
    pub fn init_with_env(
        cwd: &Path,
        data_dir: Option<&Path>,
        debug: bool,
        env: &impl EnvLookup,
    ) -> Result<Self> {
        let working_dir = cwd.canonicalize().map_err(|e| {
            Error::Config(format!("working directory {}: {e}", cwd.display()))
        })?;
        if !working_dir.is_dir() {
            return Err(Error::Config(format!(
                "working directory {} is not a directory",
                working_dir.display()
            )));
        }

        let file = load_file_config(&working_dir)?;
        let data_directory = data_dir
            .map(Path::to_path_buf)
            .or(file.options.data_directory)
            .or_else(|| env.var(DATA_DIR_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let data_directory = if data_directory.is_absolute() {
            data_directory
        } else {
            working_dir.join(data_directory)
        };

        Ok(Self {
            working_dir,
            options: Options {
                data_directory,
                progress: file.options.progress,
                debug: debug || file.options.debug,
                tui: file.options.tui,
            },
        })
    }

    /// Check the fields the backend needs before it can start.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.options.data_directory.as_os_str().is_empty() {
            return Err("data directory is not set".to_string());
        }
        if !self.working_dir.is_dir() {
            return Err(format!(
                "working directory {} does not exist",
                self.working_dir.display()
            ));
        }
        Ok(())
    }
}

fn load_file_config(dir: &Path) -> Result<FileConfig> {
    let Some(path) = CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
    else {
        return Ok(FileConfig::default());
    };
    let raw = fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
    let parsed = serde_json::from_str(&raw)
        .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(parsed)
}
