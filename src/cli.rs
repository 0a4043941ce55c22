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

//! Command-line parsing and usage text.

use std::path::PathBuf;

use anyhow::{Result, anyhow};

/// Parsed command-line arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub cwd: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub debug: bool,
    pub no_progress: bool,
    pub show_help: bool,
    pub show_version: bool,
}

/// Human-readable CLI usage text.
pub fn usage() -> &'static str {
    "Usage: tether [OPTIONS]

Run the assistant terminal UI for a working directory.

Options:
  -c, --cwd <dir>       Working directory (default: current directory)
  -D, --data-dir <dir>  Data directory (default: <cwd>/.tether)
  -d, --debug           Enable debug logging
      --no-progress     Never show the terminal progress indicator
  -V, --version         Show version information
  -h, --help            Show this help text"
}

/// Version banner.
pub fn version_text() -> String {
    format!(
        "tether v{}\nassistant terminal ui bridge\napache v2 (c) 2026 l5yth",
        env!("CARGO_PKG_VERSION")
    )
}

/// Parse command-line arguments into [`CliArgs`].
pub fn parse_args<I, S>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut cfg = CliArgs::default();

    let mut it = args.into_iter().map(Into::into);
    let _program = it.next();

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => cfg.show_help = true,
            "-V" | "--version" => cfg.show_version = true,
            "-d" | "--debug" => cfg.debug = true,
            "--no-progress" => cfg.no_progress = true,
            "-c" | "--cwd" => {
                let value = it
                    .next()
                    .ok_or_else(|| anyhow!("missing value for {arg}\n\n{}", usage()))?;
                cfg.cwd = Some(PathBuf::from(value));
            }
            "-D" | "--data-dir" => {
                let value = it
                    .next()
                    .ok_or_else(|| anyhow!("missing value for {arg}\n\n{}", usage()))?;
                cfg.data_dir = Some(PathBuf::from(value));
            }
            _ => {
                if let Some(value) = arg.strip_prefix("--cwd=") {
                    cfg.cwd = Some(PathBuf::from(value));
                } else if let Some(value) = arg.strip_prefix("--data-dir=") {
                    cfg.data_dir = Some(PathBuf::from(value));
                } else {
                    return Err(anyhow!("unknown argument: {arg}\n\n{}", usage()));
                }
            }
        }
    }

    Ok(cfg)
}
