// Copyright (c) 2026 l5yth
// SPDX-License-Identifier: Apache-2.0

use std::env;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use tether::{
    cli::{parse_args, usage, version_text},
    logging,
};

fn main() -> Result<()> {
    let args = parse_args(env::args())?;
    if args.show_help {
        println!("{}", usage());
        return Ok(());
    }
    if args.show_version {
        println!("{}", version_text());
        return Ok(());
    }

    let cwd = match args.cwd {
        Some(dir) => dir,
        None => env::current_dir().context("failed to read current directory")?,
    };
    let mut cfg = tether::new_config(&cwd, args.data_dir.as_deref(), args.debug)
        .context("failed to load configuration")?;
    if args.no_progress {
        cfg.options.progress = Some(false);
    }

    if let Err(e) = logging::init(&cfg.options.data_directory, cfg.options.debug) {
        eprintln!("warning: logging disabled: {e}");
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tether starting");

    let cancel = CancellationToken::new();
    let result = tether::run_with_progress_bar(&cancel, &cfg, &cfg.working_dir);
    if let Err(e) = &result {
        tracing::error!(error = %e, "tether exited with error");
    }
    result.context("tether exited with an error")
}
