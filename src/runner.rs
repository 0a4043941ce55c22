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

//! UI runner and the full startup pipeline.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use ratatui::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::{
    app::{App, EventSource},
    bridge,
    capability::{Environ, supports_progress_overlay_on},
    config::Config,
    error::{Error, Result},
    overlay::with_overlay,
    storage,
    tui::{
        Program, ProgramOptions,
        input::{CrosstermInput, InputSource, input_filter},
        state::Model,
        terminal::TerminalSession,
    },
};

/// Run the terminal UI against `app` until the user quits or `cancel` fires.
pub fn run_tui(cancel: &CancellationToken, app: &App) -> Result<()> {
    let mouse = app.config().options.tui.mouse;
    let options = ProgramOptions {
        env: Environ::capture(),
        cancel: cancel.child_token(),
        filter: input_filter(mouse),
        ..ProgramOptions::default()
    };
    let (session, terminal) = TerminalSession::enter(mouse).map_err(|e| {
        tracing::error!(error = %e, "failed to set up terminal");
        Error::UiLoopFailed(e)
    })?;
    let program = Program::new(terminal, CrosstermInput, options);
    let result = run_program(cancel, app, program).map(drop);
    drop(session);
    result
}

/// Bridge `source` into `program` and run the render loop to completion.
///
/// The bridge starts before the loop and is stopped and joined before this
/// returns, whatever the loop's outcome.
pub fn run_program<S, B, I>(
    cancel: &CancellationToken,
    source: &S,
    program: Program<B, I>,
) -> Result<Model>
where
    S: EventSource + ?Sized,
    B: Backend,
    B::Error: Send + Sync + 'static,
    I: InputSource,
{
    let bridge = bridge::spawn(source.subscribe(), program.sender(), cancel.child_token());
    let outcome = program.run();
    let exit = bridge.stop();
    tracing::debug!(forwarded = exit.forwarded, reason = ?exit.reason, "event bridge stopped");

    outcome.map_err(|e| {
        tracing::error!(error = %e, "tui run error");
        Error::UiLoopFailed(e)
    })
}

/// Full pipeline: overlay decision, storage, application, UI.
///
/// The overlay goes to stderr and is reset on every exit path.
pub fn run_with_progress_bar(cancel: &CancellationToken, cfg: &Config, cwd: &Path) -> Result<()> {
    let supported = supports_progress_overlay_on(&io::stderr());
    run_pipeline(cancel, cfg, cwd, supported, io::stderr(), run_tui)
}

/// [`run_with_progress_bar`] with the overlay stream and UI step injected.
pub fn run_pipeline<W, F>(
    cancel: &CancellationToken,
    cfg: &Config,
    cwd: &Path,
    overlay_supported: bool,
    overlay_out: W,
    ui: F,
) -> Result<()>
where
    W: Write,
    F: FnOnce(&CancellationToken, &App) -> Result<()>,
{
    with_overlay(cfg.options.progress, overlay_supported, overlay_out, || {
        let data_dir = resolve_data_dir(cfg, cwd);
        let db = storage::connect(cancel, &data_dir)?;
        let app = match App::new(cancel, &db, cfg) {
            Ok(app) => app,
            Err(e) => {
                close_db(&db);
                return Err(e);
            }
        };

        let result = ui(cancel, &app);
        app.shutdown();
        close_db(&db);
        result
    })
}

/// Explicit teardown, callable with or without a UI run.
pub fn shutdown(app: &App) {
    app.shutdown();
}

fn resolve_data_dir(cfg: &Config, cwd: &Path) -> PathBuf {
    let dir = &cfg.options.data_directory;
    if dir.is_absolute() {
        dir.clone()
    } else {
        cwd.join(dir)
    }
}

fn close_db(db: &storage::Db) {
    if let Err(e) = db.close() {
        tracing::warn!(error = %e, "failed to close storage");
    }
}
