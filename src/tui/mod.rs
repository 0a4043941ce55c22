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

//! Terminal UI process.
//!
//! Responsibilities are split across submodules:
//! - `input`: input filters, input sources and key translation
//! - `render`: frame rendering for the transcript
//! - `state`: the model updated by events and commands
//! - `terminal`: raw-mode session setup and restore

pub mod input;
pub mod render;
pub mod state;
pub mod terminal;

use std::{
    io,
    sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError},
    time::Duration,
};

use ratatui::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::{app::AppEvent, capability::Environ};

use self::{
    input::{InputFilter, InputSource, UiCommand, map_event, pass_through_filter},
    render::draw_frame,
    state::Model,
};

/// Default capacity of the program's input channel.
pub const DEFAULT_INBOX_CAPACITY: usize = 256;

/// Render/input tick; also bounds how long cancellation takes to notice.
pub const TICK: Duration = Duration::from_millis(50);

/// Construction options for a [`Program`].
#[derive(Debug, Clone)]
pub struct ProgramOptions {
    /// Environment snapshot used for capability negotiation.
    pub env: Environ,
    /// Stops the render loop when cancelled.
    pub cancel: CancellationToken,
    /// Applied to raw input before it reaches the model.
    pub filter: InputFilter,
    pub inbox_capacity: usize,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            env: Environ::default(),
            cancel: CancellationToken::new(),
            filter: pass_through_filter,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
        }
    }
}

/// Handle for delivering backend events into a program's input channel.
#[derive(Debug, Clone)]
pub struct ProgramSender {
    tx: SyncSender<AppEvent>,
}

impl ProgramSender {
    /// Queue `event` without blocking.
    pub fn try_send(&self, event: AppEvent) -> Result<(), TrySendError<AppEvent>> {
        self.tx.try_send(event)
    }
}

/// Constructed terminal UI program.
pub struct Program<B: Backend, I: InputSource> {
    terminal: Terminal<B>,
    input: I,
    env: Environ,
    cancel: CancellationToken,
    filter: InputFilter,
    inbox: Receiver<AppEvent>,
    tx: SyncSender<AppEvent>,
}

impl<B, I> Program<B, I>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
    I: InputSource,
{
    pub fn new(terminal: Terminal<B>, input: I, options: ProgramOptions) -> Self {
        let (tx, inbox) = mpsc::sync_channel(options.inbox_capacity.max(1));
        Self {
            terminal,
            input,
            env: options.env,
            cancel: options.cancel,
            filter: options.filter,
            inbox,
            tx,
        }
    }

    /// Sender feeding this program's input channel. Sends fail once the
    /// program has returned from [`Program::run`].
    pub fn sender(&self) -> ProgramSender {
        ProgramSender {
            tx: self.tx.clone(),
        }
    }

    /// Environment snapshot the program was built with.
    pub fn environ(&self) -> &Environ {
        &self.env
    }

    /// Run the blocking render loop until quit, cancellation, or I/O error.
    ///
    /// Consumes the program, so its input channel closes on return.
    pub fn run(mut self) -> io::Result<Model> {
        let mut model = Model::new(&self.env);
        loop {
            if self.cancel.is_cancelled() {
                tracing::debug!("render loop cancelled");
                break;
            }
            self.drain_inbox(&mut model);
            self.terminal
                .draw(|f| draw_frame(f, &model))
                .map_err(io::Error::other)?;

            let Some(raw) = self.input.poll_event(TICK)? else {
                continue;
            };
            let Some(ev) = (self.filter)(raw) else {
                continue;
            };
            match map_event(&ev) {
                Some(UiCommand::Quit) => break,
                Some(cmd) => model.apply_command(cmd),
                None => {}
            }
        }
        // pick up anything that arrived during the final tick
        self.drain_inbox(&mut model);
        Ok(model)
    }

    fn drain_inbox(&self, model: &mut Model) {
        loop {
            match self.inbox.try_recv() {
                Ok(ev) => model.apply_event(ev),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
    }
}
