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

//! Indeterminate progress overlay around a startup run.
//!
//! The overlay uses the `OSC 9;4` progress protocol. Entering writes the
//! indeterminate state; the matching reset is written by [`OverlayGuard`]'s
//! `Drop`, so every exit path of the enclosed body clears it, unwinding
//! included.

use std::io::Write;

use crate::error::Error;

/// `OSC 9;4;3` puts the tab/taskbar progress indicator in indeterminate mode.
pub const SET_INDETERMINATE_PROGRESS: &str = "\x1b]9;4;3\x07";

/// `OSC 9;4;0` removes the progress indicator.
pub const RESET_PROGRESS: &str = "\x1b]9;4;0\x07";

/// Resolve the tri-state config flag against terminal capability.
pub fn overlay_active(enabled_by_config: Option<bool>, supported: bool) -> bool {
    enabled_by_config.unwrap_or(true) && supported
}

/// Scoped overlay: entered on construction, reset exactly once on drop.
pub struct OverlayGuard<W: Write> {
    out: W,
    released: bool,
}

impl<W: Write> OverlayGuard<W> {
    /// Write the enter sequence and return the guard owning the reset.
    ///
    /// The guard is returned even if the enter write fails; a failed write
    /// is reported through `tracing` and never aborts the caller.
    pub fn enter(mut out: W) -> Self {
        if let Err(e) = write_sequence(&mut out, SET_INDETERMINATE_PROGRESS) {
            tracing::warn!(error = %e, "failed to enter progress overlay");
        }
        Self {
            out,
            released: false,
        }
    }

    /// Reset the overlay now and report the write outcome.
    pub fn release(mut self) -> Result<(), Error> {
        self.reset()
    }

    fn reset(&mut self) -> Result<(), Error> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        write_sequence(&mut self.out, RESET_PROGRESS)
    }
}

impl<W: Write> Drop for OverlayGuard<W> {
    fn drop(&mut self) {
        if let Err(e) = self.reset() {
            tracing::warn!(error = %e, "failed to reset progress overlay");
        }
    }
}

fn write_sequence<W: Write>(out: &mut W, seq: &str) -> Result<(), Error> {
    out.write_all(seq.as_bytes()).map_err(Error::OverlayIo)?;
    out.flush().map_err(Error::OverlayIo)
}

/// Run `body` inside the overlay when both config and terminal allow it.
pub fn with_overlay<W, T, F>(enabled_by_config: Option<bool>, supported: bool, out: W, body: F) -> T
where
    W: Write,
    F: FnOnce() -> T,
{
    let _guard = overlay_active(enabled_by_config, supported).then(|| OverlayGuard::enter(out));
    body()
}
