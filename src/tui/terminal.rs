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

//! Raw-mode terminal session for the real render loop.

use std::io::{self, Stdout};

use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

/// Terminal type driven by the real render loop.
pub type StdoutTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Raw mode plus alternate screen; restored when dropped.
#[derive(Debug)]
pub struct TerminalSession {
    mouse: bool,
}

impl TerminalSession {
    /// Enter raw mode and the alternate screen, optionally capturing the
    /// mouse. A partial setup is undone before the error is returned.
    pub fn enter(mouse: bool) -> io::Result<(Self, StdoutTerminal)> {
        enable_raw_mode()?;
        // from here on Drop restores whatever was switched on
        let session = Self { mouse };
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        if mouse {
            execute!(stdout, EnableMouseCapture)?;
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok((session, terminal))
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if self.mouse {
            execute!(stdout, DisableMouseCapture).ok();
        }
        disable_raw_mode().ok();
        execute!(stdout, LeaveAlternateScreen, cursor::Show).ok();
    }
}
