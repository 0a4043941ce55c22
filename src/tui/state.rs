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

//! UI state fed by backend events and user commands.

use crate::{
    app::AppEvent,
    capability::{EnvLookup, Environ},
};

use super::input::UiCommand;

/// Lines moved by one page command.
const PAGE: usize = 10;

/// Transcript view state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    events: Vec<AppEvent>,
    /// Lines scrolled back from the newest entry; 0 follows the tail.
    scroll_back: usize,
    color: bool,
}

impl Model {
    /// Build a model, negotiating colour support from `env`.
    pub fn new(env: &Environ) -> Self {
        Self {
            events: Vec::new(),
            scroll_back: 0,
            color: env.var("NO_COLOR").is_none_or(|v| v.is_empty()),
        }
    }

    /// Record one backend event.
    pub fn apply_event(&mut self, event: AppEvent) {
        self.events.push(event);
        if self.scroll_back > 0 {
            // keep the same entries on screen while scrolled back
            self.scroll_back += 1;
        }
    }

    /// Apply a navigation command. Quit is handled by the program loop.
    pub fn apply_command(&mut self, cmd: UiCommand) {
        let max = self.events.len().saturating_sub(1);
        self.scroll_back = match cmd {
            UiCommand::ScrollUp => self.scroll_back + 1,
            UiCommand::ScrollDown => self.scroll_back.saturating_sub(1),
            UiCommand::PageUp => self.scroll_back + PAGE,
            UiCommand::PageDown => self.scroll_back.saturating_sub(PAGE),
            UiCommand::Top => max,
            UiCommand::Bottom | UiCommand::Quit => 0,
        }
        .min(max);
    }

    /// Events received so far, in arrival order.
    pub fn events(&self) -> &[AppEvent] {
        &self.events
    }

    pub fn scroll_back(&self) -> usize {
        self.scroll_back
    }

    /// Whether styled output is allowed.
    pub fn color(&self) -> bool {
        self.color
    }

    /// Footer text.
    pub fn status_text(&self) -> String {
        let follow = if self.scroll_back == 0 {
            "following".to_string()
        } else {
            format!("scrolled back {}", self.scroll_back)
        };
        format!(
            "events: {} | {follow} | ↑/↓: scroll | g/G: top/bottom | q: quit",
            self.events.len()
        )
    }
}
