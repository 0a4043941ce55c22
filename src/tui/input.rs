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

//! Input filtering and key translation.

use std::{io, time::Duration};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind,
};

/// Predicate/transform applied to raw input before it reaches UI state.
pub type InputFilter = fn(Event) -> Option<Event>;

/// Source of raw terminal input.
pub trait InputSource {
    /// Wait up to `timeout` for one event.
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>>;
}

/// Reads input from the process terminal through crossterm.
#[derive(Debug, Default)]
pub struct CrosstermInput;

impl InputSource for CrosstermInput {
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }
}

/// Pass every event through unchanged.
pub fn pass_through_filter(ev: Event) -> Option<Event> {
    Some(ev)
}

/// Drop pointer motion and drag noise; keep wheel and button events.
pub fn mouse_event_filter(ev: Event) -> Option<Event> {
    match ev {
        Event::Mouse(m) if matches!(m.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) => {
            None
        }
        other => Some(other),
    }
}

/// Drop every mouse event.
pub fn no_mouse_filter(ev: Event) -> Option<Event> {
    match ev {
        Event::Mouse(_) => None,
        other => Some(other),
    }
}

/// Pick the filter for the configured mouse policy.
pub fn input_filter(mouse_enabled: bool) -> InputFilter {
    if mouse_enabled {
        mouse_event_filter
    } else {
        no_mouse_filter
    }
}

/// High-level UI command mapped from input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Quit,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

/// Translate a key press to a UI command.
pub fn map_key(key: KeyEvent) -> Option<UiCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiCommand::Quit);
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(UiCommand::Quit),
        KeyCode::Up | KeyCode::Char('k') => Some(UiCommand::ScrollUp),
        KeyCode::Down | KeyCode::Char('j') => Some(UiCommand::ScrollDown),
        KeyCode::PageUp => Some(UiCommand::PageUp),
        KeyCode::PageDown => Some(UiCommand::PageDown),
        KeyCode::Home | KeyCode::Char('g') => Some(UiCommand::Top),
        KeyCode::End | KeyCode::Char('G') => Some(UiCommand::Bottom),
        _ => None,
    }
}

/// Translate any filtered input event to a UI command.
pub fn map_event(ev: &Event) -> Option<UiCommand> {
    match ev {
        Event::Key(k) => map_key(*k),
        Event::Mouse(m) => match m.kind {
            MouseEventKind::ScrollUp => Some(UiCommand::ScrollUp),
            MouseEventKind::ScrollDown => Some(UiCommand::ScrollDown),
            _ => None,
        },
        _ => None,
    }
}
