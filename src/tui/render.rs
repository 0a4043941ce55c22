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

//! Frame rendering for the event transcript.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{AppEvent, NoticeLevel, Role};

use super::state::Model;

/// Render one UI frame from the model.
pub fn draw_frame(f: &mut Frame<'_>, model: &Model) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());

    let block = Block::default().borders(Borders::ALL).title("tether");
    let inner = block.inner(chunks[0]);
    f.render_widget(block, chunks[0]);

    let events = model.events();
    if events.is_empty() {
        f.render_widget(
            Paragraph::new("Waiting for events...").style(dim(model.color())),
            inner,
        );
    } else {
        let height = inner.height as usize;
        let end = events.len().saturating_sub(model.scroll_back());
        let start = end.saturating_sub(height);
        let lines: Vec<Line<'_>> = events[start..end]
            .iter()
            .map(|ev| event_line(ev, model.color()))
            .collect();
        f.render_widget(Paragraph::new(lines), inner);
    }

    f.render_widget(
        Paragraph::new(model.status_text()).style(dim(model.color())),
        chunks[1],
    );
}

fn dim(color: bool) -> Style {
    if color {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    }
}

/// One transcript line for an event.
pub fn event_line(ev: &AppEvent, color: bool) -> Line<'_> {
    let (tag, style, text) = match ev {
        AppEvent::SessionCreated { session_id, title } => (
            format!("session #{session_id}"),
            Style::default().fg(Color::Cyan),
            title.as_str(),
        ),
        AppEvent::MessageAdded { role, content, .. } => (
            role.to_string(),
            Style::default().fg(match role {
                Role::User => Color::Green,
                Role::Assistant => Color::Blue,
                Role::System => Color::Magenta,
            }),
            content.as_str(),
        ),
        AppEvent::Notice { level, text } => (
            match level {
                NoticeLevel::Info => "info",
                NoticeLevel::Warn => "warn",
                NoticeLevel::Error => "error",
            }
            .to_string(),
            Style::default().fg(match level {
                NoticeLevel::Info => Color::Gray,
                NoticeLevel::Warn => Color::Yellow,
                NoticeLevel::Error => Color::Red,
            }),
            text.as_str(),
        ),
    };
    let style = if color { style } else { Style::default() };
    Line::from(vec![
        Span::styled(format!("[{tag}] "), style),
        Span::raw(text.lines().next().unwrap_or_default()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Environ;
    use ratatui::backend::TestBackend;

    fn screen(model: &Model, w: u16, h: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(w, h)).expect("terminal");
        terminal.draw(|f| draw_frame(f, model)).expect("draw");
        let buf = terminal.backend().buffer();
        buf.content
            .chunks(w as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn empty_model_shows_waiting_text() {
        let model = Model::new(&Environ::default());
        let text = screen(&model, 60, 6);
        assert!(text.contains("Waiting for events"));
        assert!(text.contains("events: 0"));
    }

    #[test]
    fn transcript_shows_newest_events_that_fit() {
        let mut model = Model::new(&Environ::default());
        for i in 0..10 {
            model.apply_event(AppEvent::info(format!("line-{i}")));
        }
        // 6 rows: 2 border rows + 1 status row leaves 3 transcript rows
        let text = screen(&model, 60, 6);
        assert!(text.contains("line-9"));
        assert!(text.contains("line-7"));
        assert!(!text.contains("line-6"));
    }

    #[test]
    fn event_line_tags_messages_with_role() {
        let ev = AppEvent::MessageAdded {
            session_id: 1,
            role: Role::Assistant,
            content: "first\nsecond".to_string(),
        };
        let line = event_line(&ev, false);
        let rendered: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(rendered, "[assistant] first");
    }
}
