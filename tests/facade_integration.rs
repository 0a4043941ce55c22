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

use std::{io, thread, time::Duration};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{Terminal, backend::TestBackend};
use tether::{
    Error,
    app::{AppEvent, Role},
    runner::{run_pipeline, run_program},
    tui::{Program, ProgramOptions, input::InputSource},
};
use tokio_util::sync::CancellationToken;

/// Quits once `quit_after` idle polls have passed.
struct SlowQuit {
    quit_after: usize,
}

impl InputSource for SlowQuit {
    fn poll_event(&mut self, _timeout: Duration) -> io::Result<Option<Event>> {
        thread::sleep(Duration::from_millis(5));
        if self.quit_after == 0 {
            return Ok(Some(Event::Key(KeyEvent::new(
                KeyCode::Char('q'),
                KeyModifiers::NONE,
            ))));
        }
        self.quit_after -= 1;
        Ok(None)
    }
}

#[test]
fn embedding_api_wires_storage_app_and_ui() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let cancel = CancellationToken::new();
    let cfg = tether::new_config(tmp.path(), None, false).expect("config");
    let db = tether::connect(&cancel, &cfg.options.data_directory).expect("connect");
    let app = tether::new_app(&cancel, &db, &cfg).expect("app");

    let program = Program::new(
        Terminal::new(TestBackend::new(60, 12)).expect("terminal"),
        SlowQuit { quit_after: 40 },
        ProgramOptions {
            inbox_capacity: 1,
            ..ProgramOptions::default()
        },
    );

    let model = thread::scope(|s| {
        s.spawn(|| {
            while app.subscriber_count() == 0 {
                thread::yield_now();
            }
            let id = app.create_session("demo").expect("session");
            app.add_message(id, Role::User, "hello").expect("message");
            app.add_message(id, Role::Assistant, "hi there").expect("message");
        });
        run_program(&cancel, &app, program).expect("run")
    });

    let kinds: Vec<&str> = model
        .events()
        .iter()
        .map(|ev| match ev {
            AppEvent::SessionCreated { .. } => "session",
            AppEvent::MessageAdded { role: Role::User, .. } => "user",
            AppEvent::MessageAdded { .. } => "other-message",
            AppEvent::Notice { .. } => "notice",
        })
        .collect();
    // an attached UI first gets the store summary, then live events
    assert_eq!(kinds, vec!["notice", "session", "user", "other-message"]);

    tether::shutdown(&app);
    tether::shutdown(&app);
    db.close().expect("close");
}

#[test]
fn pipeline_storage_failure_never_reaches_the_ui() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let blocker = tmp.path().join("blocker");
    std::fs::write(&blocker, b"x").expect("write");
    let cfg = tether::new_config(tmp.path(), Some(&blocker), false).expect("config");

    let mut overlay = Vec::new();
    let err = run_pipeline(
        &CancellationToken::new(),
        &cfg,
        tmp.path(),
        true,
        &mut overlay,
        |_, _| panic!("ui must not be constructed"),
    )
    .expect_err("storage should fail");
    assert!(matches!(err, Error::StorageUnavailable { .. }));
    assert_eq!(overlay, b"\x1b]9;4;3\x07\x1b]9;4;0\x07");
}

#[test]
fn is_terminal_is_false_for_files() {
    let tmp = tempfile::tempfile().expect("tempfile");
    assert!(!tether::is_terminal(&tmp));
}
