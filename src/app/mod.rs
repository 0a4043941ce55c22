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

//! Backend application instance.
//!
//! Responsibilities are split across submodules:
//! - `broker`: per-subscriber event fan-out
//! - `events`: event and role types

pub mod broker;
pub mod events;

use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use rusqlite::{params, types::Type};
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    error::{Error, Result},
    storage::Db,
};

pub use self::{
    broker::{Broker, Subscription},
    events::{AppEvent, NoticeLevel, Role},
};

/// Anything that can hand out an ordered event subscription.
pub trait EventSource {
    fn subscribe(&self) -> Subscription<AppEvent>;
}

impl EventSource for Broker<AppEvent> {
    fn subscribe(&self) -> Subscription<AppEvent> {
        Broker::subscribe(self)
    }
}

/// Stored session summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: i64,
    pub title: String,
    pub created_at: i64,
}

/// Stored message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: i64,
    pub session_id: i64,
    pub role: Role,
    pub content: String,
    pub created_at: i64,
}

/// Backend application bound to one storage handle and configuration.
#[derive(Debug)]
pub struct App {
    config: Config,
    db: Db,
    events: Broker<AppEvent>,
    stopped: AtomicBool,
}

impl App {
    /// Build an application instance. Does not start any forwarding; callers
    /// may [`App::subscribe`] immediately.
    pub fn new(cancel: &CancellationToken, db: &Db, config: &Config) -> Result<Self> {
        if cancel.is_cancelled() {
            return Err(Error::AppInitFailed("cancelled before start".to_string()));
        }
        config.validate().map_err(Error::AppInitFailed)?;
        let sessions = count_sessions(db)
            .map_err(|e| Error::AppInitFailed(format!("session store: {e}")))?;

        tracing::info!(
            cwd = %config.working_dir.display(),
            db = %db.path().display(),
            sessions,
            "application initialized"
        );
        Ok(Self {
            config: config.clone(),
            db: db.clone(),
            events: Broker::default(),
            stopped: AtomicBool::new(false),
        })
    }

    /// Configuration the instance was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a new event subscriber.
    pub fn subscribe(&self) -> Subscription<AppEvent> {
        self.events.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }

    /// Create a session and announce it.
    pub fn create_session(&self, title: &str) -> Result<i64> {
        let now = now_ms();
        let session_id = self.db.with_conn(|c| {
            c.execute(
                "INSERT INTO sessions (title, created_at) VALUES (?1, ?2)",
                params![title, now],
            )?;
            Ok(c.last_insert_rowid())
        })?;
        self.events.publish(AppEvent::SessionCreated {
            session_id,
            title: title.to_string(),
        });
        Ok(session_id)
    }

    /// Append a message to a session and announce it.
    pub fn add_message(&self, session_id: i64, role: Role, content: &str) -> Result<i64> {
        let now = now_ms();
        let id = self.db.with_conn(|c| {
            c.execute(
                "INSERT INTO messages (session_id, role, content, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![session_id, role.as_str(), content, now],
            )?;
            Ok(c.last_insert_rowid())
        })?;
        self.events.publish(AppEvent::MessageAdded {
            session_id,
            role,
            content: content.to_string(),
        });
        Ok(id)
    }

    /// Publish a transient notice; nothing is stored.
    pub fn notify(&self, level: NoticeLevel, text: impl Into<String>) {
        self.events.publish(AppEvent::Notice {
            level,
            text: text.into(),
        });
    }

    /// List stored sessions, newest first.
    pub fn sessions(&self) -> Result<Vec<Session>> {
        self.db.with_conn(|c| {
            let mut stmt =
                c.prepare("SELECT id, title, created_at FROM sessions ORDER BY id DESC")?;
            let rows = stmt.query_map([], |r| {
                Ok(Session {
                    id: r.get(0)?,
                    title: r.get(1)?,
                    created_at: r.get(2)?,
                })
            })?;
            rows.collect()
        })
    }

    /// Messages of one session, oldest first.
    pub fn messages(&self, session_id: i64) -> Result<Vec<Message>> {
        self.db.with_conn(|c| {
            let mut stmt = c.prepare(
                "SELECT id, role, content, created_at FROM messages WHERE session_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map([session_id], |r| {
                let role: String = r.get(1)?;
                let role = Role::parse(&role).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        1,
                        Type::Text,
                        format!("unknown role {role:?}").into(),
                    )
                })?;
                Ok(Message {
                    id: r.get(0)?,
                    session_id,
                    role,
                    content: r.get(2)?,
                    created_at: r.get(3)?,
                })
            })?;
            rows.collect()
        })
    }

    /// First event a newly attached UI sees: where the store lives and what
    /// it holds.
    fn attach_notice(&self) -> AppEvent {
        match count_sessions(&self.db) {
            Ok(n) => AppEvent::info(format!(
                "{n} stored session(s) in {}",
                self.db.path().display()
            )),
            Err(e) => {
                tracing::warn!(error = %e, "failed to count sessions");
                AppEvent::Notice {
                    level: NoticeLevel::Warn,
                    text: format!("session store unavailable: {e}"),
                }
            }
        }
    }

    /// Whether [`App::shutdown`] has run.
    pub fn is_shutdown(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Release backend resources. Subscriptions disconnect once drained.
    /// Repeated calls are no-ops.
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        self.events.close();
        tracing::info!("application shut down");
    }
}

/// UI attachment: the subscription opens with [`App::attach_notice`].
impl EventSource for App {
    fn subscribe(&self) -> Subscription<AppEvent> {
        self.events.subscribe_with(vec![self.attach_notice()])
    }
}

fn count_sessions(db: &Db) -> Result<i64> {
    db.with_conn(|c| c.query_row("SELECT COUNT(*) FROM sessions", [], |r| r.get(0)))
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
