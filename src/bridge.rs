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

//! Event bridge: forwards backend events into the UI's input channel.
//!
//! The bridge owns one thread. It reads the subscription in emission order
//! and hands each event to the sink, retrying while the sink is full. It
//! never drops or reorders events; it stops when the subscription
//! disconnects, the sink closes, or its cancellation token fires.

use std::{
    sync::mpsc::{RecvTimeoutError, SyncSender, TrySendError},
    thread::{self, JoinHandle},
    time::Duration,
};

use tokio_util::sync::CancellationToken;

use crate::{
    app::{AppEvent, Subscription},
    tui::ProgramSender,
};

/// How long one receive waits before re-checking cancellation.
const RECV_POLL: Duration = Duration::from_millis(25);

/// Back-off between retries while the sink is full.
const FULL_BACKOFF: Duration = Duration::from_millis(2);

/// Destination for forwarded events.
pub trait EventSink {
    /// Hand over `event` without blocking.
    fn try_forward(&self, event: AppEvent) -> Result<(), TrySendError<AppEvent>>;
}

impl EventSink for ProgramSender {
    fn try_forward(&self, event: AppEvent) -> Result<(), TrySendError<AppEvent>> {
        self.try_send(event)
    }
}

impl EventSink for SyncSender<AppEvent> {
    fn try_forward(&self, event: AppEvent) -> Result<(), TrySendError<AppEvent>> {
        self.try_send(event)
    }
}

/// Why the bridge thread ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The backend closed the subscription.
    SourceClosed,
    /// The UI dropped its input channel.
    SinkClosed,
    Cancelled,
    /// The bridge thread panicked.
    Panicked,
}

/// Final bridge report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeExit {
    pub forwarded: usize,
    pub reason: StopReason,
}

/// Running bridge. Dropping it cancels the thread without waiting.
#[derive(Debug)]
pub struct Bridge {
    cancel: CancellationToken,
    handle: Option<JoinHandle<BridgeExit>>,
}

impl Bridge {
    /// Cancel the bridge and wait for its thread to finish.
    pub fn stop(mut self) -> BridgeExit {
        self.cancel.cancel();
        self.join()
    }

    /// Wait for the bridge to end on its own (source or sink closed).
    pub fn join(&mut self) -> BridgeExit {
        match self.handle.take().map(JoinHandle::join) {
            Some(Ok(exit)) => exit,
            Some(Err(_)) | None => BridgeExit {
                forwarded: 0,
                reason: StopReason::Panicked,
            },
        }
    }

    /// Whether the bridge thread has ended.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Start forwarding `subscription` into `sink` on a dedicated thread.
///
/// `cancel` should be tied to the consumer's lifetime; the bridge stops
/// within one receive poll of it firing.
pub fn spawn<S>(subscription: Subscription<AppEvent>, sink: S, cancel: CancellationToken) -> Bridge
where
    S: EventSink + Send + 'static,
{
    let token = cancel.clone();
    let handle = thread::spawn(move || {
        let exit = pump(&subscription, &sink, &token);
        tracing::debug!(forwarded = exit.forwarded, reason = ?exit.reason, "event bridge finished");
        exit
    });
    Bridge {
        cancel,
        handle: Some(handle),
    }
}

fn pump(
    subscription: &Subscription<AppEvent>,
    sink: &impl EventSink,
    cancel: &CancellationToken,
) -> BridgeExit {
    let mut forwarded = 0usize;
    let reason = loop {
        if cancel.is_cancelled() {
            break StopReason::Cancelled;
        }
        let event = match subscription.recv_timeout(RECV_POLL) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break StopReason::SourceClosed,
        };
        match deliver(sink, event, cancel) {
            Ok(()) => forwarded += 1,
            Err(reason) => break reason,
        }
    };
    BridgeExit { forwarded, reason }
}

fn deliver(
    sink: &impl EventSink,
    mut event: AppEvent,
    cancel: &CancellationToken,
) -> Result<(), StopReason> {
    loop {
        match sink.try_forward(event) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Disconnected(_)) => return Err(StopReason::SinkClosed),
            Err(TrySendError::Full(back)) => {
                if cancel.is_cancelled() {
                    return Err(StopReason::Cancelled);
                }
                event = back;
                thread::sleep(FULL_BACKOFF);
            }
        }
    }
}
