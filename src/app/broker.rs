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

//! Fan-out of events to subscribers.
//!
//! Every subscriber gets its own unbounded queue, so publishing never waits
//! on a slow consumer. Dropped subscriptions are pruned on the next publish.

use std::{
    sync::{
        Mutex, MutexGuard,
        mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError},
    },
    time::Duration,
};

/// Receiving end of one subscription.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: Receiver<T>,
}

impl<T> Subscription<T> {
    /// Wait up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Take the next event if one is queued.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        self.rx.try_recv()
    }
}

#[derive(Debug)]
struct BrokerState<T> {
    subscribers: Vec<Sender<T>>,
    closed: bool,
}

/// Multi-subscriber event broker.
#[derive(Debug)]
pub struct Broker<T> {
    state: Mutex<BrokerState<T>>,
}

impl<T> Default for Broker<T> {
    fn default() -> Self {
        Self {
            state: Mutex::new(BrokerState {
                subscribers: Vec::new(),
                closed: false,
            }),
        }
    }
}

impl<T: Clone> Broker<T> {
    /// Register a new subscriber. After [`Broker::close`] the returned
    /// subscription is already disconnected.
    pub fn subscribe(&self) -> Subscription<T> {
        self.subscribe_with(Vec::new())
    }

    /// Register a subscriber whose queue starts with `initial`, ahead of
    /// anything published afterwards.
    pub fn subscribe_with(&self, initial: Vec<T>) -> Subscription<T> {
        let (tx, rx) = mpsc::channel();
        let mut state = self.lock();
        for event in initial {
            let _ = tx.send(event);
        }
        if !state.closed {
            state.subscribers.push(tx);
        }
        Subscription { rx }
    }

    /// Deliver `event` to every live subscriber; returns how many got it.
    pub fn publish(&self, event: T) -> usize {
        let mut state = self.lock();
        state
            .subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
        state.subscribers.len()
    }

    /// Disconnect all subscribers. Queued events stay readable.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.subscribers.clear();
    }

    /// Whether [`Broker::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of subscribers still registered.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, BrokerState<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_reaches_all_subscribers_in_order() {
        let broker = Broker::default();
        let a = broker.subscribe();
        let b = broker.subscribe();
        for n in 1..=3 {
            assert_eq!(broker.publish(n), 2);
        }
        for sub in [&a, &b] {
            let got: Vec<i32> = std::iter::from_fn(|| sub.try_recv().ok()).collect();
            assert_eq!(got, vec![1, 2, 3]);
        }
    }

    #[test]
    fn publish_never_waits_for_slow_consumers() {
        let broker = Broker::default();
        let _idle = broker.subscribe();
        for n in 0..10_000 {
            broker.publish(n);
        }
        assert_eq!(broker.subscriber_count(), 1);
    }

    #[test]
    fn dropped_subscriptions_are_pruned() {
        let broker = Broker::default();
        let keep = broker.subscribe();
        drop(broker.subscribe());
        assert_eq!(broker.publish("x"), 1);
        assert_eq!(keep.try_recv(), Ok("x"));
    }

    #[test]
    fn close_disconnects_after_queued_events() {
        let broker = Broker::default();
        let sub = broker.subscribe();
        broker.publish(1);
        broker.close();
        assert!(broker.is_closed());
        assert_eq!(sub.try_recv(), Ok(1));
        assert_eq!(sub.try_recv(), Err(TryRecvError::Disconnected));
        assert_eq!(broker.publish(2), 0);
    }

    #[test]
    fn initial_events_come_before_later_publishes() {
        let broker = Broker::default();
        let other = broker.subscribe();
        let sub = broker.subscribe_with(vec![0]);
        broker.publish(1);
        let got: Vec<i32> = std::iter::from_fn(|| sub.try_recv().ok()).collect();
        assert_eq!(got, vec![0, 1]);
        assert_eq!(other.try_recv(), Ok(1));
    }

    #[test]
    fn subscribe_after_close_is_disconnected() {
        let broker: Broker<u8> = Broker::default();
        broker.close();
        let sub = broker.subscribe();
        assert_eq!(
            sub.recv_timeout(Duration::from_millis(10)),
            Err(RecvTimeoutError::Disconnected)
        );
    }
}
