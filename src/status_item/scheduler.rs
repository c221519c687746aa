/*
 *  status_item/scheduler.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Deferred, cancellable debounce checks
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::time::Duration;

use log::debug;
use tokio::task::JoinHandle;

use crate::events::{Event, EventBus};
use crate::status_item::negotiator::CheckToken;

/// Arranges for a `DebounceElapsed(token)` to reach the controller later.
pub trait CheckScheduler {
    /// Schedule a check. Any check still pending is superseded.
    fn schedule(&mut self, delay: Duration, token: CheckToken);

    /// Drop the pending check, if any.
    fn cancel_pending(&mut self);
}

/// Production scheduler: one sleeping task per pending check, publishing on
/// the bus when it wakes.
pub struct TokioScheduler {
    bus: EventBus,
    pending: Option<JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(bus: EventBus) -> Self {
        Self { bus, pending: None }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl CheckScheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration, token: CheckToken) {
        self.cancel_pending();
        let bus = self.bus.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            bus.publish(Event::DebounceElapsed(token));
        }));
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            if !handle.is_finished() {
                debug!("Aborting superseded debounce check");
            }
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

/// Deterministic scheduler driven by hand. Superseded checks are kept and
/// still fire, so tests see the stale path exactly as a late timer would.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    queue: Vec<(Duration, CheckToken)>,
    scheduled: usize,
    keep_superseded: bool,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self { keep_superseded: true, ..Self::default() }
    }

    /// Variant that drops superseded checks, like the tokio scheduler.
    pub fn cancelling() -> Self {
        Self::default()
    }

    /// Move the clock forward, returning due tokens in scheduling order.
    pub fn advance(&mut self, by: Duration) -> Vec<CheckToken> {
        self.now += by;
        let now = self.now;
        let mut due = Vec::new();
        self.queue.retain(|(at, token)| {
            if *at <= now {
                due.push(*token);
                false
            } else {
                true
            }
        });
        due
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Total number of checks ever scheduled.
    pub fn scheduled(&self) -> usize {
        self.scheduled
    }
}

impl CheckScheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, token: CheckToken) {
        if !self.keep_superseded {
            self.queue.clear();
        }
        self.scheduled += 1;
        self.queue.push((self.now + delay, token));
    }

    fn cancel_pending(&mut self) {
        if !self.keep_superseded {
            self.queue.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::WidthLimit;
    use crate::status_item::negotiator::{NegotiatorConfig, WidthNegotiator};

    fn tokens(count: usize) -> Vec<CheckToken> {
        let mut n = WidthNegotiator::new(NegotiatorConfig::default(), WidthLimit::Unbounded, true);
        (0..count).map(|i| n.desired_width_changed(100.0 + i as f32).token).collect()
    }

    #[test]
    fn test_manual_fires_in_order() {
        let t = tokens(2);
        let mut s = ManualScheduler::new();
        s.schedule(Duration::from_millis(500), t[0]);
        s.advance(Duration::from_millis(100));
        s.schedule(Duration::from_millis(500), t[1]);

        assert!(s.advance(Duration::from_millis(399)).is_empty());
        assert_eq!(s.advance(Duration::from_millis(1)), vec![t[0]]);
        assert_eq!(s.advance(Duration::from_millis(100)), vec![t[1]]);
        assert_eq!(s.scheduled(), 2);
    }

    #[test]
    fn test_cancelling_variant_drops_superseded() {
        let t = tokens(2);
        let mut s = ManualScheduler::cancelling();
        s.schedule(Duration::from_millis(500), t[0]);
        s.schedule(Duration::from_millis(500), t[1]);
        assert_eq!(s.pending(), 1);
        assert_eq!(s.advance(Duration::from_secs(1)), vec![t[1]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_supersedes() {
        let t = tokens(2);
        let bus = EventBus::new();
        let mut sub = bus.subscribe();
        let mut s = TokioScheduler::new(bus.clone());

        s.schedule(Duration::from_millis(500), t[0]);
        tokio::time::sleep(Duration::from_millis(200)).await;
        s.schedule(Duration::from_millis(500), t[1]);

        assert_eq!(sub.recv().await, Some(Event::DebounceElapsed(t[1])));
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(sub.try_recv(), None);
        assert!(!s.has_pending());
    }
}
