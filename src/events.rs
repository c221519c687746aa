/*
 *  events.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Typed event bus connecting the playback source, the host and the
 *  status item controller
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

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::playback::PlaybackSnapshot;
use crate::prefs::PreferenceChange;
use crate::status_item::negotiator::CheckToken;

/// Reasons an incoming external event is dropped.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("malformed feed message: {0}")]
    MalformedFeed(#[from] serde_json::Error),
    #[error("unknown preference key '{0}'")]
    UnknownPreference(String),
    #[error("invalid value {value} for preference '{key}'")]
    InvalidPreferenceValue { key: String, value: String },
}

/// Everything the controller reacts to. Producers publish these; only the
/// event loop consumes them.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    TrackChanged(PlaybackSnapshot),
    HostVisibilityChanged { visible: bool },
    PreferenceChanged(PreferenceChange),
    DebounceElapsed(CheckToken),
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Receiving end of a bus subscription.
pub struct Subscription {
    id: SubscriptionId,
    rx: UnboundedReceiver<Event>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Wait for the next event. `None` once unsubscribed and drained.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Non-blocking poll, handy for draining in tests.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: HashMap<SubscriptionId, UnboundedSender<Event>>,
}

/// Cloneable publish/subscribe handle. Cloning shares the same subscriber set,
/// so any collaborator holding a clone can reach the controller.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BusInner> {
        // a panicking publisher must not take the bus down with it
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.insert(id, tx);
        Subscription { id, rx }
    }

    /// Returns false when the id was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().subscribers.remove(&id).is_some()
    }

    /// Deliver to every live subscriber, returning how many received it.
    /// Subscribers whose receiver is gone are pruned.
    pub fn publish(&self, event: Event) -> usize {
        let mut inner = self.lock();
        let mut delivered = 0;
        inner.subscribers.retain(|id, tx| match tx.send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(_) => {
                debug!("Pruning closed subscription {:?}", id);
                false
            }
        });
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_every_subscriber() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        let delivered = bus.publish(Event::HostVisibilityChanged { visible: false });
        assert_eq!(delivered, 2);
        assert_eq!(a.try_recv(), Some(Event::HostVisibilityChanged { visible: false }));
        assert_eq!(b.try_recv(), Some(Event::HostVisibilityChanged { visible: false }));
        assert_eq!(a.try_recv(), None);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        assert!(bus.unsubscribe(a.id()));
        assert!(!bus.unsubscribe(a.id()));

        assert_eq!(bus.publish(Event::Shutdown), 0);
        assert_eq!(a.try_recv(), None);
    }

    #[test]
    fn test_dropped_receivers_are_pruned() {
        let bus = EventBus::new();
        let keep = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(Event::Shutdown);
        assert_eq!(bus.subscriber_count(), 1);
        drop(keep);
    }

    #[tokio::test]
    async fn test_clones_share_subscribers() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe();
        let producer = bus.clone();

        tokio::spawn(async move {
            producer.publish(Event::HostVisibilityChanged { visible: true });
        })
        .await
        .unwrap();

        assert_eq!(sub.recv().await, Some(Event::HostVisibilityChanged { visible: true }));
    }
}
