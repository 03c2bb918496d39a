//! Notification hub: fan-out of property, event and action-status messages
//! to the subscriber channels attached to one Thing.
//!
//! Every subscriber gets a backlog queue drained by its own forwarding task
//! into the bounded channel handed to the transport. Publishing only pushes
//! into those queues, so it never waits on a subscriber and keeps
//! per-subscriber order equal to publish order. A subscriber is detached
//! when its backlog overflows, or when its forwarding task cannot deliver
//! within the send timeout or finds the channel closed.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{SendTimeoutError, TrySendError};

use webthing_domain::id::SubscriberId;
use webthing_domain::message::OutboundMessage;

/// Message as shared between subscribers.
pub type Notification = Arc<OutboundMessage>;

/// A live attachment: the opaque id used to detach, and the receiving end.
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    pub receiver: mpsc::Receiver<Notification>,
}

/// Messages a subscriber may have waiting for its forwarding task.
pub const DEFAULT_BACKLOG: usize = 256;

struct Subscriber {
    queue: mpsc::Sender<Notification>,
    events: HashSet<String>,
}

type Registry = Arc<Mutex<HashMap<SubscriberId, Subscriber>>>;

fn lock(registry: &Registry) -> std::sync::MutexGuard<'_, HashMap<SubscriberId, Subscriber>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Subscriber set of one Thing.
pub struct NotificationHub {
    thing: String,
    buffer: usize,
    backlog: usize,
    send_timeout: Duration,
    subscribers: Registry,
}

impl NotificationHub {
    #[must_use]
    pub fn new(thing: impl Into<String>, buffer: usize, send_timeout: Duration) -> Self {
        Self {
            thing: thing.into(),
            buffer: buffer.max(1),
            backlog: DEFAULT_BACKLOG,
            send_timeout,
            subscribers: Arc::default(),
        }
    }

    /// Detach subscribers with more than `backlog` messages not yet forwarded.
    #[must_use]
    pub fn with_backlog(mut self, backlog: usize) -> Self {
        self.backlog = backlog.max(1);
        self
    }

    /// Attach a new subscriber channel.
    ///
    /// Must be called from within a Tokio runtime: the forwarding task is
    /// spawned here.
    pub fn attach(&self) -> Subscription {
        let id = SubscriberId::new();
        let (queue, pending) = mpsc::channel(self.backlog);
        let (sender, receiver) = mpsc::channel(self.buffer);

        lock(&self.subscribers).insert(
            id,
            Subscriber {
                queue,
                events: HashSet::new(),
            },
        );
        tokio::spawn(forward(
            id,
            self.thing.clone(),
            pending,
            sender,
            self.send_timeout,
            Arc::clone(&self.subscribers),
        ));

        tracing::debug!(thing = %self.thing, subscriber = %id, "subscriber attached");
        Subscription { id, receiver }
    }

    /// Detach `id`. Returns whether it was attached; detaching twice is harmless.
    ///
    /// Messages already queued are still forwarded, then the channel closes.
    pub fn detach(&self, id: SubscriberId) -> bool {
        let removed = lock(&self.subscribers).remove(&id).is_some();
        if removed {
            tracing::debug!(thing = %self.thing, subscriber = %id, "subscriber detached");
        }
        removed
    }

    /// Deliver `event` messages of this name to `id` from now on.
    pub fn subscribe_event(&self, id: SubscriberId, event: &str) -> bool {
        match lock(&self.subscribers).get_mut(&id) {
            Some(subscriber) => {
                subscriber.events.insert(event.to_string());
                true
            }
            None => false,
        }
    }

    /// Queue `message` for every attached subscriber.
    ///
    /// Events only reach subscribers that asked for them. Returns the number
    /// of subscribers the message was queued for.
    pub fn publish(&self, message: OutboundMessage) -> usize {
        let message = Arc::new(message);
        let mut delivered = 0;
        lock(&self.subscribers).retain(|id, subscriber| {
            let wanted = message
                .event_name()
                .is_none_or(|name| subscriber.events.contains(name));
            if !wanted {
                return true;
            }
            match self.offer(*id, subscriber, Arc::clone(&message)) {
                Offer::Queued => {
                    delivered += 1;
                    true
                }
                Offer::Overflowed => false,
                Offer::Closed => true,
            }
        });
        delivered
    }

    /// Queue `message` for `id` only.
    pub fn send_to(&self, id: SubscriberId, message: OutboundMessage) -> bool {
        let mut subscribers = lock(&self.subscribers);
        let Some(subscriber) = subscribers.get(&id) else {
            return false;
        };
        match self.offer(id, subscriber, Arc::new(message)) {
            Offer::Queued => true,
            Offer::Overflowed => {
                subscribers.remove(&id);
                false
            }
            Offer::Closed => false,
        }
    }

    fn offer(&self, id: SubscriberId, subscriber: &Subscriber, message: Notification) -> Offer {
        match subscriber.queue.try_send(message) {
            Ok(()) => Offer::Queued,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    thing = %self.thing,
                    subscriber = %id,
                    backlog = self.backlog,
                    "subscriber backlog overflowed, detaching"
                );
                Offer::Overflowed
            }
            // Forwarding task already gone; it removes the entry itself.
            Err(TrySendError::Closed(_)) => Offer::Closed,
        }
    }

    #[must_use]
    pub fn is_attached(&self, id: SubscriberId) -> bool {
        lock(&self.subscribers).contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.subscribers).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Detach every subscriber. Their channels close once drained.
    pub fn close_all(&self) {
        let count = {
            let mut subscribers = lock(&self.subscribers);
            let count = subscribers.len();
            subscribers.clear();
            count
        };
        tracing::debug!(thing = %self.thing, count, "all subscribers detached");
    }
}

enum Offer {
    Queued,
    Overflowed,
    Closed,
}

async fn forward(
    id: SubscriberId,
    thing: String,
    mut pending: mpsc::Receiver<Notification>,
    sender: mpsc::Sender<Notification>,
    send_timeout: Duration,
    subscribers: Registry,
) {
    while let Some(message) = pending.recv().await {
        match sender.send_timeout(message, send_timeout).await {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(_)) => {
                tracing::warn!(%thing, subscriber = %id, "subscriber stalled, detaching");
                break;
            }
            Err(SendTimeoutError::Closed(_)) => {
                tracing::warn!(%thing, subscriber = %id, "subscriber channel closed, detaching");
                break;
            }
        }
    }
    lock(&subscribers).remove(&id);
}
