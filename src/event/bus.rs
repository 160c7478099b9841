use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::{debug, warn};

struct Subscriber<T> {
    id: u64,
    sender: mpsc::UnboundedSender<T>,
}

type TopicMap<T> = HashMap<String, Vec<Subscriber<T>>>;

/// Topic-keyed fan-out of events to any number of subscribers
///
/// Every subscriber owns an unbounded channel, so a live subscriber never
/// misses an event and sees events in the order they were published.
/// Subscribers that joined after a publish do not receive it.
pub struct EventBus<T> {
    /// topic -> live subscribers
    topics: Arc<Mutex<TopicMap<T>>>,
    next_id: Arc<AtomicU64>,
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            topics: Arc::clone(&self.topics),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<T> std::fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").finish_non_exhaustive()
    }
}

impl<T: Clone + Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> EventBus<T> {
    /// Creates an event bus with no topics
    pub fn new() -> Self {
        Self {
            topics: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    fn lock_topics(&self) -> std::sync::MutexGuard<'_, TopicMap<T>> {
        // A panic while holding the lock leaves the map itself intact
        self.topics.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Publishes an event to every current subscriber of a topic
    ///
    /// Returns the number of subscribers the event was delivered to.
    /// Subscribers whose stream has been dropped are pruned here.
    pub fn publish(&self, topic: &str, event: T) -> usize {
        let mut topics = self.lock_topics();

        let Some(subscribers) = topics.get_mut(topic) else {
            debug!(topic = %topic, "Event published with no subscribers");
            return 0;
        };

        subscribers.retain(|subscriber| subscriber.sender.send(event.clone()).is_ok());
        let delivered = subscribers.len();

        if subscribers.is_empty() {
            topics.remove(topic);
        }

        debug!(topic = %topic, receivers = delivered, "Event published");
        delivered
    }

    /// Subscribes to a topic
    ///
    /// Each call returns an independent stream that yields every event
    /// published to the topic from now on.
    pub fn subscribe(&self, topic: &str) -> Subscription<T> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.lock_topics()
            .entry(topic.to_string())
            .or_default()
            .push(Subscriber { id, sender });

        debug!(topic = %topic, subscription_id = id, "Subscriber registered");

        Subscription {
            id,
            topic: topic.to_string(),
            receiver,
        }
    }

    /// Removes a subscription, which terminates its stream once drained
    pub fn unsubscribe(&self, subscription: &Subscription<T>) {
        let mut topics = self.lock_topics();

        let Some(subscribers) = topics.get_mut(&subscription.topic) else {
            warn!(topic = %subscription.topic, "Unsubscribe from unknown topic");
            return;
        };

        subscribers.retain(|subscriber| subscriber.id != subscription.id);
        if subscribers.is_empty() {
            topics.remove(&subscription.topic);
        }

        debug!(
            topic = %subscription.topic,
            subscription_id = subscription.id,
            "Subscriber removed"
        );
    }

    /// Number of live subscribers registered for a topic
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.lock_topics()
            .get(topic)
            .map(|subscribers| {
                subscribers
                    .iter()
                    .filter(|subscriber| !subscriber.sender.is_closed())
                    .count()
            })
            .unwrap_or(0)
    }
}

/// Receiving end of a topic subscription
///
/// Yields events until the bus drops the subscriber, then ends.
pub struct Subscription<T> {
    id: u64,
    topic: String,
    receiver: mpsc::UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Waits for the next event, `None` once unsubscribed
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Returns an already delivered event without waiting
    pub fn try_recv(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.receiver.poll_recv(cx)
    }
}
