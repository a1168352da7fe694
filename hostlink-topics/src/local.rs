//!
//! Local Topics
//!
//! Local topics are process-local named channels.  A topic is opened by
//! name on the `TopicBus` with a fixed payload type; publishing copies
//! the payload to every registered callback synchronously (on the
//! publisher's execution context) and to every poll-style subscriber's
//! channel.  A topic retains its most recent payload so late subscribers
//! start from the latest known value.
//!

use std::{
    any::Any,
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crossbeam::channel::{self, Receiver, Sender};

use hostlink_core::{DeliveryContext, Publisher, Subscriber};

/// An error from opening a topic on the bus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TopicError {
    /// The named topic already exists with a different payload type.
    TypeConflict(String),
}

type TopicCallback<Data> = Box<dyn Fn(DeliveryContext, &Data) + Send + Sync>;

// The state shared between every handle, callback and subscriber of one
// named topic.
struct TopicShared<Data> {
    name: String,
    callbacks: Mutex<Vec<TopicCallback<Data>>>,
    taps: Mutex<Vec<Sender<Data>>>,
    latest: Mutex<Option<(Data, Instant)>>,
}

/// The process-local registry of named topics.
///
/// Opening a name that does not exist yet creates the topic; opening an
/// existing name returns another handle to the same topic, provided the
/// payload type matches.
#[derive(Clone, Default)]
pub struct TopicBus {
    topics: Arc<Mutex<HashMap<String, Box<dyn Any + Send + Sync>>>>,
}

impl TopicBus {
    /// Create a new, empty topic bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (find or create) the named topic with the given payload type.
    pub fn topic<Data: Copy + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Topic<Data>, TopicError> {
        let mut topics = self.topics.lock().unwrap();
        if let Some(entry) = topics.get(name) {
            return entry
                .downcast_ref::<Arc<TopicShared<Data>>>()
                .map(|shared| Topic {
                    shared: shared.clone(),
                })
                .ok_or_else(|| TopicError::TypeConflict(name.to_string()));
        }

        let shared = Arc::new(TopicShared {
            name: name.to_string(),
            callbacks: Mutex::new(Vec::new()),
            taps: Mutex::new(Vec::new()),
            latest: Mutex::new(None),
        });
        topics.insert(name.to_string(), Box::new(shared.clone()));
        Ok(Topic { shared })
    }
}

/// A handle to one named topic on the bus.
pub struct Topic<Data> {
    shared: Arc<TopicShared<Data>>,
}

impl<Data> Clone for Topic<Data> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<Data: Copy + Send + Sync + 'static> Topic<Data> {
    /// The name this topic was opened under.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Register a callback that is invoked synchronously, on the
    /// publisher's execution context, for every payload published to
    /// this topic.
    ///
    /// Callbacks must follow the discipline of the most restricted
    /// context the topic is published from, and must not publish back
    /// onto the topic that invoked them.
    pub fn register_callback<F>(&self, callback: F)
    where
        F: Fn(DeliveryContext, &Data) + Send + Sync + 'static,
    {
        self.shared.callbacks.lock().unwrap().push(Box::new(callback));
    }

    /// Create a poll-style subscriber that always reads the most recent
    /// payload published to this topic.
    pub fn subscribe(&self) -> TopicSubscriber<Data> {
        let (tx, rx) = channel::unbounded();
        self.shared.taps.lock().unwrap().push(tx);

        let data = self
            .shared
            .latest
            .lock()
            .unwrap()
            .as_ref()
            .map(|latest| latest.0);

        TopicSubscriber { rx, data }
    }

    /// Create a poll-style subscriber whose payloads decay to `None`
    /// once they are older than `ttl`.
    pub fn subscribe_ttl(&self, ttl: Duration) -> TtlSubscriber<Data> {
        let (tx, rx) = channel::unbounded();
        self.shared.taps.lock().unwrap().push(tx);

        let data = match self.shared.latest.lock().unwrap().as_ref() {
            Some((data, published)) if published.elapsed() <= ttl => Some((*data, *published)),
            _ => None,
        };

        TtlSubscriber { rx, data, ttl }
    }

    /// Publish a payload from an ordinary task context.
    pub fn publish(&self, data: Data) {
        self.publish_from(DeliveryContext::Task, data)
    }

    /// Publish a payload, recording the execution context it originates
    /// from.
    ///
    /// Registered callbacks run to completion before this returns; poll
    /// subscribers observe the payload on their next `get`.  Subscribers
    /// that have been dropped are forgotten.
    pub fn publish_from(&self, context: DeliveryContext, data: Data) {
        for callback in self.shared.callbacks.lock().unwrap().iter() {
            callback(context, &data);
        }

        self.shared
            .taps
            .lock()
            .unwrap()
            .retain(|tap| tap.send(data).is_ok());

        *self.shared.latest.lock().unwrap() = Some((data, Instant::now()));
    }
}

impl<Data: Copy + Send + Sync + 'static> Publisher for Topic<Data> {
    type Data = Data;
    type Error = std::convert::Infallible;

    fn publish(&mut self, data: Self::Data) -> Result<(), Self::Error> {
        Topic::publish(self, data);
        Ok(())
    }
}

/// A poll-style subscriber holding the most recent payload published to
/// its topic.
pub struct TopicSubscriber<Data> {
    rx: Receiver<Data>,
    data: Option<Data>,
}

impl<Data: Copy> Subscriber for TopicSubscriber<Data> {
    type Target = Option<Data>;

    fn get(&mut self) -> &Self::Target {
        if let Some(data) = self.rx.try_iter().last() {
            self.data = Some(data);
        }

        &self.data
    }
}

/// A poll-style subscriber whose payloads decay after a time-to-live has
/// passed, so a consumer can tell "recently commanded" apart from "went
/// quiet".
pub struct TtlSubscriber<Data> {
    rx: Receiver<Data>,
    data: Option<(Data, Instant)>,
    ttl: Duration,
}

impl<Data: Copy> Subscriber for TtlSubscriber<Data> {
    type Target = Option<(Data, Instant)>;

    fn get(&mut self) -> &Self::Target {
        if let Some(data) = self.rx.try_iter().last() {
            self.data = Some((data, Instant::now()));
        }

        if let Some((_, received)) = self.data {
            if received.elapsed() > self.ttl {
                self.data = None;
            }
        }

        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{sync::Mutex, thread, time::Duration};

    use rand::Rng;

    #[test]
    fn test_callbacks_run_before_publish_returns() {
        let bus = TopicBus::new();
        let topic = bus.topic::<u32>("numbers").unwrap();

        let received = Arc::new(Mutex::new(Vec::new()));
        let recorder = received.clone();
        topic.register_callback(move |_, data: &u32| {
            recorder.lock().unwrap().push(*data);
        });

        topic.publish(7);
        topic.publish(11);

        assert_eq!(*received.lock().unwrap(), vec![7, 11]);
    }

    #[test]
    fn test_callbacks_observe_the_delivery_context() {
        let bus = TopicBus::new();
        let topic = bus.topic::<u32>("numbers").unwrap();

        let contexts = Arc::new(Mutex::new(Vec::new()));
        let recorder = contexts.clone();
        topic.register_callback(move |context, _: &u32| {
            recorder.lock().unwrap().push(context);
        });

        topic.publish(1);
        topic.publish_from(DeliveryContext::Interrupt, 2);

        assert_eq!(
            *contexts.lock().unwrap(),
            vec![DeliveryContext::Task, DeliveryContext::Interrupt]
        );
    }

    #[test]
    fn test_reopening_a_name_shares_the_topic() {
        let bus = TopicBus::new();
        let publisher_handle = bus.topic::<u32>("shared").unwrap();
        let consumer_handle = bus.topic::<u32>("shared").unwrap();

        let mut subscriber = consumer_handle.subscribe();
        publisher_handle.publish(42);

        assert_eq!(*subscriber.get(), Some(42));
    }

    #[test]
    fn test_reopening_a_name_with_another_type_fails() {
        let bus = TopicBus::new();
        bus.topic::<u32>("conflicted").unwrap();

        assert_eq!(
            bus.topic::<f32>("conflicted").err(),
            Some(TopicError::TypeConflict("conflicted".to_string()))
        );
    }

    #[test]
    fn test_subscriber_reads_the_last_write() {
        let bus = TopicBus::new();
        let topic = bus.topic::<u32>("numbers").unwrap();
        let mut subscriber = topic.subscribe();

        let mut rng = rand::thread_rng();
        let values: Vec<u32> = (0..100).map(|_| rng.gen()).collect();
        for value in values.iter() {
            topic.publish(*value);
        }

        assert_eq!(*subscriber.get(), values.last().copied());
    }

    #[test]
    fn test_late_subscriber_starts_from_the_latest_value() {
        let bus = TopicBus::new();
        let topic = bus.topic::<u32>("numbers").unwrap();

        topic.publish(5);
        let mut subscriber = topic.subscribe();

        assert_eq!(*subscriber.get(), Some(5));
    }

    #[test]
    fn test_ttl_subscriber_decays() {
        let bus = TopicBus::new();
        let topic = bus.topic::<u32>("numbers").unwrap();
        let mut subscriber = topic.subscribe_ttl(Duration::from_millis(20));

        topic.publish(9);
        assert_eq!(subscriber.get().as_ref().map(|(data, _)| *data), Some(9));

        thread::sleep(Duration::from_millis(40));
        assert_eq!(*subscriber.get(), None);
    }

    #[test]
    fn test_publisher_trait_delivers_to_callbacks() {
        let bus = TopicBus::new();
        let mut topic = bus.topic::<u32>("numbers").unwrap();

        let received = Arc::new(Mutex::new(Vec::new()));
        let recorder = received.clone();
        topic.register_callback(move |_, data: &u32| {
            recorder.lock().unwrap().push(*data);
        });

        Publisher::publish(&mut topic, 3).unwrap();

        assert_eq!(*received.lock().unwrap(), vec![3]);
    }
}
