//!
//! A node that pumps a UDP fragment feed onto a local bus topic.
//!
//! Each tick the relay drains every datagram that arrived since the
//! last tick and republishes them one at a time, in arrival order, so
//! reactive consumers of the topic see every arrival rather than a
//! sampled latest value.
//!

use hostlink_core::Node;
use hostlink_topics::{local::Topic, udp::UdpFeedSubscriber};
use hostlink_utils::wire::WireFormat;

/// Republishes a UDP fragment feed onto a topic.
pub struct UdpRelay<Data: WireFormat + Copy + Send + Sync + 'static> {
    feed: UdpFeedSubscriber<Data>,
    topic: Topic<Data>,
    update_delay_us: u128,
}

impl<Data: WireFormat + Copy + Send + Sync + 'static> UdpRelay<Data> {
    /// Create a relay that drains `feed` onto `topic` every
    /// `update_delay_us` microseconds.
    pub fn new(feed: UdpFeedSubscriber<Data>, topic: Topic<Data>, update_delay_us: u128) -> Self {
        Self {
            feed,
            topic,
            update_delay_us,
        }
    }
}

impl<Data: WireFormat + Copy + Send + Sync + 'static> Node for UdpRelay<Data> {
    fn get_update_delay_us(&self) -> u128 {
        self.update_delay_us
    }

    fn update(&mut self) {
        for fragment in self.feed.drain() {
            self.topic.publish(fragment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{
        net::SocketAddr,
        sync::{Arc, Mutex},
        thread,
        time::Duration,
    };

    use hostlink_core::Publisher;
    use hostlink_topics::{local::TopicBus, udp::UdpPublisher};

    use crate::messages::ChassisTarget;

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[test]
    fn test_relay_republishes_every_arrival() {
        let bus = TopicBus::new();
        let topic = bus.topic::<ChassisTarget>("host_chassis_data").unwrap();

        let received = Arc::new(Mutex::new(Vec::new()));
        let recorder = received.clone();
        topic.register_callback(move |_, fragment: &ChassisTarget| {
            recorder.lock().unwrap().push(*fragment);
        });

        let feed = UdpFeedSubscriber::<ChassisTarget>::new(loopback()).unwrap();
        let mut publisher =
            UdpPublisher::<ChassisTarget>::new(loopback(), vec![feed.local_addr().unwrap()])
                .unwrap();
        let mut relay = UdpRelay::new(feed, topic, 2_000);

        for vx in [1.0f32, 2.0, 3.0] {
            publisher
                .publish(ChassisTarget { vx, vy: 0.0, w: 0.0 })
                .unwrap();
        }
        thread::sleep(Duration::from_millis(50));
        relay.update();

        let fragments = received.lock().unwrap();
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[2].vx, 3.0);
    }
}
