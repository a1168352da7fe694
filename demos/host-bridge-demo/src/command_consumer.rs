//!
//! A stand-in for the downstream command arbiter.
//!
//! Reads the assembled commands through a TTL subscriber so a host that
//! goes quiet shows up as "offline" rather than as a frozen last
//! command.
//!

use std::time::Duration;

use hostlink_core::{Node, RobotCommand, Subscriber};
use hostlink_topics::local::{TopicBus, TopicError, TtlSubscriber};

/// Prints what the arbiter would currently act on.
pub struct CommandConsumer {
    subscriber: TtlSubscriber<RobotCommand>,
}

impl CommandConsumer {
    /// Subscribe to the bridge's outbound command topic.
    pub fn new(bus: &TopicBus, command_topic: &str) -> Result<Self, TopicError> {
        Ok(Self {
            subscriber: bus
                .topic::<RobotCommand>(command_topic)?
                .subscribe_ttl(Duration::from_millis(200)),
        })
    }
}

impl Node for CommandConsumer {
    fn get_update_delay_us(&self) -> u128 {
        100_000
    }

    fn update(&mut self) {
        match self.subscriber.get() {
            Some((command, _)) => println!(
                "chassis [{}] ({:.2}, {:.2}, {:.2})  gimbal [{}] (pitch {:.2}, yaw {:.2})  fire {}",
                if command.chassis_online { "online" } else { "offline" },
                command.chassis.x,
                command.chassis.y,
                command.chassis.z,
                if command.gimbal_online { "online" } else { "offline" },
                command.gimbal.pitch,
                command.gimbal.yaw,
                command.fire,
            ),
            None => println!("host offline"),
        }
    }
}
