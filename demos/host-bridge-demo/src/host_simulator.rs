//!
//! A stand-in for the autonomy host computer.
//!
//! Publishes the three command fragments at independent cadences,
//! including stretches where the chassis target drops back to the zero
//! vector so the bridge's offline reporting is visible downstream.
//!

use hostlink_core::Node;
use hostlink_topics::local::{Topic, TopicBus, TopicError};
use hostlink_bridge::{AttitudeTarget, ChassisTarget, FireCommand, HostCommandConfig};

/// Publishes simulated host command fragments onto the bus.
pub struct HostSimulator {
    attitude_topic: Topic<AttitudeTarget>,
    chassis_topic: Topic<ChassisTarget>,
    fire_topic: Topic<FireCommand>,
    tick: u32,
}

impl HostSimulator {
    /// Create a simulator publishing on the same topics the given
    /// bridge config subscribes to.
    pub fn new(bus: &TopicBus, config: &HostCommandConfig) -> Result<Self, TopicError> {
        Ok(Self {
            attitude_topic: bus.topic(&config.attitude_topic)?,
            chassis_topic: bus.topic(&config.chassis_topic)?,
            fire_topic: bus.topic(&config.fire_topic)?,
            tick: 0,
        })
    }
}

impl Node for HostSimulator {
    fn get_update_delay_us(&self) -> u128 {
        50_000
    }

    fn update(&mut self) {
        // Sweep the gimbal back and forth every tick.
        let sweep = (self.tick % 40) as f32 / 40.0 - 0.5;
        self.attitude_topic.publish(AttitudeTarget {
            roll: 0.0,
            pitch: sweep * 0.4,
            yaw: sweep,
        });

        // Drive for two seconds, stop for two seconds.
        let phase = self.tick % 80;
        let chassis = if phase < 40 {
            ChassisTarget {
                vx: 0.5,
                vy: 0.0,
                w: 0.2,
            }
        } else {
            ChassisTarget::default()
        };
        self.chassis_topic.publish(chassis);

        // The trigger arrives at a slower cadence than the motion
        // fragments.
        if self.tick % 5 == 0 {
            self.fire_topic.publish(FireCommand {
                fire: phase >= 20 && phase < 30,
            });
        }

        self.tick = self.tick.wrapping_add(1);
    }
}
