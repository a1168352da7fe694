//!
//! Hostlink Bridge
//!
//! The nodes that ingest an autonomy host computer's commands into a
//! hostlink control stack.  The host publishes its gimbal target,
//! chassis velocity and fire trigger as independent fragments; the
//! bridge merges the latest known value of each into one `RobotCommand`
//! and hands it to the downstream command arbiter on every arrival.
//!

#![deny(missing_docs)]

pub mod messages;
pub use messages::{AttitudeTarget, ChassisTarget, FireCommand, FireState};

pub mod host_command_bridge;
pub use host_command_bridge::{
    CommandTopicSink, HostCommandBridge, HostCommandConfig, DATA_TIMEOUT,
};

pub mod udp_relay;
pub use udp_relay::UdpRelay;
