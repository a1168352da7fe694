//!
//! The unified robot command record and the seam it is handed through.
//!
//! Every command ingestion path in a hostlink stack (remote controller,
//! host computer, ...) assembles its inputs into one `RobotCommand` and
//! feeds it to the command arbiter through the `CommandSink` trait.  The
//! arbiter's policy for choosing between sources is not part of this
//! crate; only the hand-off contract is.
//!

use crate::publisher_subscriber::DeliveryContext;

/// The origin of a command.
///
/// The downstream arbiter uses the source tag to attribute commands and
/// prioritize between concurrently-active control paths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControlSource {
    /// The operator's remote controller.
    #[default]
    Remote,
    /// The autonomy host computer.
    Host,
}

/// A chassis velocity target in the chassis frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChassisVelocity {
    /// Forward velocity (m/s).
    pub x: f32,
    /// Leftward velocity (m/s).
    pub y: f32,
    /// Angular velocity around the vertical axis (rad/s).
    pub z: f32,
}

/// A gimbal attitude target.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GimbalAttitude {
    /// Roll angle (rad).
    pub roll: f32,
    /// Pitch angle (rad).
    pub pitch: f32,
    /// Yaw angle (rad).
    pub yaw: f32,
}

/// The unified command record handed to the command arbiter.
///
/// `chassis_online` and `gimbal_online` report whether a non-trivial value
/// was observed for the field, not whether the value is valid.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RobotCommand {
    /// The chassis velocity target.
    pub chassis: ChassisVelocity,
    /// Whether the chassis field carries a live, non-trivial value.
    pub chassis_online: bool,
    /// The gimbal attitude target.
    pub gimbal: GimbalAttitude,
    /// Whether the gimbal field carries a live, non-trivial value.
    pub gimbal_online: bool,
    /// Whether the launcher should fire.
    pub fire: bool,
    /// The control path this command originates from.
    pub source: ControlSource,
}

/// The ingestion seam of the downstream command arbiter.
///
/// `feed` must complete synchronously and is expected to be called from
/// whatever context the triggering transport delivers on, including
/// interrupt-like contexts; implementations must follow the discipline
/// the given `DeliveryContext` demands.
pub trait CommandSink: Send + Sync {
    /// Feed one assembled command into the arbiter.
    fn feed(&self, context: DeliveryContext, command: RobotCommand);
}
