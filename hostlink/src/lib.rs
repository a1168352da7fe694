//!
//! # Hostlink
//!
//! Hostlink is the glue between an autonomy host computer and a robot's
//! onboard command arbitration.  The host publishes the pieces of its
//! overall command (a gimbal attitude target, a chassis velocity, a fire
//! trigger) independently and at its own rates; the robot needs one
//! internally-consistent command record per control tick.
//!
//! ## Technical Overview
//!
//! Work is split into Nodes (as in Ros): each node holds the
//! communication primitives it consumes and produces, and an executor
//! gives it execution time at its requested rate.  Data moves between
//! nodes over named topics on a process-local `TopicBus`; topics deliver
//! both by poll-style subscriber (for periodic consumers) and by
//! synchronous callback (for reactive consumers that must run before
//! the publishing call returns).
//!
//! The centerpiece is the `HostCommandBridge`: it registers a receiver
//! callback on each of the three fragment topics, keeps a
//! latest-value slot plus arrival stamp per fragment kind, and on every
//! arrival merges the three current slots into a `RobotCommand` that is
//! handed to the downstream `CommandSink` before the publish returns.
//! A trivial fragment value (all-zero chassis vector, zero pitch and
//! yaw) marks its field offline instead of being forwarded, and the
//! recorded arrival stamps can optionally gate fields offline once they
//! exceed a staleness threshold.
//!
//! Fragments reach the bus however the deployment likes; the provided
//! UDP transport carries them as fixed-size little-endian datagrams
//! that a `UdpRelay` node replays onto the bus in arrival order.
//!
//! ## Demos
//!
//! The `demos/` workspace members wire the whole path together: a
//! simulated host, the bridge, and a consumer of the assembled
//! commands, running on the provided executors until Ctrl-C.
//!

pub mod prelude;

/// The host-command ingestion nodes
pub use hostlink_bridge as bridge;
/// Hostlink Core Traits and Command Model
pub use hostlink_core as core;
/// Hostlink Executors
pub use hostlink_executors as executors;
/// Hostlink Topic Bus and Transports
pub use hostlink_topics as topics;
/// Hostlink Wire-Format Utilities
pub use hostlink_utils as utils;
