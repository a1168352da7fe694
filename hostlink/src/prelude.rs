//!
//! A single import surface for the commonly used hostlink items.
//!

pub use hostlink_core::{
    ChassisVelocity, CommandSink, ControlSource, DeliveryContext, Executor, ExecutorState,
    GimbalAttitude, Node, Publisher, RobotCommand, Subscriber,
};

pub use hostlink_utils::wire::{WireError, WireFormat};

pub use hostlink_topics::{
    local::{Topic, TopicBus, TopicError, TopicSubscriber, TtlSubscriber},
    udp::{UdpFeedSubscriber, UdpPublishError, UdpPublisher},
};

pub use hostlink_executors::{SimpleExecutor, ThreadPoolExecutor};

pub use hostlink_bridge::{
    AttitudeTarget, ChassisTarget, CommandTopicSink, FireCommand, FireState, HostCommandBridge,
    HostCommandConfig, UdpRelay, DATA_TIMEOUT,
};
