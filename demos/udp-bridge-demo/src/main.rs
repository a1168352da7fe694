//!
//! This demo runs the ingestion path the way a deployment would: the
//! host's fragments arrive as UDP datagrams, relay nodes replay them
//! onto the local bus, and the bridge feeds a sink directly.  The host
//! itself is simulated in-process and everything runs on a threadpool
//! executor until Ctrl-C.
//!

#![deny(missing_docs)]

use crossbeam::channel::unbounded;

use tracing_subscriber::EnvFilter;

use hostlink_core::{CommandSink, DeliveryContext, Executor, RobotCommand};
use hostlink_executors::ThreadPoolExecutor;
use hostlink_topics::{local::TopicBus, udp::UdpFeedSubscriber};
use hostlink_bridge::{
    AttitudeTarget, ChassisTarget, FireCommand, HostCommandBridge, HostCommandConfig, UdpRelay,
};

pub mod host_simulator;
use host_simulator::UdpHostSimulator;

/// A sink standing in for the command arbiter's ingestion method.
struct ConsoleSink;

impl CommandSink for ConsoleSink {
    fn feed(&self, _context: DeliveryContext, command: RobotCommand) {
        println!(
            "chassis [{}] ({:.2}, {:.2}, {:.2})  gimbal [{}] (pitch {:.2}, yaw {:.2})  fire {}",
            if command.chassis_online { "online" } else { "offline" },
            command.chassis.x,
            command.chassis.y,
            command.chassis.z,
            if command.gimbal_online { "online" } else { "offline" },
            command.gimbal.pitch,
            command.gimbal.yaw,
            command.fire,
        );
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let bus = TopicBus::new();
    let config = HostCommandConfig::default();

    // Bind one feed per fragment kind; the simulator targets whatever
    // ports the feeds end up on.
    let attitude_feed =
        UdpFeedSubscriber::<AttitudeTarget>::new("127.0.0.1:0".parse().unwrap())
            .expect("attitude feed");
    let chassis_feed = UdpFeedSubscriber::<ChassisTarget>::new("127.0.0.1:0".parse().unwrap())
        .expect("chassis feed");
    let fire_feed = UdpFeedSubscriber::<FireCommand>::new("127.0.0.1:0".parse().unwrap())
        .expect("fire feed");

    let simulator = UdpHostSimulator::new(
        attitude_feed.local_addr().expect("attitude addr"),
        chassis_feed.local_addr().expect("chassis addr"),
        fire_feed.local_addr().expect("fire addr"),
    )
    .expect("simulator sockets");

    let attitude_relay = UdpRelay::new(
        attitude_feed,
        bus.topic(&config.attitude_topic).expect("attitude topic"),
        2_000,
    );
    let chassis_relay = UdpRelay::new(
        chassis_feed,
        bus.topic(&config.chassis_topic).expect("chassis topic"),
        2_000,
    );
    let fire_relay = UdpRelay::new(
        fire_feed,
        bus.topic(&config.fire_topic).expect("fire topic"),
        2_000,
    );

    let bridge =
        HostCommandBridge::new(&bus, config, ConsoleSink).expect("bridge topics");

    let (tx, rx) = unbounded();
    ctrlc::set_handler(move || tx.send(true).expect("Could not send interrupt"))
        .expect("Error setting Ctrl-C handler");

    let mut executor = ThreadPoolExecutor::new_with(
        4,
        rx,
        vec![
            Box::new(simulator),
            Box::new(attitude_relay),
            Box::new(chassis_relay),
            Box::new(fire_relay),
            Box::new(bridge),
        ],
    );

    executor.update_loop();
}
