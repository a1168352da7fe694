//!
//! This demo wires the full ingestion path together on the local topic
//! bus: a simulated host publishes command fragments at independent
//! rates, the bridge assembles them into robot commands on an outbound
//! topic, and a consumer node reports what the arbiter would see.
//!
//! Run with `RUST_LOG=debug` (or `trace`) to watch the bridge's own
//! events alongside the consumer's output.
//!

#![deny(missing_docs)]

use crossbeam::channel::unbounded;

use tracing_subscriber::EnvFilter;

use hostlink_core::Executor;
use hostlink_executors::SimpleExecutor;
use hostlink_topics::local::TopicBus;
use hostlink_bridge::{HostCommandBridge, HostCommandConfig, DATA_TIMEOUT};

pub mod host_simulator;
use host_simulator::HostSimulator;

pub mod command_consumer;
use command_consumer::CommandConsumer;

/// The outbound topic the bridge publishes assembled commands on.
const COMMAND_TOPIC: &str = "robot_command";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let bus = TopicBus::new();
    let config = HostCommandConfig {
        stale_after: Some(DATA_TIMEOUT),
        ..Default::default()
    };

    let simulator = HostSimulator::new(&bus, &config).expect("fragment topics");
    let bridge = HostCommandBridge::with_command_topic(&bus, config, COMMAND_TOPIC)
        .expect("bridge topics");
    let consumer = CommandConsumer::new(&bus, COMMAND_TOPIC).expect("command topic");

    let (tx, rx) = unbounded();
    ctrlc::set_handler(move || tx.send(true).expect("Could not send interrupt"))
        .expect("Error setting Ctrl-C handler");

    let mut executor = SimpleExecutor::new_with(
        rx,
        vec![
            Box::new(simulator),
            Box::new(bridge),
            Box::new(consumer),
        ],
    );

    executor.update_loop();
}
