//!
//! Hostlink-Core is the collection of traits and shared message types that
//! lay out the core of the hostlink command-ingestion stack.
//!

#![deny(unsafe_code)]
#![deny(missing_docs)]

pub mod node;
pub use node::Node;

pub mod executor;
pub use executor::{Executor, ExecutorState};

pub mod publisher_subscriber;
pub use publisher_subscriber::{DeliveryContext, Publisher, Subscriber};

pub mod command;
pub use command::{ChassisVelocity, CommandSink, ControlSource, GimbalAttitude, RobotCommand};
