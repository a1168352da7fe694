//!
//! An executor handles the scheduling and execution of nodes.
//!
//! Most users should use one of the executors provided by
//! hostlink-executors.  This trait exists as the common interface to all
//! of them and lets users write their own executors where the provided
//! ones do not fit.
//!

use crate::node::Node;

/// The current state an executor is in.
///
/// This should be taken into account whenever the start or update methods
/// are called on an executor so that the executor can be put into the
/// correct state before executing a method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutorState {
    /// The nodes in the executor are currently stopped.
    ///
    /// The nodes must be started before updating can begin.
    Stopped,
    /// The nodes in the executor have been started and can now be updated.
    Started,
    /// The nodes in the executor are currently being updated.
    Running,
}

/// An executor handles the scheduling and execution of nodes.
pub trait Executor {
    /// Start the nodes contained by the executor.
    fn start(&mut self);

    /// Run the update loop for a set amount of time (in milliseconds).
    fn update_for_ms(&mut self, ms: u128);

    /// Run the update loop until the executor's interrupt is triggered.
    fn update_loop(&mut self);

    /// Check whether the program has been interrupted.
    ///
    /// Note: this should be checked between node executions.
    fn check_interrupt(&mut self) -> bool;

    /// Add a node to the executor.
    fn add_node(&mut self, node: Box<dyn Node>);
}
