//!
//! A Singular Unit of Work.
//!
//! In hostlink, a Node is one unit of work that is given execution time
//! every x microseconds by an executor.  A robot control stack is split
//! into Nodes that each consume data from the communication primitives
//! they hold and hand their outputs to the next stage of the stack.
//!

/// A Node represents a singular process that performs some singular
/// purpose.
///
/// Reactive nodes (for example, ones whose real work happens inside topic
/// callbacks) still implement Node so an executor owns their lifecycle and
/// gives them a periodic monitor tick.
pub trait Node: Send {
    /// Return the delay (in us) between updates of this node.
    fn get_update_delay_us(&self) -> u128;

    /// Complete the necessary setup functionality for a Node.
    ///
    /// Called once when the executor that owns this node starts, before
    /// the first update.
    fn start(&mut self) {}

    /// Update is called by the executor every `get_update_delay_us`
    /// microseconds and contains the periodic work of the node.
    fn update(&mut self);

    /// Called by the executor when it stops so the node can clean up
    /// any work started during its updates.
    fn shutdown(&mut self) {}
}
