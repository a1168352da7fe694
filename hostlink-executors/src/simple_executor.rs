//!
//! The Simple Executor
//!
//! The simple executor is a single thread that stores each node in a
//! deadline-sorted vector, pops the node whose deadline has passed,
//! executes its update method and reinserts it with its next deadline.
//!
//! Note: the simple executor busy waits between node executions, so do
//! not expect it to yield CPU time to other processes while running.
//!

use crossbeam::channel::Receiver;

use quanta::{Clock, Instant};

use hostlink_core::{Executor, ExecutorState, Node};

use crate::{enqueue, ScheduledNode};

/// Simple Executor
///
/// Runs every node on the calling thread, soonest deadline first.
///
/// The executor can be interrupted by sending a `true` value over the
/// channel whose receiving end it owns.
pub struct SimpleExecutor {
    // The deadline-sorted backing vector for the executor.
    queue: Vec<ScheduledNode>,
    // The quanta high-precision clock backing the scheduler.
    clock: Clock,
    // The current state of the executor.
    state: ExecutorState,
    // The Instant the executor was started.
    start_instant: Instant,
    // The interrupt receiver channel.
    interrupt: Receiver<bool>,
    // Whether or not the executor has been interrupted.
    interrupted: bool,
}

impl SimpleExecutor {
    /// Create a new Simple Executor without any nodes.
    pub fn new(interrupt: Receiver<bool>) -> Self {
        Self::new_with(interrupt, Vec::new())
    }

    /// Create a new Simple Executor with a number of nodes.
    pub fn new_with(interrupt: Receiver<bool>, mut nodes: Vec<Box<dyn Node>>) -> Self {
        let mut queue = Vec::new();
        for node in nodes.drain(..) {
            queue.push(ScheduledNode { deadline: 0, node });
        }

        let clock = Clock::new();
        let now = clock.now();

        Self {
            queue,
            clock,
            state: ExecutorState::Stopped,
            start_instant: now,
            interrupt,
            interrupted: false,
        }
    }

    // Run the soonest-due node if its deadline has passed.
    fn update_next(&mut self) {
        let elapsed = self
            .clock
            .now()
            .duration_since(self.start_instant)
            .as_micros();

        if self.queue.last().is_some_and(|s| elapsed >= s.deadline) {
            let mut scheduled = self.queue.pop().unwrap();
            scheduled.node.update();
            scheduled.deadline += scheduled.node.get_update_delay_us();
            enqueue(&mut self.queue, scheduled);
        }
    }

    // Shut down every node and leave the executor stopped.
    fn stop(&mut self) {
        for scheduled in self.queue.iter_mut() {
            scheduled.deadline = 0;
            scheduled.node.shutdown();
        }
        self.state = ExecutorState::Stopped;
    }
}

impl Executor for SimpleExecutor {
    /// Reset every node's deadline, start every node, and record the
    /// start instant deadlines are measured from.
    ///
    /// Note: `update_for_ms` and `update_loop` call this themselves, so
    /// calling it before them is redundant.
    fn start(&mut self) {
        for scheduled in self.queue.iter_mut() {
            scheduled.deadline = 0;
            scheduled.node.start();
        }

        self.interrupted = false;
        self.state = ExecutorState::Started;
        self.start_instant = self.clock.now();
    }

    /// Start the nodes and run them for a given number of milliseconds
    /// before shutting them down.  An interrupt stops the executor
    /// early.
    fn update_for_ms(&mut self, ms: u128) {
        self.start();

        self.state = ExecutorState::Running;
        while self
            .clock
            .now()
            .duration_since(self.start_instant)
            .as_millis()
            < ms
            && !self.check_interrupt()
        {
            self.update_next();
        }

        self.stop();
    }

    /// Start the nodes and run them until an interrupt is received.
    fn update_loop(&mut self) {
        self.start();

        self.state = ExecutorState::Running;
        while !self.check_interrupt() {
            self.update_next();
        }

        self.stop();
    }

    /// Check the interrupt receiver for an interrupt.
    fn check_interrupt(&mut self) -> bool {
        if let Ok(interrupt) = self.interrupt.try_recv() {
            self.interrupted = interrupt;
        }
        self.interrupted
    }

    /// Add a node to the Simple Executor.
    ///
    /// Note: a node added while the executor is started or running is
    /// scheduled from the current instant rather than the executor's
    /// start.
    fn add_node(&mut self, node: Box<dyn Node>) {
        if self.state == ExecutorState::Stopped {
            self.queue.push(ScheduledNode { deadline: 0, node });
        } else {
            enqueue(
                &mut self.queue,
                ScheduledNode {
                    deadline: self
                        .clock
                        .now()
                        .duration_since(self.start_instant)
                        .as_micros(),
                    node,
                },
            );
        }
    }
}
