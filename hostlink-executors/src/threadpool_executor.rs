//!
//! The Threadpool Executor
//!
//! The threadpool executor takes control of a number of threads and
//! sends due nodes to a threadpool to be updated, collecting them back
//! onto the scheduling thread once their update completes.
//!

use std::cmp::max;

use quanta::{Clock, Instant};

use threadpool::ThreadPool;

use crossbeam::channel::{unbounded, Receiver};

use hostlink_core::{Executor, ExecutorState, Node};

use crate::{enqueue, ScheduledNode};

/// ThreadPool Executor
///
/// Stores nodes in a deadline-sorted vector and sends each due node to
/// the threadpool for its update.
///
/// Note: the scheduling happens on the calling thread, so the pool keeps
/// n-1 worker threads where n is the total number of threads allocated
/// to the executor.
pub struct ThreadPoolExecutor {
    // The deadline-sorted backing vector for the executor.
    queue: Vec<ScheduledNode>,
    // The quanta high-precision clock backing the scheduler.
    clock: Clock,
    // The pool nodes are updated on.
    pool: ThreadPool,
    // The current state of the executor.
    state: ExecutorState,
    // The Instant the executor was started.
    start_instant: Instant,
    // The interrupt receiver channel.
    interrupt: Receiver<bool>,
    // Whether or not the executor has been interrupted.
    interrupted: bool,
}

impl ThreadPoolExecutor {
    /// Create a new ThreadPool Executor without any nodes.
    pub fn new(threads: usize, interrupt: Receiver<bool>) -> Self {
        Self::new_with(threads, interrupt, Vec::new())
    }

    /// Create a new ThreadPool Executor with a number of nodes.
    pub fn new_with(
        threads: usize,
        interrupt: Receiver<bool>,
        mut nodes: Vec<Box<dyn Node>>,
    ) -> Self {
        let mut queue = Vec::new();
        for node in nodes.drain(..) {
            queue.push(ScheduledNode { deadline: 0, node });
        }

        let clock = Clock::new();
        let now = clock.now();
        let pool = ThreadPool::new(max(1, threads.saturating_sub(1)));

        Self {
            queue,
            clock,
            pool,
            state: ExecutorState::Stopped,
            start_instant: now,
            interrupt,
            interrupted: false,
        }
    }

    // Dispatch due nodes to the pool and reclaim finished ones until
    // `done` reports true.
    fn run_until(&mut self, mut done: impl FnMut(&mut Self) -> bool) {
        let (node_tx, node_rx) = unbounded();
        let mut in_flight = 0usize;

        while !done(self) {
            let elapsed = self
                .clock
                .now()
                .duration_since(self.start_instant)
                .as_micros();

            if self.queue.last().is_some_and(|s| elapsed >= s.deadline) {
                let mut scheduled = self.queue.pop().unwrap();
                let node_tx = node_tx.clone();
                in_flight += 1;
                self.pool.execute(move || {
                    scheduled.node.update();
                    scheduled.deadline += scheduled.node.get_update_delay_us();
                    node_tx.send(scheduled).unwrap();
                });
            }

            if let Ok(scheduled) = node_rx.try_recv() {
                in_flight -= 1;
                enqueue(&mut self.queue, scheduled);
            }
        }

        // Reclaim every node still on the pool before shutdown.
        drop(node_tx);
        while in_flight > 0 {
            match node_rx.recv() {
                Ok(scheduled) => {
                    in_flight -= 1;
                    enqueue(&mut self.queue, scheduled);
                }
                Err(_) => break,
            }
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

impl Executor for ThreadPoolExecutor {
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
        self.run_until(|executor| {
            executor
                .clock
                .now()
                .duration_since(executor.start_instant)
                .as_millis()
                >= ms
                || executor.check_interrupt()
        });

        self.stop();
    }

    /// Start the nodes and run them until an interrupt is received.
    fn update_loop(&mut self) {
        self.start();

        self.state = ExecutorState::Running;
        self.run_until(|executor| executor.check_interrupt());

        self.stop();
    }

    /// Check the interrupt receiver for an interrupt.
    fn check_interrupt(&mut self) -> bool {
        if let Ok(interrupt) = self.interrupt.try_recv() {
            self.interrupted = interrupt;
        }
        self.interrupted
    }

    /// Add a node to the ThreadPool Executor.
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

#[cfg(test)]
mod tests {
    use super::*;

    use std::{
        sync::{
            atomic::{AtomicBool, AtomicU32, Ordering},
            Arc,
        },
        thread,
        time::Duration,
    };

    struct ProbeNode {
        update_delay_us: u128,
        updates: Arc<AtomicU32>,
        running: Arc<AtomicBool>,
    }

    impl ProbeNode {
        fn new(update_delay_us: u128) -> (Self, Arc<AtomicU32>, Arc<AtomicBool>) {
            let updates = Arc::new(AtomicU32::new(0));
            let running = Arc::new(AtomicBool::new(false));
            (
                Self {
                    update_delay_us,
                    updates: updates.clone(),
                    running: running.clone(),
                },
                updates,
                running,
            )
        }
    }

    impl Node for ProbeNode {
        fn get_update_delay_us(&self) -> u128 {
            self.update_delay_us
        }

        fn start(&mut self) {
            self.running.store(true, Ordering::SeqCst);
        }

        fn update(&mut self) {
            self.updates.fetch_add(1, Ordering::SeqCst);
        }

        fn shutdown(&mut self) {
            self.running.store(false, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_update_for_ms_runs_nodes_at_their_rates() {
        let (_tx, rx) = unbounded();
        let (fast, fast_updates, _) = ProbeNode::new(10_000);
        let (slow, slow_updates, slow_running) = ProbeNode::new(25_000);

        let mut executor =
            ThreadPoolExecutor::new_with(3, rx, vec![Box::new(fast), Box::new(slow)]);
        executor.update_for_ms(100);

        let fast_count = fast_updates.load(Ordering::SeqCst);
        let slow_count = slow_updates.load(Ordering::SeqCst);
        assert!((8..=12).contains(&fast_count), "fast ran {fast_count} times");
        assert!((3..=5).contains(&slow_count), "slow ran {slow_count} times");
        assert!(!slow_running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_check_interrupt() {
        let (tx, rx) = unbounded();
        let (node, _, _) = ProbeNode::new(10_000);
        let mut executor = ThreadPoolExecutor::new_with(3, rx, vec![Box::new(node)]);

        tx.send(true).unwrap();

        assert!(executor.check_interrupt());
    }

    #[test]
    fn test_add_node_while_stopped() {
        let (_tx, rx) = unbounded();
        let mut executor = ThreadPoolExecutor::new(3, rx);

        let (node, _, _) = ProbeNode::new(10_000);
        executor.add_node(Box::new(node));

        assert_eq!(executor.queue.len(), 1);
    }

    #[test]
    fn test_update_loop_runs_until_interrupted() {
        let (tx, rx) = unbounded();
        let (node, updates, running) = ProbeNode::new(10_000);
        let mut executor = ThreadPoolExecutor::new_with(2, rx, vec![Box::new(node)]);

        let handle = thread::spawn(move || executor.update_loop());
        thread::sleep(Duration::from_millis(100));
        tx.send(true).unwrap();
        handle.join().unwrap();

        assert!(updates.load(Ordering::SeqCst) >= 8);
        assert!(!running.load(Ordering::SeqCst));
    }
}
