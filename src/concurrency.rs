//! Worker pool driving concurrent MCTS sampling.
//!
//! Each worker is a plain OS thread with its own thread-local RNG, looping
//! `tree.sample(...)` against a shared `(tree, position)` pair until told to
//! stop. The pair lives behind a `parking_lot::RwLock` rather than being
//! captured by value per thread, so `between_ponderings` can swap in a
//! reused subtree (tree reuse across turns) or a brand new position and
//! have every worker pick it up on its next sample.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread::{self, JoinHandle};

use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::board::Position;
use crate::mcts::Tree;
use crate::sync::StopFlag;

struct WorkerShared {
    tree: Arc<Tree>,
    position: Position,
}

pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    pending_change: Arc<AtomicBool>,
    barrier_in: Arc<Barrier>,
    barrier_out: Arc<Barrier>,
    stop: StopFlag,
    shared: Arc<RwLock<WorkerShared>>,
}

impl WorkerPool {
    /// Spawns `worker_count` (clamped to at least 1) threads sampling
    /// `tree` against `position` until `stop` is set.
    #[must_use]
    pub fn spawn(worker_count: usize, tree: Arc<Tree>, position: Position, exploration_constant: f64, stop: StopFlag) -> Self {
        let worker_count = worker_count.max(1);
        // The controller joins the same handshake from `between_ponderings`,
        // so the barrier capacity is one more than the worker count.
        let barrier_in = Arc::new(Barrier::new(worker_count + 1));
        let barrier_out = Arc::new(Barrier::new(worker_count + 1));
        let pending_change = Arc::new(AtomicBool::new(false));
        let shared = Arc::new(RwLock::new(WorkerShared { tree, position }));

        let handles = (0..worker_count)
            .map(|id| {
                let shared = Arc::clone(&shared);
                let pending_change = Arc::clone(&pending_change);
                let barrier_in = Arc::clone(&barrier_in);
                let barrier_out = Arc::clone(&barrier_out);
                let stop = stop.clone();
                thread::Builder::new()
                    .name(format!("mcts-worker-{id}"))
                    .spawn(move || run_worker(id, &shared, exploration_constant, &pending_change, &barrier_in, &barrier_out, &stop))
                    .expect("failed to spawn mcts worker thread")
            })
            .collect();

        WorkerPool {
            handles,
            pending_change,
            barrier_in,
            barrier_out,
            stop,
            shared,
        }
    }

    /// Parks every worker at the quiescence barrier and runs `change` with
    /// exclusive write access to the shared tree/position, so it can swap
    /// in a reused subtree or an entirely new position. Workers pick up
    /// whatever `change` left behind on their very next sample.
    pub fn between_ponderings<T>(&self, change: impl FnOnce(&mut Arc<Tree>, &mut Position) -> T) -> T {
        self.pending_change.store(true, Ordering::Release);
        self.barrier_in.wait();
        #[cfg(feature = "logging")]
        log::info!("quiescence barrier: workers parked for exclusive mutation");
        let mut guard = self.shared.write();
        let result = change(&mut guard.tree, &mut guard.position);
        drop(guard);
        self.pending_change.store(false, Ordering::Release);
        self.barrier_out.wait();
        #[cfg(feature = "logging")]
        log::info!("quiescence barrier: workers resumed");
        result
    }

    /// The pool's current tree and position, e.g. to mirror a controller's
    /// own bookkeeping after a `between_ponderings` call.
    #[must_use]
    pub fn snapshot(&self) -> (Arc<Tree>, Position) {
        let guard = self.shared.read();
        (Arc::clone(&guard.tree), guard.position.clone())
    }

    /// Signals every worker to stop and waits for them to exit. Workers
    /// parked mid-handshake are released first so they can observe the
    /// stop flag.
    pub fn stop_and_join(mut self) {
        self.stop.stop();
        if self.pending_change.load(Ordering::Acquire) {
            self.pending_change.store(false, Ordering::Release);
            self.barrier_out.wait();
        }
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn run_worker(
    id: usize,
    shared: &RwLock<WorkerShared>,
    exploration_constant: f64,
    pending_change: &AtomicBool,
    barrier_in: &Barrier,
    barrier_out: &Barrier,
    stop: &StopFlag,
) {
    #[cfg(feature = "logging")]
    log::info!("mcts worker {id} starting");
    #[cfg(not(feature = "logging"))]
    let _ = id;

    let mut rng = StdRng::from_entropy();
    while !stop.is_stopped() {
        if pending_change.load(Ordering::Acquire) {
            barrier_in.wait();
            barrier_out.wait();
            continue;
        }
        let (tree, position) = {
            let guard = shared.read();
            (Arc::clone(&guard.tree), guard.position.clone())
        };
        tree.sample(&position, &mut rng, exploration_constant);
    }

    #[cfg(feature = "logging")]
    log::info!("mcts worker {id} stopping");
}
