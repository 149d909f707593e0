//! The engine's control surface: ponder/decide lifecycle around a shared
//! MCTS tree. `start_decision`/`DecisionHandle` give an async-looking API
//! without an async runtime — a dedicated decision thread plus a oneshot
//! `std::sync::mpsc` channel, the same thread-based style as the teacher's
//! `engine::controller::SearchJob`.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::Rng;

use crate::board::{Color, Move, Position};
use crate::concurrency::WorkerPool;
use crate::config::EngineConfig;
use crate::mcts::Tree;
use crate::sync::StopFlag;

/// Minimum time between budget/timeout polls in the decision thread.
const DECISION_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// A handle to an in-flight [`MctsAgent::start_decision`] call. Stands in
/// for `future<Move>`: `wait` blocks for the natural result, `finalize`
/// forces an early one, `abort` discards it.
pub struct DecisionHandle {
    receiver: mpsc::Receiver<Move>,
    stop: StopFlag,
    handle: JoinHandle<()>,
}

impl DecisionHandle {
    /// Blocks until the decision thread reports its move.
    pub fn wait(self) -> Move {
        let mv = self
            .receiver
            .recv()
            .expect("decision thread dropped its sender without replying");
        let _ = self.handle.join();
        mv
    }

    /// "Make up your mind now": stops sampling immediately and returns
    /// whatever `best_move()` gives at that point.
    pub fn finalize(self) -> Move {
        self.stop.stop();
        self.wait()
    }

    /// Discards the decision. Still joins the thread so its worker pool
    /// winds down cleanly.
    pub fn abort(self) {
        self.stop.stop();
        let _ = self.handle.join();
    }
}

/// An MCTS-driven agent: owns the current position and its search tree,
/// and drives pondering/decision worker pools over them.
/// The decision-making surface a command loop drives. A single concrete
/// type implements it today ([`MctsAgent`]); the trait exists so a future
/// `RandomAgent` or similar could be swapped in without touching call
/// sites. `pause`/`resume` aren't part of this trait: they're thin
/// convenience wrappers over `stop_pondering`/`start_pondering`, and
/// `finalize_decision`/`abort_decision` live on the [`DecisionHandle`]
/// `start_decision` returns rather than as separate trait methods.
pub trait Agent {
    fn set_state(&mut self, position: Position);
    fn advance_state(&mut self, mv: Move);
    fn start_pondering(&mut self);
    fn stop_pondering(&mut self);
    fn decide(&mut self) -> Move;
    fn start_decision(&mut self, budget_secs: Option<f64>) -> DecisionHandle;
    fn accept_draw(&self, offered_by: Color) -> bool;
    fn idle(&mut self);
}

pub struct MctsAgent {
    config: EngineConfig,
    position: Position,
    tree: Arc<Tree>,
    ponder_pool: Option<WorkerPool>,
    paused: bool,
}

impl MctsAgent {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        crate::board::set_debug_invariants(config.debug_invariants());
        let position = Position::new();
        let tree = Arc::new(Tree::new(&position));
        MctsAgent {
            config,
            position,
            tree,
            ponder_pool: None,
            paused: false,
        }
    }

    #[must_use]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Stops pondering but remembers to resume it on [`Self::resume`].
    pub fn pause(&mut self) {
        self.stop_pondering();
        self.paused = true;
    }

    /// Resumes pondering if [`Self::pause`] stopped it.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.start_pondering();
        }
    }
}

impl Agent for MctsAgent {
    /// Replaces the position wholesale. Always discards the tree: there's
    /// no relation between an arbitrary new position and the old search.
    fn set_state(&mut self, position: Position) {
        if let Some(pool) = &self.ponder_pool {
            pool.between_ponderings(|tree, pos| {
                *pos = position.clone();
                *tree = Arc::new(Tree::new(pos));
            });
            let (tree, pos) = pool.snapshot();
            self.tree = tree;
            self.position = pos;
        } else {
            self.tree = Arc::new(Tree::new(&position));
            self.position = position;
        }
        #[cfg(feature = "logging")]
        log::debug!("set_state: discarding tree, unrelated to the previous position");
    }

    /// Commits `mv` (ours or the opponent's). Reuses the subtree rooted at
    /// `mv` when the current tree has already explored it; otherwise starts
    /// a fresh tree from the resulting position.
    fn advance_state(&mut self, mv: Move) {
        let reused = if let Some(pool) = &self.ponder_pool {
            pool.between_ponderings(|tree, position| {
                position.make_move(mv);
                match tree.advance(mv) {
                    Some(fresh) => {
                        *tree = Arc::new(fresh);
                        true
                    }
                    None => {
                        *tree = Arc::new(Tree::new(position));
                        false
                    }
                }
            })
        } else {
            self.position.make_move(mv);
            match self.tree.advance(mv) {
                Some(fresh) => {
                    self.tree = Arc::new(fresh);
                    true
                }
                None => {
                    self.tree = Arc::new(Tree::new(&self.position));
                    false
                }
            }
        };

        if let Some(pool) = &self.ponder_pool {
            let (tree, position) = pool.snapshot();
            self.tree = tree;
            self.position = position;
        }

        #[cfg(feature = "logging")]
        if reused {
            log::debug!("advance_state: reused subtree for {mv}");
        } else {
            log::debug!("advance_state: {mv} not among root's children, discarding tree");
        }
        #[cfg(not(feature = "logging"))]
        let _ = reused;
    }

    /// Starts sampling on the opponent's time. A no-op while paused or
    /// already pondering.
    fn start_pondering(&mut self) {
        if self.ponder_pool.is_some() || self.paused {
            return;
        }
        self.ponder_pool = Some(WorkerPool::spawn(
            self.config.worker_count(),
            Arc::clone(&self.tree),
            self.position.clone(),
            self.config.uct_exploration_constant(),
            StopFlag::new(),
        ));
        #[cfg(feature = "logging")]
        log::info!("pondering started with {} workers", self.config.worker_count());
    }

    /// Stops pondering, keeping whatever statistics it accumulated.
    fn stop_pondering(&mut self) {
        if let Some(pool) = self.ponder_pool.take() {
            pool.stop_and_join();
            #[cfg(feature = "logging")]
            log::info!("pondering stopped");
        }
    }

    /// Settles into a quiescent baseline: no pondering, no in-flight
    /// decision (the caller is responsible for resolving any outstanding
    /// `DecisionHandle` first).
    fn idle(&mut self) {
        self.stop_pondering();
        self.paused = false;
    }

    /// Synchronous decision: samples for the configured budget, then
    /// returns the most-visited root child.
    fn decide(&mut self) -> Move {
        self.start_decision(None).wait()
    }

    /// Launches a decision task that samples until `sample_budget` root
    /// visits are reached or `budget_secs` (falling back to the configured
    /// `decision_timeout`) elapses, then resolves to `best_move()`.
    ///
    /// Absorbs any active pondering: its accumulated tree becomes the
    /// starting point for the decision rather than being thrown away.
    fn start_decision(&mut self, budget_secs: Option<f64>) -> DecisionHandle {
        self.stop_pondering();

        let stop = StopFlag::new();
        let tree = Arc::clone(&self.tree);
        let root = tree.root();
        let pool = WorkerPool::spawn(
            self.config.worker_count(),
            Arc::clone(&self.tree),
            self.position.clone(),
            self.config.uct_exploration_constant(),
            stop.clone(),
        );

        let timeout = budget_secs
            .map(Duration::from_secs_f64)
            .unwrap_or_else(|| self.config.decision_timeout());
        let sample_budget = self.config.sample_budget();
        let mut fallback_position = self.position.clone();
        let decision_stop = stop.clone();
        let (sender, receiver) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("mcts-decision".to_string())
            .spawn(move || {
                let deadline = Instant::now() + timeout;
                while !decision_stop.is_stopped()
                    && tree.visits(root) < sample_budget
                    && Instant::now() < deadline
                {
                    thread::sleep(DECISION_POLL_INTERVAL);
                }
                decision_stop.stop();
                pool.stop_and_join();

                let mv = tree.best_move().unwrap_or_else(|| {
                    fallback_position
                        .fast_random_move(&mut rand::thread_rng())
                        .expect("a playable position always has at least one pseudolegal move")
                });
                let _ = sender.send(mv);
            })
            .expect("failed to spawn mcts decision thread");

        DecisionHandle { receiver, stop, handle }
    }

    /// Whether to accept a draw offer from `color`. Default policy is a
    /// flat Bernoulli draw independent of the position; the argument is
    /// carried for a future policy that weighs it by search evaluation.
    fn accept_draw(&self, _offered_by: Color) -> bool {
        rand::thread_rng().gen_bool(self.config.draw_accept_probability())
    }
}

impl Drop for MctsAgent {
    fn drop(&mut self) {
        self.stop_pondering();
    }
}
