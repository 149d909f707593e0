//! Arena-encoded tree node. The arena itself (a `Vec<Node>` behind a lock)
//! lives in [`super::tree::Tree`]; this module only owns the per-node shape
//! and the lock-free visit/result counters workers update on the hot path.

use std::ops::Range;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};

use crate::board::Move;

/// Index into a [`Tree`](super::tree::Tree)'s node arena.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// `total_result` is accumulated as a fixed-point integer so it can live in
/// an `AtomicI64`: a plain `f64` has no atomic form on stable Rust.
const RESULT_SCALE: f64 = 1_000_000.0;

/// One node of the search tree. `children` is an empty range for an
/// unexpanded leaf; once expanded it addresses a contiguous block in the
/// same arena (siblings are allocated together, see `Tree::expand`).
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    /// The move that produced this node from its parent. `None` only for
    /// the tree's root.
    pub(crate) mv: Option<Move>,
    pub(crate) hash: u64,
    pub(crate) children: Range<u32>,
    visits: AtomicU32,
    total_result: AtomicI64,
}

impl Node {
    pub(crate) fn new(parent: Option<NodeId>, mv: Option<Move>, hash: u64) -> Self {
        Node {
            parent,
            mv,
            hash,
            children: 0..0,
            visits: AtomicU32::new(0),
            total_result: AtomicI64::new(0),
        }
    }

    #[must_use]
    pub fn visits(&self) -> u32 {
        self.visits.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        let visits = self.visits();
        if visits == 0 {
            return 0.0;
        }
        self.total_result.load(Ordering::Relaxed) as f64 / RESULT_SCALE / f64::from(visits)
    }

    /// `uct = mean + exploration_constant * sqrt(ln(parent_visits) / visits)`,
    /// with a sentinel to force at least one visit to every child first.
    /// `exploration_constant = sqrt(2.0)` reproduces the classical
    /// `sqrt(2 * ln(parent) / child)` formula exactly.
    #[must_use]
    pub(crate) fn uct(&self, parent_visits: u32, exploration_constant: f64) -> f64 {
        let visits = self.visits();
        if visits == 0 {
            return 1e6;
        }
        let exploration = exploration_constant * (f64::from(parent_visits).ln() / f64::from(visits)).sqrt();
        self.mean() + exploration
    }

    /// Records one rollout result. Visits are bumped before the result is
    /// added so a concurrent reader never observes a non-zero result paired
    /// with zero visits — only the harmless reverse (visits ahead of the
    /// result they're about to carry).
    pub(crate) fn record(&self, result: f64) {
        self.visits.fetch_add(1, Ordering::Relaxed);
        let scaled = (result * RESULT_SCALE).round() as i64;
        self.total_result.fetch_add(scaled, Ordering::Relaxed);
    }

    pub(crate) fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    /// Raw fixed-point accumulator, for copying counts verbatim when a
    /// subtree is moved to fresh storage (tree reuse).
    pub(crate) fn raw_total_result(&self) -> i64 {
        self.total_result.load(Ordering::Relaxed)
    }

    pub(crate) fn adopt_counts(&self, visits: u32, raw_total_result: i64) {
        self.visits.store(visits, Ordering::Relaxed);
        self.total_result.store(raw_total_result, Ordering::Relaxed);
    }
}
