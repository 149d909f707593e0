//! Monte-Carlo Tree Search: an arena-encoded tree shared by concurrent
//! samplers, selected with UCT, reused across turns when the played move is
//! among the root's children.

mod node;
mod tree;

pub use node::NodeId;
pub use tree::{SampleOutcome, Tree};
