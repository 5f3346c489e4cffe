pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// A move that is not legal in the position it was applied to.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("illegal move `{uci}`")]
pub struct IllegalMoveError {
    pub uci: UciMove,
}
