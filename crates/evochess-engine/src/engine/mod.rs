pub use self::{board::*, fen::*, movegen::*, outcome::*, position::*, replay::*};

pub(crate) mod board;
pub(crate) mod fen;
pub(crate) mod movegen;
pub(crate) mod outcome;
pub(crate) mod position;
pub(crate) mod replay;
pub(crate) mod zobrist;
