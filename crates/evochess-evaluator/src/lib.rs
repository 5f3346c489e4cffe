//! Position evaluation and move search driven by an evolvable genome.
//!
//! This crate turns a [`Genome`](genome::Genome) into a chess player:
//!
//! 1. **Genome** ([`genome`]) - Ten real-valued genes: five piece values and
//!    five term weights.
//!
//! 2. **Evaluation** ([`evaluator`]) - Scores a board as the genome-weighted sum
//!    of material, mobility, center control, king safety and pawn structure.
//!
//! 3. **Search** ([`search`]) - Picks a move with fixed-depth negamax and
//!    alpha-beta pruning, scoring leaves with the evaluator.
//!
//! # Architecture
//!
//! ```text
//! SearchEngine (choose a move)
//!     ↓ scores leaves with
//! GenomeEvaluator (score a position)
//!     ↓ parameterized by
//! Genome (piece values + term weights)
//! ```
//!
//! The genetic operators that create and recombine genomes live in the
//! `evochess-training` crate; this crate only consumes genomes.
//!
//! # Example
//!
//! ```
//! use evochess_engine::Board;
//! use evochess_evaluator::{genome::Genome, search::{Player, SearchEngine}};
//!
//! let engine = SearchEngine::new(Genome::default(), 2).unwrap();
//! let mv = engine.choose_move(&Board::initial()).unwrap();
//! assert!(Board::initial().apply(mv).is_ok());
//! ```

pub mod evaluator;
pub mod genome;
pub mod search;
