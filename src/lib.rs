//! Boolean matching of combinational and-inverter graphs.
//!
//! Networks are read from AIGER files (see [`Aig::from_file`]) or built directly, then compared
//! with [`matching::BooleanMatcher`], which looks for an input and output pairing under which
//! both compute the same functions.

pub mod aig;
pub mod cnf;
pub mod dfs;
pub mod matching;
pub mod miter;
pub mod sim;
pub mod support;

// Re-exporting symbols and modules.
pub use aig::{
    Aig, AigEdge, AigError, AigNode, AigNodeRef, LevelIndex, NodeId, ParserError, Result,
};
pub use matching::{BooleanMatcher, MatchConfig, MatchMode, MatchOutcome, Matching, Verdict};
