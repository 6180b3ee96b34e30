use thiserror::Error;

use crate::{matching::MatchError, miter::MiterError};

use super::NodeId;

/// The result of an AIG operation.
pub type Result<T> = std::result::Result<T, AigError>;

/// Error returned when an AIG operation failed.
///
/// Negative matching verdicts are never reported through this type, see [`crate::Verdict`].
#[derive(Debug, Error)]
pub enum AigError {
    /// The id 0 is reserved for the `False` constant node only.
    #[error("id=0 is for node False only")]
    IdZeroButNotFalse,

    /// The node with given id does not exist.
    #[error("node with id={0} does not exist")]
    NodeDoesNotExist(NodeId),

    /// Primary input position out of range.
    #[error("input index {index} out of range (network has {len} inputs)")]
    InputOutOfRange { index: usize, len: usize },

    /// Primary output position out of range.
    #[error("output index {index} out of range (network has {len} outputs)")]
    OutputOutOfRange { index: usize, len: usize },

    /// A vector meant to be a permutation of `0..len` is not one.
    #[error("{0:?} is not a permutation of 0..{1}")]
    InvalidPermutation(Vec<usize>, usize),

    /// The AIG has reached an invalid state. This should never happen.
    /// For example, when tracking the nodes internally with the hashmap nodes,
    /// node `nodes[id]` should have id `id`.
    #[error("the AIG has reached an invalid state - this should not happen - error: {0}")]
    InvalidState(String),

    /// Just forwarding a [`MiterError`].
    #[error("{0}")]
    MiterError(#[from] MiterError),

    /// Just forwarding a [`ParserError`].
    #[error("{0}")]
    ParserError(#[from] ParserError),

    /// Just forwarding a [`MatchError`].
    #[error("{0}")]
    MatchError(#[from] MatchError),
}

/// Error returned when parsing from file failed.
///
/// It is defined here because the `parser` module is private.
#[derive(Debug, Error)]
pub enum ParserError {
    /// All features are not supported (only combinational AIGER files).
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// Invalid token, something else was expected.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// An IO error occured (file doesn't exist, or doesn't have the right extension, ...).
    #[error("io error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for ParserError {
    fn from(value: std::io::Error) -> Self {
        ParserError::IoError(value.to_string())
    }
}
