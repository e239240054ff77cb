//! Error types.
//!
//! [`Failure`] explains why a resolution attempt answered "no". It is an ordinary outcome,
//! recovered by rolling back and trying the next clause. [`Error`] reports misuse of the
//! construction API.

use thiserror::Error;

use crate::clause::ClauseId;
use crate::term::{AlreadyBound, TermId};

/// Why a unification or resolution attempt failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Failure {
    /// The argument count differs from the clause or query arity
    #[error("expected {expected} arguments, found {found}")]
    ArityMismatch {
        /// Declared arity
        expected: usize,
        /// Number of arguments supplied
        found: usize,
    },
    /// A bound term holds a value different from the one it was unified with
    #[error("{0} is bound to a different value")]
    UnificationFailure(TermId),
    /// No clause under the queried name and arity succeeded
    #[error("no clause matched")]
    NoMatchingClause,
    /// A handle that does not belong to this database
    #[error("{0} does not belong to this database")]
    UnknownTerm(TermId),
    /// Rule nesting went past [`Config::max_depth`](crate::Config::max_depth)
    #[error("rule nesting exceeded the configured depth of {0}")]
    DepthExceeded(usize),
}

/// Errors from building facts and rules or from editing terms directly
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// See [`AlreadyBound`]
    #[error(transparent)]
    AlreadyBound(#[from] AlreadyBound),
    /// A handle that does not belong to this database
    #[error("{0} does not belong to this database")]
    UnknownTerm(TermId),
    /// A rule referred to a term that is not one of its own variables
    #[error("{term} is not a variable of rule {rule}")]
    ForeignTerm {
        /// The offending term
        term: TermId,
        /// The rule being built
        rule: ClauseId,
    },
    /// A rule operation was given a clause that is a fact
    #[error("{0} is not a rule")]
    NotARule(ClauseId),
    /// The term is part of a stored fact or rule and cannot be edited directly
    #[error("{0} belongs to a stored clause")]
    ClauseTerm(TermId),
    /// [`Arg::Param`](crate::Arg::Param) named a head position the rule does not have yet
    #[error("rule {rule} has no head position {index}")]
    UnknownParam {
        /// The requested position
        index: usize,
        /// The rule being built
        rule: ClauseId,
    },
}

/// Result alias for construction operations
pub type Result<T> = std::result::Result<T, Error>;
