use std::fmt;
use std::hash::Hash;

use indexmap::{Equivalent, IndexMap};

use crate::relation::Relation;
use crate::rule::Rule;

/// Handle to a fact or rule stored in a [`Database`](crate::Database)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClauseId(pub(crate) usize);

impl fmt::Display for ClauseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle returned by [`Database::add_fact`](crate::Database::add_fact)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FactHandle(pub(crate) ClauseId);

/// Handle returned by [`RuleBuilder::handle`](crate::RuleBuilder::handle)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleHandle(pub(crate) ClauseId);

impl FactHandle {
    /// The underlying clause id
    #[must_use]
    pub fn id(self) -> ClauseId {
        self.0
    }
}

impl RuleHandle {
    /// The underlying clause id
    #[must_use]
    pub fn id(self) -> ClauseId {
        self.0
    }
}

/// Something stored under a relation name
#[derive(Debug, Clone)]
pub enum Clause<N> {
    /// A ground tuple
    Fact(Relation),
    /// A parameterized relation with a body
    Rule(Rule<N>),
}

impl<N> Clause<N> {
    /// Number of argument positions
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            Self::Fact(fact) => fact.arity(),
            Self::Rule(rule) => rule.arity(),
        }
    }
}

/// Clause arena plus the index from relation name to clauses, in declaration order
#[derive(Debug)]
pub(crate) struct Clauses<N> {
    clauses: Vec<Clause<N>>,
    by_name: IndexMap<N, Vec<ClauseId>>,
}

impl<N: Hash + Eq> Clauses<N> {
    pub(crate) fn new() -> Self {
        Self {
            clauses: Vec::new(),
            by_name: IndexMap::new(),
        }
    }

    pub(crate) fn push(&mut self, name: N, clause: Clause<N>) -> ClauseId {
        let id = ClauseId(self.clauses.len());
        self.clauses.push(clause);
        self.by_name.entry(name).or_default().push(id);
        id
    }

    /// Every clause stored under `name`, in declaration order
    pub(crate) fn candidates<Q>(&self, name: &Q) -> &[ClauseId]
    where
        Q: ?Sized + Hash + Equivalent<N>,
    {
        self.by_name.get(name).map_or(&[], Vec::as_slice)
    }

    /// First clause under `name` with the given arity
    pub(crate) fn first<Q>(&self, name: &Q, arity: usize) -> Option<ClauseId>
    where
        Q: ?Sized + Hash + Equivalent<N>,
    {
        self.candidates(name)
            .iter()
            .copied()
            .find(|&id| self.get(id).is_some_and(|clause| clause.arity() == arity))
    }

    pub(crate) fn get(&self, id: ClauseId) -> Option<&Clause<N>> {
        self.clauses.get(id.0)
    }

    pub(crate) fn rule_mut(&mut self, id: ClauseId) -> Option<&mut Rule<N>> {
        match self.clauses.get_mut(id.0) {
            Some(Clause::Rule(rule)) => Some(rule),
            _ => None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.clauses.len()
    }
}
