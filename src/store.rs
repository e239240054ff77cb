//! The term pool owned by a database, together with its trail.

use log::trace;

use crate::error::Failure;
use crate::term::{Term, TermId};
use crate::trail::{Mark, Trail};

/// Outcome of unifying one stored part with one argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    /// Both sides agree now
    Settled,
    /// Both sides are unbound; nothing to bind yet
    Deferred,
}

#[derive(Debug)]
pub(crate) struct Store<V> {
    terms: Vec<Term<V>>,
    /// Parallel to `terms`: set for terms that make up a stored fact or rule
    owned: Vec<bool>,
    trail: Trail,
}

impl<V> Store<V> {
    pub(crate) fn new() -> Self {
        Self {
            terms: Vec::new(),
            owned: Vec::new(),
            trail: Trail::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.terms.len()
    }

    pub(crate) fn contains(&self, id: TermId) -> bool {
        id.0 < self.terms.len()
    }

    pub(crate) fn get(&self, id: TermId) -> Option<&Term<V>> {
        self.terms.get(id.0)
    }

    pub(crate) fn value(&self, id: TermId) -> Option<&V> {
        self.get(id).and_then(Term::value)
    }

    /// Whether `id` belongs to a stored clause rather than to the host
    pub(crate) fn is_owned(&self, id: TermId) -> bool {
        self.owned.get(id.0).copied().unwrap_or(false)
    }

    /// Allocates a term the host may bind and unbind
    pub(crate) fn alloc(&mut self, term: Term<V>) -> TermId {
        self.push(term, false)
    }

    /// Allocates a term that is part of a fact or rule
    pub(crate) fn alloc_owned(&mut self, term: Term<V>) -> TermId {
        self.push(term, true)
    }

    fn push(&mut self, term: Term<V>, owned: bool) -> TermId {
        self.terms.push(term);
        self.owned.push(owned);
        TermId(self.terms.len() - 1)
    }

    /// Allocates `count` consecutive unbound terms and returns the index of the first
    pub(crate) fn alloc_unbound(&mut self, count: usize) -> usize {
        let base = self.terms.len();
        self.terms.extend((0..count).map(|_| Term::unbound()));
        self.owned.resize(self.terms.len(), false);
        base
    }

    /// Drops every term allocated at or after `len`
    pub(crate) fn truncate(&mut self, len: usize) {
        self.terms.truncate(len);
        self.owned.truncate(len);
    }

    pub(crate) fn unbind(&mut self, id: TermId) -> bool {
        match self.terms.get_mut(id.0) {
            Some(term) => {
                term.unbind();
                true
            }
            None => false,
        }
    }

    pub(crate) fn mark(&self) -> Mark {
        self.trail.mark()
    }

    /// Unbinds every term bound since `mark`
    pub(crate) fn undo(&mut self, mark: Mark) {
        for id in self.trail.unwind(mark) {
            if let Some(term) = self.terms.get_mut(id.0) {
                term.unbind();
            }
        }
    }

    /// Keeps the bindings made since `mark` and stops tracking them
    pub(crate) fn commit(&mut self, mark: Mark) {
        self.trail.commit(mark);
    }

    /// Runs `attempt`, undoing whatever it bound if it fails
    pub(crate) fn attempt<T>(
        &mut self,
        attempt: impl FnOnce(&mut Self) -> Result<T, Failure>,
    ) -> Result<T, Failure> {
        let mark = self.mark();
        let result = attempt(self);
        if result.is_err() {
            self.undo(mark);
        }
        result
    }
}

impl<V: Clone + PartialEq> Store<V> {
    /// Binds `id` to `value`, recording the change on the trail if the term was unbound
    pub(crate) fn bind(&mut self, id: TermId, value: V) -> Result<(), Failure> {
        let term = self.terms.get_mut(id.0).ok_or(Failure::UnknownTerm(id))?;
        let fresh = !term.is_bound();
        term.bind(value)
            .map_err(|_| Failure::UnificationFailure(id))?;
        if fresh {
            self.trail.record(id);
        }
        Ok(())
    }

    /// Unifies a stored `part` with a caller's `arg`.
    ///
    /// A bound part flows into an unbound arg and a bound arg flows into an unbound part.
    /// Two bound sides must hold equal values.
    pub(crate) fn unify_slot(&mut self, part: TermId, arg: TermId) -> Result<Slot, Failure> {
        let part_value = self
            .get(part)
            .ok_or(Failure::UnknownTerm(part))?
            .value()
            .cloned();
        if let Some(value) = part_value {
            self.bind(arg, value)?;
            return Ok(Slot::Settled);
        }
        let arg_value = self
            .get(arg)
            .ok_or(Failure::UnknownTerm(arg))?
            .value()
            .cloned();
        match arg_value {
            Some(value) => {
                self.bind(part, value)?;
                Ok(Slot::Settled)
            }
            None => {
                trace!("{part} and {arg} are both unbound");
                Ok(Slot::Deferred)
            }
        }
    }
}
