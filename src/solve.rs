//! Depth-first resolution with chronological backtracking.
//!
//! The search is a loop over two heap stacks, so proof depth is limited by memory and not
//! by the thread's call stack.
//!
//! A [`Choice`] is an open call: the arguments of a goal and the clauses not yet tried for
//! it. Retrying a choice first undoes every binding and frees every frame made since it
//! was opened. A [`Cont`] says what is left to do once a call succeeds. Continuations are
//! never changed after they are pushed and link to each other through `next`, so every
//! choice keeps seeing the same remaining work.
//!
//! A rule activation allocates a [`Frame`] of fresh terms at the top of the store and
//! resolves its body against those, so the same rule can be active more than once on a
//! path.

use std::fmt::Debug;
use std::hash::Hash;

use log::{debug, trace};
use smallvec::SmallVec;

use crate::clause::{Clause, ClauseId, Clauses};
use crate::error::Failure;
use crate::rule::{Frame, Goal, Rule};
use crate::store::{Slot, Store};
use crate::term::TermId;
use crate::trail::Mark;
use crate::Answer;

/// Pairs of (rule variable, caller argument) that were both unbound at head unification
type Deferred = SmallVec<[(TermId, TermId); 4]>;

type Args = SmallVec<[TermId; 4]>;

/// Clauses still to try for an open call
#[derive(Debug, Clone, Copy)]
pub(crate) enum Alternatives<'db> {
    /// Every clause stored under the called name, in declaration order
    Listed(&'db [ClauseId]),
    /// One clause picked by handle
    Only(ClauseId),
}

impl Alternatives<'_> {
    fn next(&mut self) -> Option<ClauseId> {
        match *self {
            Self::Listed(ids) => {
                let (&first, rest) = ids.split_first()?;
                *self = Self::Listed(rest);
                Some(first)
            }
            Self::Only(id) => {
                *self = Self::Listed(&[]);
                Some(id)
            }
        }
    }
}

/// Work left after a call succeeds
#[derive(Debug)]
enum Cont<'db, N> {
    /// Remaining goals of a rule body, called at `depth`
    Body {
        goals: &'db [Goal<N>],
        frame: Frame,
        depth: usize,
        next: Option<usize>,
    },
    /// Copies what a finished activation found onto its caller's arguments
    Export {
        deferred: Deferred,
        next: Option<usize>,
    },
}

#[derive(Debug)]
struct Choice<'db> {
    alternatives: Alternatives<'db>,
    args: Args,
    depth: usize,
    next: Option<usize>,
    mark: Mark,
    terms: usize,
    conts: usize,
}

/// Where the search stands after entering a clause
enum Progress {
    /// Nothing is left to prove
    Answered,
    /// A body goal was opened as a new choice
    Opened,
}

pub(crate) struct Solver<'db, N, V> {
    clauses: &'db Clauses<N>,
    store: &'db mut Store<V>,
    max_depth: Option<usize>,
    choices: Vec<Choice<'db>>,
    conts: Vec<Cont<'db, N>>,
}

impl<'db, N, V> Solver<'db, N, V>
where
    N: Hash + Eq + Debug,
    V: Clone + PartialEq + Debug,
{
    pub(crate) fn new(
        clauses: &'db Clauses<N>,
        store: &'db mut Store<V>,
        max_depth: Option<usize>,
    ) -> Self {
        Self {
            clauses,
            store,
            max_depth,
            choices: Vec::new(),
            conts: Vec::new(),
        }
    }

    /// Current values of `args`
    pub(crate) fn answer(&self, args: &[TermId]) -> Answer<V> {
        Answer {
            values: args
                .iter()
                .map(|&id| self.store.value(id).cloned())
                .collect(),
        }
    }

    /// Proves the call `alternatives(args...)`, handing every answer to `on_answer`.
    ///
    /// Returns `true` as soon as `on_answer` does, with that answer's bindings in place.
    /// Otherwise the search backtracks for the next answer, and once none is left every
    /// binding and frame made here has been undone.
    pub(crate) fn run(
        &mut self,
        alternatives: Alternatives<'db>,
        args: &[TermId],
        mut on_answer: impl FnMut(&Self) -> bool,
    ) -> bool {
        let mark = self.store.mark();
        let terms = self.store.len();
        self.open(alternatives, Args::from_slice(args), 0, None);

        while let Some(choice) = self.choices.last_mut() {
            let Some(id) = choice.alternatives.next() else {
                self.choices.pop();
                continue;
            };
            let (args, depth, next) = (choice.args.clone(), choice.depth, choice.next);
            let (mark, terms, conts) = (choice.mark, choice.terms, choice.conts);
            self.store.undo(mark);
            self.store.truncate(terms);
            self.conts.truncate(conts);

            match self
                .enter(id, &args, depth, next)
                .and_then(|next| self.proceed(next))
            {
                Ok(Progress::Answered) => {
                    if on_answer(self) {
                        self.choices.clear();
                        return true;
                    }
                    trace!("looking for another answer");
                }
                Ok(Progress::Opened) => {}
                Err(failure) => trace!("clause {id} failed for {args:?}: {failure}"),
            }
        }

        self.store.undo(mark);
        self.store.truncate(terms);
        self.conts.clear();
        false
    }

    fn open(
        &mut self,
        alternatives: Alternatives<'db>,
        args: Args,
        depth: usize,
        next: Option<usize>,
    ) {
        self.choices.push(Choice {
            alternatives,
            args,
            depth,
            next,
            mark: self.store.mark(),
            terms: self.store.len(),
            conts: self.conts.len(),
        });
    }

    fn push_cont(&mut self, cont: Cont<'db, N>) -> usize {
        self.conts.push(cont);
        self.conts.len() - 1
    }

    /// Unifies one clause with `args` and returns what to do after it
    fn enter(
        &mut self,
        id: ClauseId,
        args: &[TermId],
        depth: usize,
        next: Option<usize>,
    ) -> Result<Option<usize>, Failure> {
        let clauses = self.clauses;
        let clause = clauses.get(id).ok_or(Failure::NoMatchingClause)?;
        if clause.arity() != args.len() {
            return Err(Failure::ArityMismatch {
                expected: clause.arity(),
                found: args.len(),
            });
        }
        match clause {
            Clause::Fact(fact) => {
                fact.unify(args, self.store)?;
                Ok(next)
            }
            Clause::Rule(rule) => self.activate(id, rule, args, depth, next),
        }
    }

    fn activate(
        &mut self,
        id: ClauseId,
        rule: &'db Rule<N>,
        args: &[TermId],
        depth: usize,
        next: Option<usize>,
    ) -> Result<Option<usize>, Failure> {
        if let Some(limit) = self.max_depth {
            if depth >= limit {
                debug!("rule {id} not entered: depth limit {limit} reached");
                return Err(Failure::DepthExceeded(limit));
            }
        }

        let frame = Frame::new(self.store.alloc_unbound(rule.locals().len()));
        let deferred = self.bind_params(rule, frame, args)?;
        trace!("entering rule {id} with {args:?}");

        let next = if deferred.is_empty() {
            next
        } else {
            Some(self.push_cont(Cont::Export { deferred, next }))
        };
        Ok(Some(self.push_cont(Cont::Body {
            goals: rule.body(),
            frame,
            depth: depth + 1,
            next,
        })))
    }

    /// Unifies the activation's formal arguments with `args`, atomically
    fn bind_params(
        &mut self,
        rule: &Rule<N>,
        frame: Frame,
        args: &[TermId],
    ) -> Result<Deferred, Failure> {
        self.store.attempt(|store| {
            let mut deferred = Deferred::new();
            for (&param, &arg) in rule.params().iter().zip(args) {
                let formal = frame.term(param);
                if store.unify_slot(formal, arg)? == Slot::Deferred {
                    deferred.push((formal, arg));
                }
            }
            Ok(deferred)
        })
    }

    /// Follows continuations until a body goal needs calling or nothing is left
    fn proceed(&mut self, mut next: Option<usize>) -> Result<Progress, Failure> {
        while let Some(at) = next {
            next = match self.conts[at] {
                Cont::Export {
                    ref deferred,
                    next: after,
                } => {
                    export(self.store, deferred)?;
                    after
                }
                Cont::Body {
                    goals,
                    frame,
                    depth,
                    next: after,
                } => {
                    let Some((goal, rest)) = goals.split_first() else {
                        next = after;
                        continue;
                    };
                    self.call(goal, rest, frame, depth, after)?;
                    return Ok(Progress::Opened);
                }
            };
        }
        Ok(Progress::Answered)
    }

    /// Opens a choice for `goal`, to be followed by `rest` and then `after`
    fn call(
        &mut self,
        goal: &'db Goal<N>,
        rest: &'db [Goal<N>],
        frame: Frame,
        depth: usize,
        after: Option<usize>,
    ) -> Result<(), Failure> {
        let clauses = self.clauses;
        let candidates = clauses.candidates(goal.name());
        if candidates.is_empty() {
            debug!("no clauses for {:?}", goal.name());
            return Err(Failure::NoMatchingClause);
        }
        let args: Args = goal.args().iter().map(|&op| frame.term(op)).collect();
        trace!("calling {:?}{args:?}", goal.name());

        let next = if rest.is_empty() {
            after
        } else {
            Some(self.push_cont(Cont::Body {
                goals: rest,
                frame,
                depth,
                next: after,
            }))
        };
        self.open(Alternatives::Listed(candidates), args, depth, next);
        Ok(())
    }
}

/// Copies values the body found for formal arguments onto the caller's unbound arguments
fn export<V: Clone + PartialEq>(
    store: &mut Store<V>,
    deferred: &[(TermId, TermId)],
) -> Result<(), Failure> {
    for &(formal, arg) in deferred {
        if let Some(value) = store.value(formal).cloned() {
            store.bind(arg, value)?;
        }
    }
    Ok(())
}
