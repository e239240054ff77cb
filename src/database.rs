use std::fmt::Debug;
use std::hash::Hash;

use indexmap::Equivalent;
use log::{debug, trace};

use crate::clause::{Clause, ClauseId, Clauses, FactHandle, RuleHandle};
use crate::config::Config;
use crate::error::{Error, Failure, Result};
use crate::relation::Relation;
use crate::rule::{Operand, Rule};
use crate::solve::{Alternatives, Solver};
use crate::store::Store;
use crate::term::{AlreadyBound, Term, TermId};

/// An argument when declaring a rule head or a body goal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg<V> {
    /// A fresh variable. In a body goal it matches anything and is not shared.
    Var,
    /// A constant
    Value(V),
    /// One of the rule's own variables, as returned by [`RuleBuilder::params`] or
    /// [`RuleBuilder::var`]
    Term(TermId),
    /// Whatever the rule's head holds at this position. In a head it must name an earlier
    /// position, so `same(X, X)` is `[Arg::Var, Arg::Param(0)]`.
    Param(usize),
}

impl<V> From<TermId> for Arg<V> {
    fn from(id: TermId) -> Self {
        Self::Term(id)
    }
}

/// Values of a list of query terms, `None` for those left unbound
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Answer<V> {
    /// One entry per queried term
    pub values: Vec<Option<V>>,
}

/// Facts, rules and the terms they are made of, queryable by relation name
///
/// `N` names relations (usually `&str`, `String` or an enum) and `V` is the value carried
/// by terms. Hosts with several value types use an enum for `V`.
#[derive(Debug)]
pub struct Database<N, V> {
    clauses: Clauses<N>,
    store: Store<V>,
    config: Config,
}

impl<N, V> Default for Database<N, V>
where
    N: Hash + Eq + Debug,
    V: Clone + PartialEq + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, V> Database<N, V>
where
    N: Hash + Eq + Debug,
    V: Clone + PartialEq + Debug,
{
    /// Create an empty database
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an empty database with custom settings
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            clauses: Clauses::new(),
            store: Store::new(),
            config,
        }
    }

    /// Settings in use
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Adds the ground fact `name(values...)`.
    ///
    /// With [`Config::dedup_facts`] set, adding a fact equal to one already stored under
    /// `name` returns the existing handle.
    pub fn add_fact(&mut self, name: N, values: impl IntoIterator<Item = V>) -> FactHandle {
        let base = self.store.len();
        let fact = Relation::new(
            values
                .into_iter()
                .map(|value| self.store.alloc_owned(Term::bound(value))),
        );

        if self.config.dedup_facts {
            let existing = self.clauses.candidates(&name).iter().copied().find(|&id| {
                matches!(self.clauses.get(id), Some(Clause::Fact(stored)) if stored.unifiable(&fact, &self.store))
            });
            if let Some(id) = existing {
                debug!("fact {name:?} already stored as {id}");
                self.store.truncate(base);
                return FactHandle(id);
            }
        }

        debug!("adding fact {name:?}/{}", fact.arity());
        FactHandle(self.clauses.push(name, Clause::Fact(fact)))
    }

    /// Starts the rule `name(params...)`. Add its body through the returned builder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ForeignTerm`] if a parameter is [`Arg::Term`]: a new rule has no
    /// variables to refer to yet. Returns [`Error::UnknownParam`] if an [`Arg::Param`] does
    /// not name an earlier position.
    pub fn add_rule(
        &mut self,
        name: N,
        params: impl IntoIterator<Item = Arg<V>>,
    ) -> Result<RuleBuilder<'_, N, V>> {
        let params: Vec<Arg<V>> = params.into_iter().collect();
        let next = ClauseId(self.clauses.len());
        for (position, param) in params.iter().enumerate() {
            match *param {
                Arg::Term(term) => return Err(Error::ForeignTerm { term, rule: next }),
                Arg::Param(index) if index >= position => {
                    return Err(Error::UnknownParam { index, rule: next });
                }
                _ => {}
            }
        }

        let mut rule = Rule::new();
        for param in params {
            match param {
                Arg::Value(value) => {
                    rule.push_param_const(self.store.alloc_owned(Term::bound(value)));
                }
                Arg::Param(index) => rule.push_param_same(index),
                Arg::Var | Arg::Term(_) => {
                    rule.push_param_var(self.store.alloc_owned(Term::unbound()));
                }
            }
        }
        debug!("adding rule {name:?}/{}", rule.arity());
        let id = self.clauses.push(name, Clause::Rule(rule));
        Ok(RuleBuilder {
            db: self,
            handle: RuleHandle(id),
        })
    }

    /// Allocates a body-only variable for `rule`
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotARule`] if the handle does not name a rule of this database.
    pub fn rule_var(&mut self, rule: RuleHandle) -> Result<TermId> {
        let target = self
            .clauses
            .rule_mut(rule.0)
            .ok_or(Error::NotARule(rule.0))?;
        let id = self.store.alloc_owned(Term::unbound());
        target.push_local(id);
        Ok(id)
    }

    /// Appends the goal `name(args...)` to the body of `rule`
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotARule`] for a bad handle, [`Error::ForeignTerm`] when an
    /// [`Arg::Term`] is not one of the rule's variables and [`Error::UnknownParam`] when an
    /// [`Arg::Param`] is past the end of the head. Nothing is added on error.
    pub fn conjoin(
        &mut self,
        rule: RuleHandle,
        name: N,
        args: impl IntoIterator<Item = Arg<V>>,
    ) -> Result<()> {
        let target = self
            .clauses
            .rule_mut(rule.0)
            .ok_or(Error::NotARule(rule.0))?;
        let args: Vec<Arg<V>> = args.into_iter().collect();
        for arg in &args {
            match *arg {
                Arg::Term(term) if target.local_index(term).is_none() => {
                    return Err(Error::ForeignTerm {
                        term,
                        rule: rule.0,
                    });
                }
                Arg::Param(index) if index >= target.arity() => {
                    return Err(Error::UnknownParam {
                        index,
                        rule: rule.0,
                    });
                }
                _ => {}
            }
        }

        let mut operands = Vec::with_capacity(args.len());
        for arg in args {
            let operand = match arg {
                Arg::Var => target.push_local(self.store.alloc_owned(Term::unbound())),
                Arg::Value(value) => Operand::Const(self.store.alloc_owned(Term::bound(value))),
                Arg::Term(term) => Operand::Local(
                    target
                        .local_index(term)
                        .ok_or(Error::ForeignTerm { term, rule: rule.0 })?,
                ),
                Arg::Param(index) => target.params().get(index).copied().ok_or(
                    Error::UnknownParam {
                        index,
                        rule: rule.0,
                    },
                )?,
            };
            operands.push(operand);
        }
        trace!("rule {} gains goal {name:?}{operands:?}", rule.0);
        target.push_goal(name, operands);
        Ok(())
    }

    /// A fresh unbound term, typically a query variable
    pub fn var(&mut self) -> TermId {
        self.store.alloc(Term::unbound())
    }

    /// A fresh term bound to `value`
    pub fn constant(&mut self, value: V) -> TermId {
        self.store.alloc(Term::bound(value))
    }

    /// The term behind a handle
    #[must_use]
    pub fn term(&self, id: TermId) -> Option<&Term<V>> {
        self.store.get(id)
    }

    /// The value a term holds, if it is bound
    #[must_use]
    pub fn value(&self, id: TermId) -> Option<&V> {
        self.store.value(id)
    }

    /// Whether a term holds a value
    #[must_use]
    pub fn is_bound(&self, id: TermId) -> bool {
        self.store.get(id).is_some_and(Term::is_bound)
    }

    /// Binds a term directly
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTerm`] for a foreign handle, [`Error::ClauseTerm`] for a term
    /// of a stored fact or rule and [`Error::AlreadyBound`] if the term holds a different
    /// value.
    pub fn bind(&mut self, id: TermId, value: V) -> Result<()> {
        if self.store.is_owned(id) {
            return Err(Error::ClauseTerm(id));
        }
        let mark = self.store.mark();
        let bound = self.store.bind(id, value);
        self.store.commit(mark);
        match bound {
            Ok(()) => Ok(()),
            Err(Failure::UnknownTerm(id)) => Err(Error::UnknownTerm(id)),
            Err(_) => Err(AlreadyBound.into()),
        }
    }

    /// Clears a query term so it can be asked again
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTerm`] for a foreign handle and [`Error::ClauseTerm`] for a
    /// term of a stored fact or rule.
    pub fn unbind(&mut self, id: TermId) -> Result<()> {
        if self.store.is_owned(id) {
            return Err(Error::ClauseTerm(id));
        }
        if self.store.unbind(id) {
            Ok(())
        } else {
            Err(Error::UnknownTerm(id))
        }
    }

    /// Current values of `args`
    #[must_use]
    pub fn answer(&self, args: &[TermId]) -> Answer<V> {
        Answer {
            values: args.iter().map(|&id| self.value(id).cloned()).collect(),
        }
    }

    /// First clause stored under `name` with the given arity
    #[must_use]
    pub fn get<Q>(&self, name: &Q, arity: usize) -> Option<ClauseId>
    where
        Q: ?Sized + Hash + Equivalent<N>,
    {
        self.clauses.first(name, arity)
    }

    /// The clause behind a handle
    #[must_use]
    pub fn clause(&self, id: ClauseId) -> Option<&Clause<N>> {
        self.clauses.get(id)
    }

    /// Whether two stored clauses are interchangeable: facts that unify part by part, or
    /// the very same rule
    #[must_use]
    pub fn equivalent(&self, a: ClauseId, b: ClauseId) -> bool {
        match (self.clauses.get(a), self.clauses.get(b)) {
            (Some(Clause::Fact(x)), Some(Clause::Fact(y))) => x.unifiable(y, &self.store),
            (Some(Clause::Rule(_)), Some(Clause::Rule(_))) => a == b,
            _ => false,
        }
    }

    /// Number of terms in the pool
    #[must_use]
    pub fn term_count(&self) -> usize {
        self.store.len()
    }

    /// Number of stored facts and rules
    #[must_use]
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// Asks whether `name(args...)` holds.
    ///
    /// Clauses are tried in declaration order and the first success wins. Unbound `args`
    /// then carry the answer. On failure every term is left as it was.
    pub fn query<Q>(&mut self, name: &Q, arity: usize, args: &[TermId]) -> bool
    where
        Q: ?Sized + Hash + Equivalent<N> + Debug,
    {
        self.try_query(name, arity, args).is_ok()
    }

    /// Like [`query`](Self::query), reporting why the query failed
    ///
    /// # Errors
    ///
    /// [`Failure::ArityMismatch`] when `args` does not have `arity` entries,
    /// [`Failure::UnknownTerm`] for a foreign handle, and [`Failure::NoMatchingClause`]
    /// when no clause succeeded.
    pub fn try_query<Q>(
        &mut self,
        name: &Q,
        arity: usize,
        args: &[TermId],
    ) -> std::result::Result<(), Failure>
    where
        Q: ?Sized + Hash + Equivalent<N> + Debug,
    {
        self.check_args(arity, args)?;
        let candidates = self.clauses.candidates(name);
        let base = self.store.len();
        let mark = self.store.mark();

        let mut solver = Solver::new(&self.clauses, &mut self.store, self.config.max_depth);
        let solved = solver.run(Alternatives::Listed(candidates), args, |_| true);

        if solved {
            self.store.commit(mark);
        } else {
            self.store.undo(mark);
        }
        self.store.truncate(base);
        debug!("query {name:?}/{arity} {}", if solved { "succeeded" } else { "failed" });
        if solved {
            Ok(())
        } else {
            Err(Failure::NoMatchingClause)
        }
    }

    /// Every answer to `name(args...)`, in the order depth-first search finds them.
    ///
    /// `args` are left as they were.
    pub fn query_all<Q>(&mut self, name: &Q, arity: usize, args: &[TermId]) -> Vec<Answer<V>>
    where
        Q: ?Sized + Hash + Equivalent<N> + Debug,
    {
        let mut answers = Vec::new();
        if let Err(failure) = self.check_args(arity, args) {
            debug!("query {name:?}/{arity} rejected: {failure}");
            return answers;
        }
        let candidates = self.clauses.candidates(name);
        let base = self.store.len();
        let mark = self.store.mark();

        let mut solver = Solver::new(&self.clauses, &mut self.store, self.config.max_depth);
        solver.run(Alternatives::Listed(candidates), args, |solver| {
            answers.push(solver.answer(args));
            false
        });

        self.store.undo(mark);
        self.store.truncate(base);
        debug!("query {name:?}/{arity} found {} answers", answers.len());
        answers
    }

    /// Unifies one stored fact with `args`; on failure nothing is bound
    pub fn unify(&mut self, fact: FactHandle, args: &[TermId]) -> bool {
        match self.clauses.get(fact.0) {
            Some(Clause::Fact(relation)) => {
                let mark = self.store.mark();
                let unified = relation.unify(args, &mut self.store).is_ok();
                self.store.commit(mark);
                unified
            }
            _ => false,
        }
    }

    /// Resolves one rule against `args`, without trying the other clauses of its name
    pub fn resolve(&mut self, rule: RuleHandle, args: &[TermId]) -> bool {
        let Some(Clause::Rule(target)) = self.clauses.get(rule.0) else {
            return false;
        };
        if target.arity() != args.len() || args.iter().any(|&id| !self.store.contains(id)) {
            return false;
        }
        let base = self.store.len();
        let mark = self.store.mark();

        let mut solver = Solver::new(&self.clauses, &mut self.store, self.config.max_depth);
        let resolved = solver.run(Alternatives::Only(rule.0), args, |_| true);

        if resolved {
            self.store.commit(mark);
        } else {
            self.store.undo(mark);
        }
        self.store.truncate(base);
        resolved
    }

    fn check_args(&self, arity: usize, args: &[TermId]) -> std::result::Result<(), Failure> {
        if args.len() != arity {
            return Err(Failure::ArityMismatch {
                expected: arity,
                found: args.len(),
            });
        }
        match args.iter().find(|&&id| !self.store.contains(id)) {
            Some(&id) => Err(Failure::UnknownTerm(id)),
            None => Ok(()),
        }
    }
}

/// Appends goals to a freshly added rule
#[derive(Debug)]
pub struct RuleBuilder<'db, N, V> {
    db: &'db mut Database<N, V>,
    handle: RuleHandle,
}

impl<N, V> RuleBuilder<'_, N, V>
where
    N: Hash + Eq + Debug,
    V: Clone + PartialEq + Debug,
{
    /// Handle for later [`Database::conjoin`] calls
    #[must_use]
    pub fn handle(&self) -> RuleHandle {
        self.handle
    }

    /// Head terms in order: the rule's formal arguments
    #[must_use]
    pub fn params(&self) -> &[TermId] {
        match self.db.clause(self.handle.0) {
            Some(Clause::Rule(rule)) => rule.head(),
            _ => &[],
        }
    }

    /// A variable that only appears in the body, such as `Y` in
    /// `grandparent(X, Z) :- parent(X, Y), parent(Y, Z)`
    pub fn var(&mut self) -> TermId {
        let id = self.db.store.alloc_owned(Term::unbound());
        if let Some(rule) = self.db.clauses.rule_mut(self.handle.0) {
            rule.push_local(id);
        }
        id
    }

    /// Conjoins the goal `name(args...)` to the body
    ///
    /// # Errors
    ///
    /// See [`Database::conjoin`].
    pub fn and(&mut self, name: N, args: impl IntoIterator<Item = Arg<V>>) -> Result<&mut Self> {
        self.db.conjoin(self.handle, name, args)?;
        Ok(self)
    }
}
