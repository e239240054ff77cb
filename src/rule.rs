use crate::term::TermId;

/// One argument position of a rule head or body goal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// The rule's `n`th variable, renamed afresh on every activation
    Local(usize),
    /// A bound term shared by every activation
    Const(TermId),
}

/// A call in a rule body, e.g. `parent(X, Y)`
#[derive(Debug, Clone)]
pub struct Goal<N> {
    name: N,
    args: Vec<Operand>,
}

impl<N> Goal<N> {
    /// Relation name being called
    #[must_use]
    pub fn name(&self) -> &N {
        &self.name
    }

    /// Arguments passed to the called relation
    #[must_use]
    pub fn args(&self) -> &[Operand] {
        &self.args
    }

    /// Number of arguments
    #[must_use]
    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

/// A parameterized relation, e.g. `grandparent(X, Z) :- parent(X, Y), parent(Y, Z)`
///
/// The rule keeps one template term per variable. Body goals refer to those variables
/// by position, so binding a formal argument is seen by every goal mentioning it.
#[derive(Debug, Clone)]
pub struct Rule<N> {
    head: Vec<TermId>,
    params: Vec<Operand>,
    locals: Vec<TermId>,
    body: Vec<Goal<N>>,
}

impl<N> Rule<N> {
    pub(crate) fn new() -> Self {
        Self {
            head: Vec::new(),
            params: Vec::new(),
            locals: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Adds a head position holding a fresh variable
    pub(crate) fn push_param_var(&mut self, template: TermId) {
        let operand = self.push_local(template);
        self.head.push(template);
        self.params.push(operand);
    }

    /// Adds a head position holding a constant
    pub(crate) fn push_param_const(&mut self, constant: TermId) {
        self.head.push(constant);
        self.params.push(Operand::Const(constant));
    }

    /// Adds a head position that repeats an earlier one, as the second `X` in `same(X, X)`
    pub(crate) fn push_param_same(&mut self, index: usize) {
        if let (Some(&term), Some(&operand)) = (self.head.get(index), self.params.get(index)) {
            self.head.push(term);
            self.params.push(operand);
        }
    }

    pub(crate) fn push_local(&mut self, template: TermId) -> Operand {
        self.locals.push(template);
        Operand::Local(self.locals.len() - 1)
    }

    pub(crate) fn push_goal(&mut self, name: N, args: Vec<Operand>) {
        self.body.push(Goal { name, args });
    }

    pub(crate) fn local_index(&self, term: TermId) -> Option<usize> {
        self.locals.iter().position(|&local| local == term)
    }

    /// Number of head positions
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Template terms of the head, in order. Variables stay unbound outside resolution.
    #[must_use]
    pub fn head(&self) -> &[TermId] {
        &self.head
    }

    /// Head positions as operands
    #[must_use]
    pub fn params(&self) -> &[Operand] {
        &self.params
    }

    /// Every variable of the rule: head variables first, then body-only ones
    #[must_use]
    pub fn locals(&self) -> &[TermId] {
        &self.locals
    }

    /// Body goals in declaration order
    #[must_use]
    pub fn body(&self) -> &[Goal<N>] {
        &self.body
    }
}

/// Fresh terms standing in for a rule's variables during one activation
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    base: usize,
}

impl Frame {
    pub(crate) fn new(base: usize) -> Self {
        Self { base }
    }

    pub(crate) fn term(self, operand: Operand) -> TermId {
        match operand {
            Operand::Local(index) => TermId(self.base + index),
            Operand::Const(id) => id,
        }
    }
}
