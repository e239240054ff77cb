//! Undo log for bindings made while resolving a query.
//!
//! Every term that goes from unbound to bound is pushed here. A [`Mark`] taken before an
//! attempt lets the attempt be rolled back by unbinding exactly the terms recorded after it.

use smallvec::SmallVec;

use crate::term::TermId;

/// A position in the trail that can be unwound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Mark(usize);

#[derive(Debug, Default)]
pub(crate) struct Trail {
    bound: SmallVec<[TermId; 32]>,
}

impl Trail {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn mark(&self) -> Mark {
        Mark(self.bound.len())
    }

    pub(crate) fn record(&mut self, id: TermId) {
        self.bound.push(id);
    }

    /// Removes the entries recorded since `mark`, newest first
    pub(crate) fn unwind(&mut self, mark: Mark) -> impl Iterator<Item = TermId> + '_ {
        let start = mark.0.min(self.bound.len());
        self.bound.drain(start..).rev()
    }

    /// Forgets the entries recorded since `mark` without undoing them
    pub(crate) fn commit(&mut self, mark: Mark) {
        self.bound.truncate(mark.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwind_returns_newest_first() {
        let mut trail = Trail::new();
        trail.record(TermId(0));
        let mark = trail.mark();
        trail.record(TermId(3));
        trail.record(TermId(5));

        let undone: Vec<TermId> = trail.unwind(mark).collect();
        assert_eq!(undone, vec![TermId(5), TermId(3)]);
        assert_eq!(trail.mark(), mark);
    }

    #[test]
    fn test_commit_keeps_bindings_below_mark() {
        let mut trail = Trail::new();
        trail.record(TermId(1));
        let mark = trail.mark();
        trail.record(TermId(2));
        trail.commit(mark);
        assert_eq!(trail.mark(), mark);
        assert_eq!(trail.unwind(Mark(0)).collect::<Vec<_>>(), vec![TermId(1)]);
    }

    #[test]
    fn test_unwind_past_end_is_empty() {
        let mut trail = Trail::new();
        let mark = Mark(4);
        assert_eq!(trail.unwind(mark).count(), 0);
    }
}
