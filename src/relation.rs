use log::trace;
use smallvec::SmallVec;

use crate::error::Failure;
use crate::store::Store;
use crate::term::TermId;

/// An ordered tuple of terms stored under a name, e.g. the fact `parent(alice, bob)`
#[derive(Debug, Clone)]
pub struct Relation {
    parts: SmallVec<[TermId; 4]>,
}

impl Relation {
    pub(crate) fn new(parts: impl IntoIterator<Item = TermId>) -> Self {
        Self {
            parts: parts.into_iter().collect(),
        }
    }

    /// Number of argument positions
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parts.len()
    }

    /// The terms making up the tuple, in order
    #[must_use]
    pub fn parts(&self) -> &[TermId] {
        &self.parts
    }

    /// Unifies the tuple with `args`, position by position.
    ///
    /// Either every position unifies and the new bindings on `args` stay, or nothing
    /// that was bound during the call survives.
    pub(crate) fn unify<V: Clone + PartialEq>(
        &self,
        args: &[TermId],
        store: &mut Store<V>,
    ) -> Result<(), Failure> {
        if args.len() != self.arity() {
            return Err(Failure::ArityMismatch {
                expected: self.arity(),
                found: args.len(),
            });
        }
        store
            .attempt(|store| {
                for (&part, &arg) in self.parts.iter().zip(args) {
                    store.unify_slot(part, arg)?;
                }
                Ok(())
            })
            .inspect_err(|failure| trace!("fact {:?} rejected {args:?}: {failure}", self.parts))
    }

    /// Whether the two tuples could unify: same arity, and every pair of parts either holds
    /// equal values or has an unbound side
    pub(crate) fn unifiable<V: PartialEq>(&self, other: &Self, store: &Store<V>) -> bool {
        self.arity() == other.arity()
            && self
                .parts
                .iter()
                .zip(&other.parts)
                .all(|(&a, &b)| match (store.value(a), store.value(b)) {
                    (Some(a), Some(b)) => a == b,
                    _ => true,
                })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;

    fn fact(store: &mut Store<&'static str>, values: &[&'static str]) -> Relation {
        Relation::new(values.iter().map(|&value| store.alloc(Term::bound(value))))
    }

    #[test]
    fn test_unify_binds_unbound_args() {
        let mut store = Store::new();
        let parent = fact(&mut store, &["alice", "bob"]);
        let alice = store.alloc(Term::bound("alice"));
        let child = store.alloc(Term::unbound());

        assert_eq!(parent.unify(&[alice, child], &mut store), Ok(()));
        assert_eq!(store.value(child), Some(&"bob"));
    }

    #[test]
    fn test_unify_mismatch_restores_earlier_positions() {
        let mut store = Store::new();
        let parent = fact(&mut store, &["alice", "bob"]);
        let who = store.alloc(Term::unbound());
        let zoe = store.alloc(Term::bound("zoe"));

        assert_eq!(
            parent.unify(&[who, zoe], &mut store),
            Err(Failure::UnificationFailure(zoe))
        );
        assert_eq!(store.value(who), None);
        assert_eq!(store.value(zoe), Some(&"zoe"));
    }

    #[test]
    fn test_arity_mismatch_touches_nothing() {
        let mut store = Store::new();
        let parent = fact(&mut store, &["alice", "bob"]);
        let who = store.alloc(Term::unbound());

        assert_eq!(
            parent.unify(&[who], &mut store),
            Err(Failure::ArityMismatch {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(store.value(who), None);
    }

    #[test]
    fn test_repeated_arg_must_agree_with_itself() {
        let mut store = Store::new();
        let pair = fact(&mut store, &["a", "b"]);
        let same = fact(&mut store, &["a", "a"]);
        let x = store.alloc(Term::unbound());

        assert!(pair.unify(&[x, x], &mut store).is_err());
        assert_eq!(store.value(x), None);
        assert_eq!(same.unify(&[x, x], &mut store), Ok(()));
        assert_eq!(store.value(x), Some(&"a"));
    }

    #[test]
    fn test_unifiable_compares_values_and_arity() {
        let mut store = Store::new();
        let a = fact(&mut store, &["alice", "bob"]);
        let b = fact(&mut store, &["alice", "bob"]);
        let c = fact(&mut store, &["alice", "carol"]);
        let d = fact(&mut store, &["alice"]);
        let open = Relation::new([store.alloc(Term::bound("alice")), store.alloc(Term::unbound())]);

        assert!(a.unifiable(&b, &store));
        assert!(!a.unifiable(&c, &store));
        assert!(!a.unifiable(&d, &store));
        assert!(open.unifiable(&c, &store));
    }
}
