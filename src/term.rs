use std::fmt;

use thiserror::Error;

/// Handle to a [`Term`] owned by a [`Database`](crate::Database)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TermId(pub(crate) usize);

impl TermId {
    /// Position of the term in its database's pool
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_T{}", self.0)
    }
}

/// Returned when binding a term that already holds a different value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("term is already bound to a different value")]
pub struct AlreadyBound;

/// A single unifiable value slot (e.g. `"alice"`, or a variable still waiting for one)
///
/// The value type is fixed by `V`; only the bound state changes over the term's life.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term<V> {
    value: Option<V>,
}

impl<V> Default for Term<V> {
    fn default() -> Self {
        Self::unbound()
    }
}

impl<V> Term<V> {
    /// A term with no value yet
    #[must_use]
    pub fn unbound() -> Self {
        Self { value: None }
    }

    /// A term holding `value`
    #[must_use]
    pub fn bound(value: V) -> Self {
        Self { value: Some(value) }
    }

    /// Whether the term currently holds a value
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.value.is_some()
    }

    /// The held value, if any
    #[must_use]
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Forgets the held value. Reserved for undoing bindings.
    pub(crate) fn unbind(&mut self) {
        self.value = None;
    }
}

impl<V: PartialEq> Term<V> {
    /// Binds the term to `value`.
    ///
    /// Binding an already-bound term succeeds without changing it when the values are
    /// equal, so unifying two equal ground terms is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadyBound`] if the term holds a different value. The term is left as it was.
    pub fn bind(&mut self, value: V) -> Result<(), AlreadyBound> {
        match &self.value {
            None => {
                self.value = Some(value);
                Ok(())
            }
            Some(current) if *current == value => Ok(()),
            Some(_) => Err(AlreadyBound),
        }
    }
}
