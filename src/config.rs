/// Tuning knobs for a [`Database`](crate::Database)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Maximum number of rule activations open at once on one resolution path.
    ///
    /// `None` searches without limit, so rules that recurse without a base case never
    /// return. When set, a branch that would go deeper simply fails.
    pub max_depth: Option<usize>,
    /// Return the existing handle instead of storing a fact equal to one already present
    pub dedup_facts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: None,
            dedup_facts: true,
        }
    }
}

impl Config {
    /// Caps rule nesting at `depth`
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Turns duplicate fact detection on or off
    #[must_use]
    pub fn with_dedup_facts(mut self, dedup: bool) -> Self {
        self.dedup_facts = dedup;
        self
    }
}
