//! Ordered set of legal actions.

use rand::{seq::IndexedRandom, Rng};

use crate::error::EnvError;

/// Legal actions for one state (and one actor, for turn-based games).
///
/// Built fresh after every transition and never mutated afterwards.
/// Duplicates are dropped on construction, first occurrence wins, so the
/// insertion order is stable and sampling with a seeded generator is
/// reproducible. Two catalogs are equal when their ordered contents are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCatalog<A> {
    actions: Vec<A>,
}

impl<A> Default for ActionCatalog<A> {
    fn default() -> Self {
        Self { actions: Vec::new() }
    }
}

impl<A: PartialEq> ActionCatalog<A> {
    /// Catalog without any action: the terminal signal.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from any finite collection.
    pub fn from_actions(actions: impl IntoIterator<Item = A>) -> Self {
        let mut unique: Vec<A> = Vec::new();
        for action in actions {
            if !unique.contains(&action) {
                unique.push(action);
            }
        }
        Self { actions: unique }
    }

    /// Same as [`from_actions`](Self::from_actions), an absent collection gives
    /// an empty catalog.
    pub fn from_optional<I: IntoIterator<Item = A>>(actions: Option<I>) -> Self {
        match actions {
            Some(actions) => Self::from_actions(actions),
            None => Self::empty(),
        }
    }

    /// Uniformly random action.
    ///
    /// # Error
    /// [`EnvError::EmptyCatalog`] when there is nothing to sample, which
    /// usually means the caller ignored `done`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&A, EnvError> {
        self.actions.choose(rng).ok_or(EnvError::EmptyCatalog)
    }

    /// Linear membership test.
    pub fn contains(&self, action: &A) -> bool {
        self.actions.contains(action)
    }
}

impl<A> ActionCatalog<A> {
    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// True when no action is legal.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Actions in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, A> {
        self.actions.iter()
    }

    /// Actions in insertion order.
    pub fn as_slice(&self) -> &[A] {
        &self.actions
    }

    /// Give the actions back.
    pub fn into_vec(self) -> Vec<A> {
        self.actions
    }
}

impl<A: PartialEq> FromIterator<A> for ActionCatalog<A> {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self::from_actions(iter)
    }
}

impl<'a, A> IntoIterator for &'a ActionCatalog<A> {
    type Item = &'a A;
    type IntoIter = std::slice::Iter<'a, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn test_duplicates_are_dropped_in_order() {
        let catalog = ActionCatalog::from_actions(["north", "east", "north", "exit", "east"]);
        assert_eq!(catalog.as_slice(), &["north", "east", "exit"]);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_absent_or_empty_input() {
        let none: ActionCatalog<u8> = ActionCatalog::from_optional(None::<Vec<u8>>);
        assert!(none.is_empty());
        let empty: ActionCatalog<u8> = ActionCatalog::from_actions(Vec::new());
        assert_eq!(empty, none);
        assert!(!empty.contains(&0));
    }

    #[test]
    fn test_sample_empty_catalog() {
        let mut rng = StdRng::seed_from_u64(3);
        let catalog: ActionCatalog<u8> = ActionCatalog::empty();
        assert!(matches!(catalog.sample(&mut rng), Err(EnvError::EmptyCatalog)));
    }

    #[test]
    fn test_sample_is_member_and_reproducible() {
        let catalog: ActionCatalog<u32> = (0..10).collect();
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let x = *catalog.sample(&mut a).unwrap();
            assert!(catalog.contains(&x));
            assert_eq!(x, *catalog.sample(&mut b).unwrap());
        }
    }

    #[test]
    fn test_order_matters_for_equality() {
        let a = ActionCatalog::from_actions([1, 2]);
        let b = ActionCatalog::from_actions([2, 1]);
        assert_ne!(a, b);
        assert_eq!(a, ActionCatalog::from_actions([1, 2, 1]));
    }
}
