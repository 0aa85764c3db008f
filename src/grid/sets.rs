//! grid::sets
//!
//! Explicit parameter sets and their cartesian product.
//!
//! # Ordering
//!
//! Parameters enumerate in insertion order and values in the order given.
//! The last parameter varies fastest, so `x = [1, 2]`, `y = [a, b, c]` gives
//! `(1,a) (1,b) (1,c) (2,a) (2,b) (2,c)`.

use indexmap::IndexMap;

use crate::core::document::Assignment;

/// Candidate values for one parameter, plus the block that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterChoice {
    pub block: String,
    pub values: Vec<String>,
}

/// Ordered mapping from parameter name to its [`ParameterChoice`].
///
/// # Example
///
/// ```
/// use inlist_grid::grid::ParameterSets;
///
/// let sets = ParameterSets::new()
///     .with("x", "controls", ["1", "2"])
///     .with("y", "controls", ["a", "b", "c"]);
/// assert_eq!(sets.combination_count(), 6);
///
/// let pairs: Vec<(String, String)> = sets
///     .combinations()
///     .map(|c| (c[0].value.clone(), c[1].value.clone()))
///     .collect();
/// assert_eq!(pairs[1], ("1".to_string(), "b".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSets {
    choices: IndexMap<String, ParameterChoice>,
}

impl ParameterSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with<V>(
        mut self,
        param: impl Into<String>,
        block: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self
    where
        V: Into<String>,
    {
        self.insert(param, block, values);
        self
    }

    /// Add a parameter axis. Re-inserting a name replaces its choice but
    /// keeps its position.
    pub fn insert<V>(
        &mut self,
        param: impl Into<String>,
        block: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Option<ParameterChoice>
    where
        V: Into<String>,
    {
        let choice = ParameterChoice {
            block: block.into(),
            values: values.into_iter().map(Into::into).collect(),
        };
        self.choices.insert(param.into(), choice)
    }

    pub fn get(&self, param: &str) -> Option<&ParameterChoice> {
        self.choices.get(param)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Number of combinations; zero with no parameters or any empty axis.
    ///
    /// Saturates at `usize::MAX` when the product does not fit.
    pub fn combination_count(&self) -> usize {
        if self.choices.is_empty() || self.choices.values().any(|c| c.values.is_empty()) {
            return 0;
        }
        self.choices
            .values()
            .try_fold(1usize, |acc, c| acc.checked_mul(c.values.len()))
            .unwrap_or(usize::MAX)
    }

    /// Iterate over every combination, last parameter fastest.
    pub fn combinations(&self) -> Combinations<'_> {
        Combinations {
            axes: self.choices.iter().collect(),
            indices: vec![0; self.choices.len()],
            remaining: self.combination_count(),
        }
    }
}

/// Iterator over the cartesian product of a [`ParameterSets`].
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    axes: Vec<(&'a String, &'a ParameterChoice)>,
    indices: Vec<usize>,
    remaining: usize,
}

impl Combinations<'_> {
    /// Odometer step: bump the last index, carrying leftwards.
    fn advance(&mut self) {
        for (slot, (_, choice)) in self.indices.iter_mut().zip(&self.axes).rev() {
            *slot += 1;
            if *slot < choice.values.len() {
                return;
            }
            *slot = 0;
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = Vec<Assignment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let combination = self
            .axes
            .iter()
            .zip(&self.indices)
            .map(|((param, choice), &i)| {
                Assignment::new(
                    choice.block.as_str(),
                    param.as_str(),
                    choice.values[i].as_str(),
                )
            })
            .collect();

        self.remaining -= 1;
        self.advance();
        Some(combination)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Combinations<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(combination: &[Assignment]) -> Vec<&str> {
        combination.iter().map(|a| a.value.as_str()).collect()
    }

    #[test]
    fn last_parameter_fastest() {
        let sets = ParameterSets::new()
            .with("x", "controls", ["1", "2"])
            .with("y", "controls", ["a", "b", "c"]);

        let all: Vec<_> = sets.combinations().collect();
        let seen: Vec<_> = all.iter().map(|c| values(c)).collect();
        assert_eq!(
            seen,
            vec![
                vec!["1", "a"],
                vec!["1", "b"],
                vec!["1", "c"],
                vec!["2", "a"],
                vec!["2", "b"],
                vec!["2", "c"],
            ]
        );
    }

    #[test]
    fn assignments_carry_block_and_name() {
        let sets = ParameterSets::new()
            .with("mass", "star_job", ["1.0"])
            .with("mass", "controls", ["2.0"]);
        // Same name twice: the second insert replaces the first.
        assert_eq!(sets.len(), 1);

        let sets = ParameterSets::new()
            .with("new_mass", "star_job", ["1.0"])
            .with("initial_mass", "controls", ["2.0"]);
        let only = sets.combinations().next().unwrap();
        assert_eq!(only[0], Assignment::new("star_job", "new_mass", "1.0"));
        assert_eq!(only[1], Assignment::new("controls", "initial_mass", "2.0"));
    }

    #[test]
    fn three_axes_count() {
        let sets = ParameterSets::new()
            .with("a", "b", ["1", "2"])
            .with("c", "b", ["1", "2", "3"])
            .with("d", "b", ["1", "2", "3", "4"]);
        assert_eq!(sets.combination_count(), 24);
        let iter = sets.combinations();
        assert_eq!(iter.len(), 24);
        let last = iter.last().unwrap();
        assert_eq!(values(&last), vec!["2", "3", "4"]);
    }

    #[test]
    fn empty_sets_yield_nothing() {
        let sets = ParameterSets::new();
        assert_eq!(sets.combination_count(), 0);
        assert_eq!(sets.combinations().count(), 0);
    }

    #[test]
    fn huge_grid_count_saturates() {
        let sets = (0..70).fold(ParameterSets::new(), |sets, i| {
            sets.with(format!("p{}", i), "controls", ["0", "1"])
        });
        assert_eq!(sets.combination_count(), usize::MAX);

        let first = sets.combinations().next().unwrap();
        assert_eq!(first.len(), 70);
        assert!(first.iter().all(|a| a.value == "0"));
    }

    #[test]
    fn overflow_with_empty_axis_is_zero() {
        let sets = (0..70)
            .fold(ParameterSets::new(), |sets, i| {
                sets.with(format!("p{}", i), "controls", ["0", "1"])
            })
            .with("last", "controls", Vec::<String>::new());
        assert_eq!(sets.combination_count(), 0);
        assert_eq!(sets.combinations().count(), 0);
    }

    #[test]
    fn empty_axis_yields_nothing() {
        let sets = ParameterSets::new()
            .with("x", "controls", ["1", "2"])
            .with("y", "controls", Vec::<String>::new());
        assert_eq!(sets.combinations().count(), 0);
    }

    #[test]
    fn reinsert_keeps_position() {
        let mut sets = ParameterSets::new()
            .with("x", "controls", ["1"])
            .with("y", "controls", ["2"]);
        let old = sets.insert("x", "controls", ["9"]);
        assert_eq!(old.unwrap().values, vec!["1".to_string()]);
        let first = sets.combinations().next().unwrap();
        assert_eq!(values(&first), vec!["9", "2"]);
    }
}
