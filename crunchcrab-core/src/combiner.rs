//! Worker-local pre-merge of accumulators sharing a key.
//!
//! Each map worker owns one [`Combiner`]; nothing here is shared across
//! threads. Combining early is purely an optimization: every strategy's
//! merge is associative and commutative, so draining seeded-but-unmerged
//! accumulators instead would reach the same final results, just with more
//! shuffle traffic.

use std::collections::HashMap;

use crate::aggregate::Aggregation;
use crate::key::CompositeKey;

/// Per-worker mapping from key to partial aggregate.
pub struct Combiner<'a, A: Aggregation> {
    aggregation: &'a A,
    state: HashMap<CompositeKey, A::Acc>,
}

impl<'a, A: Aggregation> Combiner<'a, A> {
    pub fn new(aggregation: &'a A) -> Self {
        Self {
            aggregation,
            state: HashMap::new(),
        }
    }

    /// Seed one mapped value and fold it into the accumulator for `key`.
    pub fn accept(&mut self, key: CompositeKey, input: A::Input) {
        let seeded = self.aggregation.seed(input);
        self.accept_partial(key, seeded);
    }

    /// Fold an already-seeded partial aggregate into the state for `key`.
    ///
    /// The existing accumulator is taken out of the map and merged by value;
    /// accumulators are never mutated in place or aliased.
    pub fn accept_partial(&mut self, key: CompositeKey, acc: A::Acc) {
        match self.state.remove(&key) {
            Some(existing) => {
                let merged = self.aggregation.merge(existing, acc);
                self.state.insert(key, merged);
            }
            None => {
                self.state.insert(key, acc);
            }
        }
    }

    /// Number of distinct keys accumulated so far.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Hand every accumulated (key, partial) pair over to the shuffle.
    pub fn drain(self) -> impl Iterator<Item = (CompositeKey, A::Acc)> {
        self.state.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Mean, MeanState, Sum};
    use crate::key::{CompositeKey, KeyField};

    fn key(name: &str) -> CompositeKey {
        CompositeKey::new(vec![KeyField::text(name)])
    }

    #[test]
    fn test_accept_folds_same_key() {
        let agg = Sum::<i64>::new();
        let mut combiner = Combiner::new(&agg);

        combiner.accept(key("a"), 10);
        combiner.accept(key("b"), 20);
        combiner.accept(key("a"), 15);

        assert_eq!(combiner.len(), 2);
        let state: HashMap<_, _> = combiner.drain().collect();
        assert_eq!(state[&key("a")].total, 25);
        assert_eq!(state[&key("b")].total, 20);
    }

    #[test]
    fn test_partials_and_values_mix() {
        let agg = Mean;
        let mut combiner = Combiner::new(&agg);

        combiner.accept(key("a"), 10.0);
        combiner.accept_partial(key("a"), MeanState { sum: 50.0, count: 2 });

        let state: HashMap<_, _> = combiner.drain().collect();
        assert_eq!(state[&key("a")], MeanState { sum: 60.0, count: 3 });
    }

    #[test]
    fn test_empty_combiner_drains_nothing() {
        let agg = Sum::<i64>::new();
        let combiner = Combiner::new(&agg);

        assert!(combiner.is_empty());
        assert_eq!(combiner.drain().count(), 0);
    }
}
