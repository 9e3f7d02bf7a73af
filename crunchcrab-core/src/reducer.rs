//! Final per-partition merge and emission.

use std::collections::HashMap;

use crate::aggregate::Aggregation;
use crate::key::CompositeKey;

/// Folds every partial aggregate routed to one reduce partition.
///
/// Per key the lifecycle only moves forward: absent → accumulating while
/// partials arrive → finalized exactly once inside [`finish`](Self::finish)
/// → emitted. The driver guarantees nothing is finalized until the map stage
/// has stopped producing for this partition, and that every partial for a
/// key arrives here and nowhere else.
pub struct Reducer<'a, A: Aggregation> {
    aggregation: &'a A,
    state: HashMap<CompositeKey, A::Acc>,
}

impl<'a, A: Aggregation> Reducer<'a, A> {
    pub fn new(aggregation: &'a A) -> Self {
        Self {
            aggregation,
            state: HashMap::new(),
        }
    }

    /// Merge one incoming partial aggregate into the state for `key`.
    /// Arrival order is unspecified and does not matter.
    pub fn absorb(&mut self, key: CompositeKey, acc: A::Acc) {
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

    /// Number of distinct keys held.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Finalize every key and emit one result per key, sorted by the key's
    /// total order. Returns the results and the count of failed keys.
    ///
    /// A finalize failure is logged and counted; it aborts that key only and
    /// never cancels sibling keys.
    pub fn finish(self) -> (Vec<(CompositeKey, A::Output)>, u64) {
        let Reducer { aggregation, state } = self;

        let mut entries: Vec<(CompositeKey, A::Acc)> = state.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut results = Vec::with_capacity(entries.len());
        let mut failed = 0u64;
        for (key, acc) in entries {
            match aggregation.finalize(acc) {
                Ok(output) => results.push((key, output)),
                Err(err) => {
                    failed += 1;
                    tracing::error!(key = %key, error = %err, "finalize failed, key dropped");
                }
            }
        }
        (results, failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Aggregation, Mean, MeanState, Sum};
    use crate::key::{CompositeKey, KeyField};

    fn key(name: &str) -> CompositeKey {
        CompositeKey::new(vec![KeyField::text(name)])
    }

    #[test]
    fn test_absorb_merges_partials() {
        let agg = Mean;
        let mut reducer = Reducer::new(&agg);

        reducer.absorb(key("a"), agg.seed(10.0));
        reducer.absorb(key("a"), MeanState { sum: 50.0, count: 2 });
        reducer.absorb(key("b"), agg.seed(7.0));

        let (results, failed) = reducer.finish();
        assert_eq!(failed, 0);
        assert_eq!(results, vec![(key("a"), 20.0), (key("b"), 7.0)]);
    }

    #[test]
    fn test_results_sorted_by_key() {
        let agg = Sum::<i64>::new();
        let mut reducer = Reducer::new(&agg);

        for name in ["zebra", "apple", "mango"] {
            reducer.absorb(key(name), agg.seed(1));
        }

        let (results, _) = reducer.finish();
        let names: Vec<String> = results.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(names, vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn test_failed_key_does_not_cancel_siblings() {
        let agg = Mean;
        let mut reducer = Reducer::new(&agg);

        reducer.absorb(key("ok"), agg.seed(4.0));
        // An empty accumulator cannot come out of seed/merge; inject one to
        // exercise the per-key failure path.
        reducer.absorb(key("broken"), MeanState { sum: 0.0, count: 0 });

        let (results, failed) = reducer.finish();
        assert_eq!(failed, 1);
        assert_eq!(results, vec![(key("ok"), 4.0)]);
    }
}
