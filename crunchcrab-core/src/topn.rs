//! Bounded top-N retention.
//!
//! [`BoundedTopSet`] keeps the N highest-ranked entries seen so far under a
//! streaming admission policy. Ranking is descending score, then ascending
//! tiebreak on score ties; both rules are part of the contract, not an
//! artifact of the backing collection.
//!
//! Merging two bounded sets is combiner-safe: when the inputs are drawn from
//! a partition of the underlying data, the top N of the union of two
//! top-N-bounded subsets equals the top N of the full set. An entry evicted
//! locally was already outranked by N retained entries and can never
//! re-enter a correct global top N, so early pruning loses nothing the final
//! answer needs.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregation;
use crate::error::{Error, Result};

/// One scored entry: the ranking score and an identifying tiebreak.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TopEntry {
    pub score: f64,
    pub tiebreak: i64,
}

impl TopEntry {
    pub fn new(score: f64, tiebreak: i64) -> Self {
        Self { score, tiebreak }
    }
}

/// Retention order: entries sort worst-first, so the minimum of the backing
/// set is always the eviction candidate. Worst means lowest score; among
/// equal scores, the higher tiebreak (ranking is ascending tiebreak).
///
/// `f64::total_cmp` keeps the order total even for NaN scores.
impl Ord for TopEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.tiebreak.cmp(&self.tiebreak))
    }
}

impl PartialOrd for TopEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TopEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TopEntry {}

/// Bounded ordered set of the top `capacity` entries seen so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundedTopSet {
    capacity: usize,
    entries: BTreeSet<TopEntry>,
}

impl BoundedTopSet {
    /// Empty set. Callers construct through [`TopN`], which validates the
    /// capacity.
    fn empty(capacity: usize) -> Self {
        Self {
            capacity,
            entries: BTreeSet::new(),
        }
    }

    /// Set holding a single entry.
    pub fn singleton(capacity: usize, entry: TopEntry) -> Self {
        let mut set = Self::empty(capacity);
        set.offer(entry);
        set
    }

    /// Admit one entry under the retention policy.
    ///
    /// Below capacity the entry is inserted. At capacity the entry replaces
    /// the worst retained entry only if it outranks it; otherwise it is
    /// discarded. An exact duplicate (same score and tiebreak) is never
    /// stored twice. Returns whether the entry was retained.
    pub fn offer(&mut self, entry: TopEntry) -> bool {
        if self.entries.len() < self.capacity {
            return self.entries.insert(entry);
        }
        let worst = match self.entries.first() {
            Some(worst) => *worst,
            None => return false,
        };
        if entry > worst {
            self.entries.pop_first();
            self.entries.insert(entry)
        } else {
            false
        }
    }

    /// Fold every entry of `other` into `self` under the admission policy.
    pub fn merge(mut self, other: BoundedTopSet) -> Self {
        debug_assert_eq!(self.capacity, other.capacity);
        for entry in other.entries {
            self.offer(entry);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Consume the set, best entry first.
    pub fn into_ranked(self) -> Vec<TopEntry> {
        self.entries.into_iter().rev().collect()
    }
}

/// Bounded top-N aggregation strategy.
#[derive(Debug, Clone, Copy)]
pub struct TopN {
    capacity: usize,
}

impl TopN {
    /// `capacity` must be positive.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidConfig(
                "top-N capacity must be positive".into(),
            ));
        }
        Ok(Self { capacity })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Aggregation for TopN {
    type Input = TopEntry;
    type Acc = BoundedTopSet;
    type Output = Vec<TopEntry>;

    fn seed(&self, input: TopEntry) -> BoundedTopSet {
        BoundedTopSet::singleton(self.capacity, input)
    }

    fn merge(&self, left: BoundedTopSet, right: BoundedTopSet) -> BoundedTopSet {
        left.merge(right)
    }

    fn finalize(&self, acc: BoundedTopSet) -> Result<Vec<TopEntry>> {
        Ok(acc.into_ranked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: f64, tiebreak: i64) -> TopEntry {
        TopEntry::new(score, tiebreak)
    }

    /// Reference implementation: rank the full multiset, take the first N.
    fn brute_force_top(capacity: usize, entries: &[TopEntry]) -> Vec<TopEntry> {
        let mut sorted: Vec<TopEntry> = {
            let dedup: BTreeSet<TopEntry> = entries.iter().copied().collect();
            dedup.into_iter().rev().collect()
        };
        sorted.truncate(capacity);
        sorted
    }

    #[test]
    fn test_retains_top_two_any_order() {
        let entries = [entry(5.0, 1), entry(9.0, 2), entry(1.0, 3)];
        let expected = vec![entry(9.0, 2), entry(5.0, 1)];

        // All six insertion orders must agree.
        let orders: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        for order in orders {
            let mut set = BoundedTopSet::singleton(2, entries[order[0]]);
            set.offer(entries[order[1]]);
            set.offer(entries[order[2]]);
            assert_eq!(set.into_ranked(), expected, "order {:?}", order);
        }
    }

    #[test]
    fn test_lower_entry_discarded_at_capacity() {
        let mut set = BoundedTopSet::singleton(2, entry(5.0, 1));
        assert!(set.offer(entry(9.0, 2)));

        // Worse than the current minimum: discarded, set unchanged.
        assert!(!set.offer(entry(1.0, 3)));
        assert_eq!(set.len(), 2);
        assert_eq!(set.into_ranked(), vec![entry(9.0, 2), entry(5.0, 1)]);
    }

    #[test]
    fn test_equal_to_worst_is_discarded() {
        let mut set = BoundedTopSet::singleton(1, entry(5.0, 7));
        // Identical entry does not outrank the retained one.
        assert!(!set.offer(entry(5.0, 7)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_tiebreak_ranks_ascending() {
        // Same score: the lower tiebreak ranks higher, so it both survives
        // eviction and comes first in the ranked output.
        let mut set = BoundedTopSet::singleton(2, entry(4.0, 30));
        set.offer(entry(4.0, 10));
        set.offer(entry(4.0, 20));

        assert_eq!(set.into_ranked(), vec![entry(4.0, 10), entry(4.0, 20)]);
    }

    #[test]
    fn test_merge_equals_top_of_union() {
        // Two disjoint halves of one data set, each pruned to 3 locally.
        let left_data = [
            entry(10.0, 1),
            entry(8.0, 2),
            entry(3.0, 3),
            entry(1.0, 4),
        ];
        let right_data = [
            entry(9.0, 5),
            entry(7.0, 6),
            entry(2.0, 7),
            entry(0.5, 8),
        ];

        let fold = |data: &[TopEntry]| {
            let mut iter = data.iter();
            let mut set = BoundedTopSet::singleton(3, *iter.next().unwrap());
            for e in iter {
                set.offer(*e);
            }
            set
        };

        let merged = fold(&left_data).merge(fold(&right_data));

        let mut union = Vec::new();
        union.extend_from_slice(&left_data);
        union.extend_from_slice(&right_data);
        assert_eq!(merged.into_ranked(), brute_force_top(3, &union));
    }

    #[test]
    fn test_merge_commutes() {
        let a = BoundedTopSet::singleton(2, entry(6.0, 1));
        let mut b = BoundedTopSet::singleton(2, entry(8.0, 2));
        b.offer(entry(4.0, 3));

        assert_eq!(
            a.clone().merge(b.clone()).into_ranked(),
            b.merge(a).into_ranked()
        );
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = TopN::new(0).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert_eq!(TopN::new(10).unwrap().capacity(), 10);
    }

    #[test]
    fn test_strategy_round() {
        let agg = TopN::new(2).unwrap();

        let acc = [entry(5.0, 1), entry(9.0, 2), entry(1.0, 3)]
            .iter()
            .map(|e| agg.seed(*e))
            .reduce(|a, b| agg.merge(a, b))
            .unwrap();

        assert_eq!(
            agg.finalize(acc).unwrap(),
            vec![entry(9.0, 2), entry(5.0, 1)]
        );
    }
}
