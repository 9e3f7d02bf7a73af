//! Aggregation strategies: seed, merge, finalize.
//!
//! Every strategy follows one shape: `seed` lifts a single mapped value into
//! a fresh accumulator, `merge` combines two accumulators, and `finalize`
//! turns the fully merged accumulator into the emitted result.
//!
//! `merge` must be associative and commutative:
//! `merge(merge(a, b), c) == merge(a, merge(b, c))` and
//! `merge(a, b) == merge(b, a)`. Partial results can then be combined in any
//! order, at the local combiner or at the reducer, without changing the
//! outcome, which is the whole soundness argument for early aggregation.
//!
//! Accumulators move by value. Nothing is aliased, shared, or reset between
//! calls; a downstream stage that retains an accumulator owns it outright.

use std::marker::PhantomData;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Trait bound for values that flow between pipeline stages.
///
/// Matches what an external shuffle needs to move an accumulator between
/// processes: owned, thread-safe, serializable.
pub trait BatchData: Send + Clone + Serialize + for<'de> Deserialize<'de> + 'static {}

// Blanket implementation: any type satisfying the bounds is BatchData.
impl<T> BatchData for T where T: Send + Clone + Serialize + for<'de> Deserialize<'de> + 'static {}

/// A grouped-aggregation strategy.
///
/// One instance is shared read-only by every worker of a job; all per-key
/// state lives in the accumulators it produces.
pub trait Aggregation: Send + Sync {
    /// Mapped value consumed at seed time.
    type Input: Send;
    /// Mergeable partial aggregate.
    type Acc: BatchData;
    /// Finalized per-key result.
    type Output: Send;

    /// Lift one mapped value into a fresh accumulator.
    fn seed(&self, input: Self::Input) -> Self::Acc;

    /// Combine two partial aggregates. Associative and commutative.
    fn merge(&self, left: Self::Acc, right: Self::Acc) -> Self::Acc;

    /// Convert the fully merged accumulator into the emitted result.
    ///
    /// Called exactly once per key, after the last merge.
    fn finalize(&self, acc: Self::Acc) -> Result<Self::Output>;
}

// ── Mean ──────────────────────────────────────────────────────────────────────

/// Arithmetic mean of `f64` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean;

/// Running sum and count.
///
/// Partial means are never averaged directly: two partials may contribute
/// unequal counts, so only the component-wise sums merge correctly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanState {
    pub sum: f64,
    pub count: u64,
}

impl Aggregation for Mean {
    type Input = f64;
    type Acc = MeanState;
    type Output = f64;

    fn seed(&self, input: f64) -> MeanState {
        MeanState {
            sum: input,
            count: 1,
        }
    }

    fn merge(&self, left: MeanState, right: MeanState) -> MeanState {
        MeanState {
            sum: left.sum + right.sum,
            count: left.count + right.count,
        }
    }

    /// Fails on a zero count instead of dividing: a grouped key always has at
    /// least one contributing value, so an empty accumulator is a bug that
    /// must surface, not a NaN to emit.
    fn finalize(&self, acc: MeanState) -> Result<f64> {
        if acc.count == 0 {
            return Err(Error::Aggregation("mean over zero values".into()));
        }
        Ok(acc.sum / acc.count as f64)
    }
}

// ── Sum ───────────────────────────────────────────────────────────────────────

/// Sum of an additive scalar.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum<T> {
    _marker: PhantomData<T>,
}

impl<T> Sum<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

/// Running total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumState<T> {
    pub total: T,
}

impl<T> Aggregation for Sum<T>
where
    T: BatchData + Add<Output = T> + Sync,
{
    type Input = T;
    type Acc = SumState<T>;
    type Output = T;

    fn seed(&self, input: T) -> SumState<T> {
        SumState { total: input }
    }

    fn merge(&self, left: SumState<T>, right: SumState<T>) -> SumState<T> {
        SumState {
            total: left.total + right.total,
        }
    }

    fn finalize(&self, acc: SumState<T>) -> Result<T> {
        Ok(acc.total)
    }
}

// ── MinMax ────────────────────────────────────────────────────────────────────

/// Component-wise minimum and maximum of an ordered scalar.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinMax<T> {
    _marker: PhantomData<T>,
}

impl<T> MinMax<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

/// Smallest and largest value seen so far. Seeded from a single value, so
/// `min <= max` always holds and there is no empty variant to guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinMaxState<T> {
    pub min: T,
    pub max: T,
}

impl<T> Aggregation for MinMax<T>
where
    T: BatchData + Ord + Sync,
{
    type Input = T;
    type Acc = MinMaxState<T>;
    type Output = MinMaxState<T>;

    fn seed(&self, input: T) -> MinMaxState<T> {
        MinMaxState {
            min: input.clone(),
            max: input,
        }
    }

    fn merge(&self, left: MinMaxState<T>, right: MinMaxState<T>) -> MinMaxState<T> {
        MinMaxState {
            min: left.min.min(right.min),
            max: left.max.max(right.max),
        }
    }

    fn finalize(&self, acc: MinMaxState<T>) -> Result<MinMaxState<T>> {
        Ok(acc)
    }
}

#[cfg(test)]
#[path = "tests/aggregate_tests.rs"]
mod tests;
