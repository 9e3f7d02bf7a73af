//! The map → combine → shuffle → reduce driver.
//!
//! Local stand-in for an external distributed runtime: map workers are
//! threads over disjoint input splits, the shuffle is a set of bounded
//! channels indexed by the partitioner, and reduce workers are threads that
//! own one partition each.
//!
//! # Execution shape
//!
//! ```text
//! Map workers (one per split, private combiner)
//!     |
//!     | hash partition by key, one channel per reduce partition
//!     v
//! Reduce workers (one per partition, fold then finalize)
//!     |
//!     v
//! Per-partition results, sorted by key
//! ```
//!
//! The map/reduce boundary is a barrier: every map worker sends an end
//! marker on every channel, and a reduce worker finalizes nothing until it
//! has collected one marker per map task. Because workers hold no external
//! side effects before the final emit, re-running a job over the same input
//! produces identical results.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crate::aggregate::Aggregation;
use crate::channel::{shuffle_channel, ShuffleElement, ShuffleSender};
use crate::combiner::Combiner;
use crate::error::{Error, Result};
use crate::key::CompositeKey;
use crate::partitioner::{HashPartitioner, Partitioner};
use crate::reducer::Reducer;

/// Turns one raw input line into a (key, value) pair.
///
/// A [`Error::Parse`] return is recoverable: the driver skips the record,
/// bumps the skip counter, and keeps going. Any other error aborts the job.
pub trait RecordMapper: Send + Sync {
    type Value: Send;

    fn map_line(&self, line: &str) -> Result<(CompositeKey, Self::Value)>;
}

/// Driver tuning. A zero anywhere is a configuration error, rejected before
/// any map or reduce work starts.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of parallel map workers; input lines are chunked into this
    /// many splits.
    pub map_tasks: usize,
    /// Number of reduce partitions, each owned by one worker.
    pub reduce_tasks: usize,
    /// Shuffle channel capacity; a full channel blocks the producer.
    pub channel_capacity: usize,
    /// Merge same-key accumulators locally before the shuffle. Disabling
    /// never changes results, only the volume routed to reducers.
    pub local_combine: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            map_tasks: 4,
            reduce_tasks: 4,
            channel_capacity: 1024,
            local_combine: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.map_tasks == 0 {
            return Err(Error::InvalidConfig("map_tasks must be positive".into()));
        }
        if self.reduce_tasks == 0 {
            return Err(Error::InvalidConfig("reduce_tasks must be positive".into()));
        }
        if self.channel_capacity == 0 {
            return Err(Error::InvalidConfig(
                "channel_capacity must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Counters for one job run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobReport {
    /// Records successfully mapped.
    pub records_read: u64,
    /// Records dropped on a recoverable parse error.
    pub records_skipped: u64,
    /// Keys dropped on a finalize error.
    pub keys_failed: u64,
}

/// Per-partition job output: `output[p]` holds partition `p`, sorted by key.
pub type PartitionedOutput<O> = Vec<Vec<(CompositeKey, O)>>;

/// Chunk `lines` into `splits` near-equal runs, preserving order.
///
/// Trailing splits may be empty when there are fewer lines than splits; an
/// empty split still runs a map worker, which only emits its end markers.
pub fn split_lines(lines: Vec<String>, splits: usize) -> Vec<Vec<String>> {
    let chunk = lines.len().div_ceil(splits).max(1);
    let mut iter = lines.into_iter();
    let mut out = Vec::with_capacity(splits);
    for _ in 0..splits {
        out.push(iter.by_ref().take(chunk).collect());
    }
    out
}

/// Run one grouped-aggregation job over raw input lines.
///
/// Returns per-partition results plus the run's counters.
pub fn run_job<M, A>(
    lines: Vec<String>,
    mapper: &M,
    aggregation: &A,
    config: &EngineConfig,
) -> Result<(PartitionedOutput<A::Output>, JobReport)>
where
    M: RecordMapper<Value = A::Input>,
    A: Aggregation,
{
    config.validate()?;

    let splits = split_lines(lines, config.map_tasks);
    let map_tasks = config.map_tasks;
    let local_combine = config.local_combine;

    // One channel per reduce partition; every map worker holds a clone of
    // every sender.
    let mut senders = Vec::with_capacity(config.reduce_tasks);
    let mut receivers = Vec::with_capacity(config.reduce_tasks);
    for _ in 0..config.reduce_tasks {
        let (tx, rx) = shuffle_channel(config.channel_capacity);
        senders.push(tx);
        receivers.push(rx);
    }

    let records_read = AtomicU64::new(0);
    let records_skipped = AtomicU64::new(0);

    let (outputs, keys_failed) = thread::scope(|scope| {
        let mut reduce_handles = Vec::with_capacity(receivers.len());
        for receiver in receivers {
            let handle = scope.spawn(move || -> Result<(Vec<(CompositeKey, A::Output)>, u64)> {
                let mut reducer = Reducer::new(aggregation);
                let mut ended = 0usize;
                while ended < map_tasks {
                    match receiver.recv()? {
                        ShuffleElement::Partial(key, acc) => reducer.absorb(key, acc),
                        ShuffleElement::End => ended += 1,
                    }
                }
                Ok(reducer.finish())
            });
            reduce_handles.push(handle);
        }

        let mut map_handles = Vec::with_capacity(map_tasks);
        for split in splits {
            let senders = senders.clone();
            let records_read = &records_read;
            let records_skipped = &records_skipped;
            let handle = scope.spawn(move || {
                let outcome = run_map_split(
                    &split,
                    mapper,
                    aggregation,
                    &senders,
                    local_combine,
                    records_read,
                    records_skipped,
                );
                // Release the barrier even on failure so reducers can drain
                // and the scope can join.
                for sender in &senders {
                    let _ = sender.send(ShuffleElement::End);
                }
                outcome
            });
            map_handles.push(handle);
        }
        drop(senders);

        for handle in map_handles {
            join_worker(handle)?;
        }

        let mut outputs = Vec::with_capacity(reduce_handles.len());
        let mut keys_failed = 0u64;
        for handle in reduce_handles {
            let (results, failed) = join_worker(handle)?;
            keys_failed += failed;
            outputs.push(results);
        }
        Ok::<_, Error>((outputs, keys_failed))
    })?;

    let report = JobReport {
        records_read: records_read.load(Ordering::Relaxed),
        records_skipped: records_skipped.load(Ordering::Relaxed),
        keys_failed,
    };
    tracing::info!(
        read = report.records_read,
        skipped = report.records_skipped,
        failed_keys = report.keys_failed,
        "job complete"
    );
    Ok((outputs, report))
}

/// One map worker: extract, seed, locally combine, then route everything
/// to its reduce partition. End markers are the caller's responsibility.
fn run_map_split<M, A>(
    split: &[String],
    mapper: &M,
    aggregation: &A,
    senders: &[ShuffleSender<A::Acc>],
    local_combine: bool,
    records_read: &AtomicU64,
    records_skipped: &AtomicU64,
) -> Result<()>
where
    M: RecordMapper<Value = A::Input>,
    A: Aggregation,
{
    let mut combiner = Combiner::new(aggregation);
    for line in split {
        match mapper.map_line(line) {
            Ok((key, value)) => {
                records_read.fetch_add(1, Ordering::Relaxed);
                if local_combine {
                    combiner.accept(key, value);
                } else {
                    route(senders, key, aggregation.seed(value))?;
                }
            }
            Err(err) if err.is_recoverable() => {
                records_skipped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(error = %err, "skipping malformed record");
            }
            Err(err) => return Err(err),
        }
    }
    for (key, acc) in combiner.drain() {
        route(senders, key, acc)?;
    }
    Ok(())
}

/// Route one (key, partial) pair to the channel its partition owns.
fn route<T>(senders: &[ShuffleSender<T>], key: CompositeKey, acc: T) -> Result<()> {
    let index = HashPartitioner.partition(&key, senders.len())?;
    senders[index].send(ShuffleElement::Partial(key, acc))
}

/// Join a scoped worker, propagating its result and resuming its panic.
fn join_worker<'scope, T>(handle: thread::ScopedJoinHandle<'scope, Result<T>>) -> Result<T> {
    match handle.join() {
        Ok(result) => result,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
