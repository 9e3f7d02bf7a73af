//! # CrunchCrab Core
//!
//! Engine for grouped statistics over flat records in a
//! map → local-combine → shuffle-by-key → reduce shape.
//!
//! This crate provides the foundational types and the local driver:
//!
//! - [`key`] — Composite grouping keys: [`CompositeKey`](key::CompositeKey),
//!   [`KeyField`](key::KeyField), and the byte codec.
//! - [`partitioner`] — Routing keys to reduce shards:
//!   [`HashPartitioner`](partitioner::HashPartitioner).
//! - [`aggregate`] — The [`Aggregation`](aggregate::Aggregation) contract and
//!   the [`Mean`](aggregate::Mean), [`Sum`](aggregate::Sum), and
//!   [`MinMax`](aggregate::MinMax) strategies.
//! - [`topn`] — Bounded top-N retention: [`BoundedTopSet`](topn::BoundedTopSet)
//!   and the [`TopN`](topn::TopN) strategy.
//! - [`combiner`] — Worker-local pre-merge before the shuffle.
//! - [`reducer`] — Final per-partition merge and emission.
//! - [`channel`] — Bounded shuffle channels between stages.
//! - [`pipeline`] — Configuration and the threaded job driver.

pub mod aggregate;
pub mod channel;
pub mod combiner;
pub mod error;
pub mod key;
pub mod partitioner;
pub mod pipeline;
pub mod reducer;
pub mod topn;
