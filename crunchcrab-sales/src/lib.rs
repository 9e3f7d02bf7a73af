//! # CrunchCrab Sales
//!
//! Sales analytics over the crunchcrab engine: the record extractor for the
//! delimited sales export, the four-question job catalogue, and the
//! tab-separated output writer.
//!
//! - [`record`] — Positional field extraction: [`SalesRecord`](record::SalesRecord).
//! - [`jobs`] — The job catalogue: average unit price, total units sold,
//!   units-sold range, and top orders by profit.
//! - [`output`] — Per-partition output directories.

pub mod jobs;
pub mod output;
pub mod record;
