//! Grouped Statistics Example
//!
//! This example demonstrates:
//! - Mapping raw lines into (composite key, value) pairs
//! - Local combining before the shuffle
//! - Hash partitioning by key across parallel reduce workers
//! - Mean and bounded top-N aggregation over the same driver
//!
//! Architecture:
//! ```
//! Map workers (parallelism=2)
//!     |
//!     | Hash partition (by composite key)
//!     v
//! Reduce workers (parallelism=2)
//! ```

use anyhow::Result;

use crunchcrab_core::aggregate::Mean;
use crunchcrab_core::error::{Error, Result as CoreResult};
use crunchcrab_core::key::{CompositeKey, KeyField};
use crunchcrab_core::pipeline::{run_job, EngineConfig, RecordMapper};
use crunchcrab_core::topn::{TopEntry, TopN};

/// Maps `region,product,amount` lines keyed by (region, product).
struct RegionProductMapper;

impl RecordMapper for RegionProductMapper {
    type Value = f64;

    fn map_line(&self, line: &str) -> CoreResult<(CompositeKey, f64)> {
        let mut parts = line.split(',');
        let region = parts.next().unwrap_or_default();
        let product = parts.next().unwrap_or_default();
        let amount = parts
            .next()
            .unwrap_or_default()
            .parse::<f64>()
            .map_err(|e| Error::Parse {
                field: "amount",
                reason: e.to_string(),
            })?;
        let key = CompositeKey::new(vec![KeyField::text(region), KeyField::text(product)]);
        Ok((key, amount))
    }
}

/// Maps `region,product,amount` lines to (region → scored order) pairs,
/// using the line number as the tiebreak id.
struct TopAmountMapper;

impl RecordMapper for TopAmountMapper {
    type Value = TopEntry;

    fn map_line(&self, line: &str) -> CoreResult<(CompositeKey, TopEntry)> {
        let mut parts = line.split(',');
        let region = parts.next().unwrap_or_default();
        let _product = parts.next();
        let amount = parts
            .next()
            .unwrap_or_default()
            .parse::<f64>()
            .map_err(|e| Error::Parse {
                field: "amount",
                reason: e.to_string(),
            })?;
        let id = parts
            .next()
            .unwrap_or_default()
            .parse::<i64>()
            .map_err(|e| Error::Parse {
                field: "id",
                reason: e.to_string(),
            })?;
        let key = CompositeKey::new(vec![KeyField::text(region)]);
        Ok((key, TopEntry::new(amount, id)))
    }
}

fn main() -> Result<()> {
    let input: Vec<String> = [
        "west,snacks,10.0,1",
        "east,snacks,20.0,2",
        "west,snacks,30.0,3",
        "west,cereal,12.5,4",
        "east,cereal,40.0,5",
        "east,snacks,16.0,6",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let config = EngineConfig {
        map_tasks: 2,
        reduce_tasks: 2,
        ..EngineConfig::default()
    };

    println!("=== Mean amount by (region, product) ===");
    let (outputs, report) = run_job(input.clone(), &RegionProductMapper, &Mean, &config)?;
    for (partition, results) in outputs.iter().enumerate() {
        for (key, mean) in results {
            println!("  [partition {}] {}\t{}", partition, key, mean);
        }
    }
    println!("  ({} records, {} skipped)", report.records_read, report.records_skipped);

    println!("\n=== Top 2 amounts by region ===");
    let top = TopN::new(2)?;
    let (outputs, _) = run_job(input, &TopAmountMapper, &top, &config)?;
    for results in &outputs {
        for (key, entries) in results {
            for entry in entries {
                println!("  {}\t{}\t{}", key, entry.tiebreak, entry.score);
            }
        }
    }

    Ok(())
}
