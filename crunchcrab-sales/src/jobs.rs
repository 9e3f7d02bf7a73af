//! The sales job catalogue.
//!
//! Four grouped-statistics jobs over the same export, each a plain value:
//! a record mapper, an aggregation strategy, a line formatter, and a fixed
//! output-directory suffix. Jobs share the engine driver; nothing here owns
//! threads or channels.
//!
//! | job | key | value | strategy | suffix |
//! |---|---|---|---|---|
//! | [`average_unit_price`] | country, item type, year | unit price | mean | `-que-1` |
//! | [`total_units_sold`] | country, item type, year | units sold | sum | `-que-2` |
//! | [`units_sold_range`] | country, item type, year | units sold | min/max | `-que-3` |
//! | [`top_profit_orders`] | year | (total profit, order id) | top-N | `-que-4` |

use std::path::Path;

use crunchcrab_core::aggregate::{Mean, MinMax, Sum};
use crunchcrab_core::error::Result;
use crunchcrab_core::key::{CompositeKey, KeyField};
use crunchcrab_core::pipeline::{run_job, EngineConfig, JobReport, PartitionedOutput, RecordMapper};
use crunchcrab_core::topn::{TopEntry, TopN};

use crate::output;
use crate::record::{self, SalesRecord};

pub const SUFFIX_AVERAGE_UNIT_PRICE: &str = "-que-1";
pub const SUFFIX_TOTAL_UNITS_SOLD: &str = "-que-2";
pub const SUFFIX_UNITS_SOLD_RANGE: &str = "-que-3";
pub const SUFFIX_TOP_PROFIT_ORDERS: &str = "-que-4";

/// Grouping key shared by the per-market jobs.
fn market_key(record: &SalesRecord) -> CompositeKey {
    CompositeKey::new(vec![
        KeyField::text(record.country.clone()),
        KeyField::text(record.item_type.clone()),
        KeyField::int(record.order_year as i64),
    ])
}

/// (country, item type, year) → unit price.
#[derive(Debug, Clone, Copy)]
pub struct UnitPriceByMarket;

impl RecordMapper for UnitPriceByMarket {
    type Value = f64;

    fn map_line(&self, line: &str) -> Result<(CompositeKey, f64)> {
        let record = record::parse_line(line)?;
        let key = market_key(&record);
        Ok((key, record.unit_price))
    }
}

/// (country, item type, year) → units sold.
#[derive(Debug, Clone, Copy)]
pub struct UnitsSoldByMarket;

impl RecordMapper for UnitsSoldByMarket {
    type Value = i64;

    fn map_line(&self, line: &str) -> Result<(CompositeKey, i64)> {
        let record = record::parse_line(line)?;
        let key = market_key(&record);
        Ok((key, record.units_sold))
    }
}

/// year → order scored by total profit, order id as the tiebreak.
#[derive(Debug, Clone, Copy)]
pub struct ProfitByYear;

impl RecordMapper for ProfitByYear {
    type Value = TopEntry;

    fn map_line(&self, line: &str) -> Result<(CompositeKey, TopEntry)> {
        let record = record::parse_line(line)?;
        let key = CompositeKey::new(vec![KeyField::int(record.order_year as i64)]);
        Ok((key, TopEntry::new(record.total_profit, record.order_id)))
    }
}

/// Average unit price by (country, item type, year).
pub fn average_unit_price(input: &Path, output_base: &Path, config: &EngineConfig) -> Result<JobReport> {
    let lines = record::read_lines(input)?;
    let (outputs, report) = run_job(lines, &UnitPriceByMarket, &Mean, config)?;

    let formatted = format_partitions(&outputs, |key, mean, lines| {
        lines.push(format!("{}\t{}", key, mean));
    });
    let dir = output::job_output_dir(output_base, SUFFIX_AVERAGE_UNIT_PRICE);
    output::write_partitions(&dir, &formatted)?;
    Ok(report)
}

/// Total units sold by (country, item type, year).
pub fn total_units_sold(input: &Path, output_base: &Path, config: &EngineConfig) -> Result<JobReport> {
    let lines = record::read_lines(input)?;
    let (outputs, report) = run_job(lines, &UnitsSoldByMarket, &Sum::<i64>::new(), config)?;

    let formatted = format_partitions(&outputs, |key, total, lines| {
        lines.push(format!("{}\t{}", key, total));
    });
    let dir = output::job_output_dir(output_base, SUFFIX_TOTAL_UNITS_SOLD);
    output::write_partitions(&dir, &formatted)?;
    Ok(report)
}

/// Smallest and largest units-sold figure by (country, item type, year),
/// both on one line: key fields, then min, then max.
pub fn units_sold_range(input: &Path, output_base: &Path, config: &EngineConfig) -> Result<JobReport> {
    let lines = record::read_lines(input)?;
    let (outputs, report) = run_job(lines, &UnitsSoldByMarket, &MinMax::<i64>::new(), config)?;

    let formatted = format_partitions(&outputs, |key, range, lines| {
        lines.push(format!("{}\t{}\t{}", key, range.min, range.max));
    });
    let dir = output::job_output_dir(output_base, SUFFIX_UNITS_SOLD_RANGE);
    output::write_partitions(&dir, &formatted)?;
    Ok(report)
}

/// Top `capacity` orders by total profit per year, one line per retained
/// order, best first: year, then order id, then total profit.
pub fn top_profit_orders(
    input: &Path,
    output_base: &Path,
    config: &EngineConfig,
    capacity: usize,
) -> Result<JobReport> {
    let strategy = TopN::new(capacity)?;
    let lines = record::read_lines(input)?;
    let (outputs, report) = run_job(lines, &ProfitByYear, &strategy, config)?;

    let formatted = format_partitions(&outputs, |key, entries, lines| {
        for entry in entries {
            lines.push(format!("{}\t{}\t{}", key, entry.tiebreak, entry.score));
        }
    });
    let dir = output::job_output_dir(output_base, SUFFIX_TOP_PROFIT_ORDERS);
    output::write_partitions(&dir, &formatted)?;
    Ok(report)
}

/// Render every partition's results to output lines, preserving the
/// partition layout and the per-partition key order.
fn format_partitions<O>(
    outputs: &PartitionedOutput<O>,
    mut format: impl FnMut(&CompositeKey, &O, &mut Vec<String>),
) -> Vec<Vec<String>> {
    outputs
        .iter()
        .map(|results| {
            let mut lines = Vec::with_capacity(results.len());
            for (key, value) in results {
                format(key, value, &mut lines);
            }
            lines
        })
        .collect()
}
