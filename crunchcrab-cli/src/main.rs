use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crunchcrab_core::pipeline::{EngineConfig, JobReport};
use crunchcrab_sales::jobs;

#[derive(Parser, Debug)]
#[command(name = "crunchcrab")]
#[command(about = "Grouped sales statistics over a local map/reduce driver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct JobArgs {
    /// Input sales export (comma-delimited).
    #[arg(long)]
    input: PathBuf,
    /// Base path for the output directory; each job appends its suffix.
    #[arg(long)]
    output: PathBuf,
    /// Parallel map workers.
    #[arg(long, default_value_t = 4)]
    map_tasks: usize,
    /// Reduce partitions.
    #[arg(long, default_value_t = 4)]
    reduce_tasks: usize,
    /// Disable worker-local combining before the shuffle.
    #[arg(long)]
    no_local_combine: bool,
}

impl JobArgs {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            map_tasks: self.map_tasks,
            reduce_tasks: self.reduce_tasks,
            local_combine: !self.no_local_combine,
            ..EngineConfig::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Average unit price by (country, item type, year).
    AvgUnitPrice {
        #[command(flatten)]
        args: JobArgs,
    },
    /// Total units sold by (country, item type, year).
    UnitsSold {
        #[command(flatten)]
        args: JobArgs,
    },
    /// Smallest and largest units sold by (country, item type, year).
    UnitsRange {
        #[command(flatten)]
        args: JobArgs,
    },
    /// Top orders by total profit per year.
    TopProfit {
        #[command(flatten)]
        args: JobArgs,
        /// How many orders to retain per year.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Run all four jobs against the same input and output base.
    All {
        #[command(flatten)]
        args: JobArgs,
        /// How many orders to retain per year.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn print_report(job: &str, report: &JobReport) {
    println!(
        "{}: {} records aggregated, {} skipped, {} keys failed",
        job, report.records_read, report.records_skipped, report.keys_failed
    );
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::AvgUnitPrice { args } => {
            let report = jobs::average_unit_price(&args.input, &args.output, &args.engine_config())?;
            print_report("avg-unit-price", &report);
        }
        Commands::UnitsSold { args } => {
            let report = jobs::total_units_sold(&args.input, &args.output, &args.engine_config())?;
            print_report("units-sold", &report);
        }
        Commands::UnitsRange { args } => {
            let report = jobs::units_sold_range(&args.input, &args.output, &args.engine_config())?;
            print_report("units-range", &report);
        }
        Commands::TopProfit { args, top } => {
            let report =
                jobs::top_profit_orders(&args.input, &args.output, &args.engine_config(), top)?;
            print_report("top-profit", &report);
        }
        Commands::All { args, top } => {
            let config = args.engine_config();
            let report = jobs::average_unit_price(&args.input, &args.output, &config)?;
            print_report("avg-unit-price", &report);
            let report = jobs::total_units_sold(&args.input, &args.output, &config)?;
            print_report("units-sold", &report);
            let report = jobs::units_sold_range(&args.input, &args.output, &config)?;
            print_report("units-range", &report);
            let report = jobs::top_profit_orders(&args.input, &args.output, &config, top)?;
            print_report("top-profit", &report);
        }
    }

    Ok(())
}
