#![warn(clippy::pedantic)]

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{OptionExt, WrapErr};
use env_logger::TimestampPrecision;
use itertools::Itertools;
use log::LevelFilter;
use sq1_shape::{Metric, ShapeSpace};

/// Inspects the shape space of the Square-1
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print how many shape states lie at each distance from a cube shape
    Stats {
        /// Only report this metric
        #[arg(long, short)]
        metric: Option<MetricArg>,
    },
    /// Look up the distance and an optimal shape solution of one state
    Lookup {
        /// The top layer as a 12-bit corner mask, in hex (0x...) or decimal
        #[arg(value_parser = parse_layer)]
        top: u32,
        /// The bottom layer as a 12-bit corner mask, in hex (0x...) or decimal
        #[arg(value_parser = parse_layer)]
        bottom: u32,
        /// The parity bit, 0 or 1
        parity: u8,
        #[arg(long, short, default_value = "face-turn")]
        metric: MetricArg,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum MetricArg {
    FaceTurn,
    Combined,
}

impl From<MetricArg> for Metric {
    fn from(metric: MetricArg) -> Self {
        match metric {
            MetricArg::FaceTurn => Metric::FaceTurn,
            MetricArg::Combined => Metric::Combined,
        }
    }
}

fn parse_layer(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("{s:?} is not a layer mask: {e}"))
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let shape_space = sq1_shape::initialize().wrap_err("Could not build the shape tables")?;

    match cli.command {
        Commands::Stats { metric } => {
            let metrics = match metric {
                Some(metric) => vec![metric.into()],
                None => Metric::ALL.to_vec(),
            };
            for metric in metrics {
                print_stats(shape_space, metric);
            }
        }
        Commands::Lookup {
            top,
            bottom,
            parity,
            metric,
        } => {
            let metric = metric.into();
            let index = shape_space.encode(top, bottom, parity)?;
            println!("State:       {index} ({})", shape_space.decode(index));
            println!(
                "Distance:    {} ({metric})",
                shape_space.pruning_lower_bound(index, metric)
            );
            let solution = shape_space
                .solve_shape(index, metric)
                .ok_or_eyre("The pruning table has no descending path from this state")?;
            if solution.is_empty() {
                println!("Solution:    already a cube shape");
            } else {
                println!("Solution:    {}", solution.iter().join(" "));
            }
        }
    }

    Ok(())
}

fn print_stats(shape_space: &ShapeSpace, metric: Metric) {
    let table = shape_space.pruning_table(metric);
    println!("{metric} metric, maximum distance {}", table.max_depth());
    for (depth, count) in table.depth_histogram().into_iter().enumerate() {
        println!("{depth:>4}: {count}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layer() {
        assert_eq!(parse_layer("0xdb6"), Ok(0xdb6));
        assert_eq!(parse_layer("0X6DB"), Ok(0x6db));
        assert_eq!(parse_layer("1755"), Ok(1755));
        assert!(parse_layer("cube").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli =
            Cli::try_parse_from(["sq1-shape", "-vv", "lookup", "0xdb6", "0x6db", "0"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Lookup {
                top: 0xdb6,
                bottom: 0x6db,
                parity: 0,
                metric: MetricArg::FaceTurn
            }
        ));
    }
}
