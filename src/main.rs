use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use threadbench::bench::BuiltinWorkload;
use threadbench::config::persistence::ReportWriter;
use threadbench::config::SweepConfig;
use threadbench::runner::run_builtin_sweep;
use threadbench::util::logging;
use threadbench::util::units::{format_elapsed, format_rate, format_speedup};
use threadbench::{error, Result, ThreadBenchError};

#[derive(Parser)]
#[command(name = "threadbench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scaling sweep of a built-in workload
    Run {
        /// Workload to measure (sleep or spin)
        #[arg(short, long, default_value = "sleep")]
        workload: String,
        /// Argument passed to every invocation
        #[arg(short, long, default_value_t = 1)]
        arg: u32,
        /// Worker count of each step, e.g. 1,2,4,8
        #[arg(long, value_delimiter = ',')]
        workers: Option<Vec<usize>>,
        /// Repetitions per worker of each step, e.g. 16,8,4,2
        #[arg(long, value_delimiter = ',')]
        repetitions: Option<Vec<usize>>,
        /// Samples collected per step
        #[arg(short, long)]
        samples: Option<usize>,
        /// Directory receiving the report file
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the results stored in a report file
    Show {
        /// Path to the report file
        file: PathBuf,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(logging::env_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dispatch(cli).await {
        tracing::error!(error = %e, "threadbench failed");
        eprintln!("{}", error::user_friendly_message(&e));
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config_path = SweepConfig::resolve_path(cli.config.as_deref())?;
    let config = SweepConfig::load_from(&config_path)?;

    match cli.command {
        Commands::Run {
            workload,
            arg,
            workers,
            repetitions,
            samples,
            output_dir,
        } => {
            let workload = BuiltinWorkload::from_name(&workload).ok_or_else(|| {
                ThreadBenchError::InvalidConfiguration(format!(
                    "Unknown workload '{}', expected sleep or spin",
                    workload
                ))
            })?;

            let mut config = config;
            if let Some(workers) = workers {
                config = config.with_worker_counts(workers);
            }
            if let Some(repetitions) = repetitions {
                config = config.with_repetitions(repetitions);
            }
            if let Some(samples) = samples {
                config = config.with_sample_count(samples);
            }
            if let Some(output_dir) = output_dir {
                config = config.with_output_dir(output_dir);
            }

            run(workload, arg, &config).await
        }
        Commands::Show { file } => show(&file),
        Commands::Config => {
            println!("# {}", config_path.display());
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

async fn run(workload: BuiltinWorkload, arg: u32, config: &SweepConfig) -> Result<()> {
    println!("{}: {}", workload.name(), workload.description());

    let start = Instant::now();
    let report = run_builtin_sweep(workload, arg, config).await?;
    let total = start.elapsed();

    for (result, speedup) in report.results.iter().zip(report.speedups()) {
        println!(
            "{} - {} - speedup {}",
            result.summary(),
            format_rate(result.throughput()),
            format_speedup(speedup)
        );
    }

    let path = ReportWriter::new(&config.output_dir).write(&report)?;
    println!(
        "\nSweep finished in {}, report written to {}",
        format_elapsed(total),
        path.display()
    );
    Ok(())
}

fn show(file: &std::path::Path) -> Result<()> {
    let results = ReportWriter::load(file)?;
    if results.is_empty() {
        println!("{} holds no results", file.display());
        return Ok(());
    }

    let baseline = results[0].mean;
    for result in &results {
        let speedup = if result.mean > 0.0 {
            baseline / result.mean
        } else {
            0.0
        };
        println!("{} - speedup {}", result.summary(), format_speedup(speedup));
    }
    Ok(())
}
