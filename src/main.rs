//! Dining philosophers simulator CLI.
//!
//! ```text
//! philosophers number_of_philosophers time_to_die time_to_eat time_to_sleep [number_of_times_each_philosopher_must_eat]
//! ```
//!
//! The event stream goes to stdout; diagnostics go to stderr.

use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use philosophers::{Config, Coordinator, Journal, LogWriter, Subscribe, Verdict};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber, filter::LevelFilter};

#[derive(Parser, Debug)]
#[command(name = "philosophers")]
#[command(about = "Simulate the dining philosophers problem", long_about = None)]
struct Args {
    /// Number of philosophers (and forks) at the table
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    number_of_philosophers: u64,

    /// Milliseconds a philosopher survives after the start of its last meal
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    time_to_die: u64,

    /// Milliseconds a meal lasts
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    time_to_eat: u64,

    /// Milliseconds a philosopher sleeps after eating
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    time_to_sleep: u64,

    /// Stop once every philosopher has eaten this many times
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    number_of_times_each_philosopher_must_eat: Option<u32>,

    /// Print the event stream without colors
    #[arg(long)]
    no_color: bool,

    /// Verbose diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print meal counts and the verdict to stderr after the run
    #[arg(long)]
    summary: bool,
}

impl Args {
    fn config(&self) -> anyhow::Result<Config> {
        let mut cfg = Config::new(
            usize::try_from(self.number_of_philosophers)?,
            self.time_to_die,
            self.time_to_eat,
            self.time_to_sleep,
        );
        cfg.must_eat = self.number_of_times_each_philosopher_must_eat;
        if let Err(e) = cfg.validate() {
            tracing::error!(label = e.as_label(), error = %e, "invalid arguments");
            return Err(e.into());
        }
        Ok(cfg)
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let level = if args.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cfg = args.config()?;
    let journal = Arc::new(Journal::new());
    let subscribers: Vec<Arc<dyn Subscribe>> = vec![
        Arc::new(LogWriter::new().with_color(!args.no_color)),
        journal.clone(),
    ];

    let outcome = match Coordinator::builder(cfg)
        .with_subscribers(subscribers)
        .build()
        .run()
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(label = e.as_label(), error = %e, "run failed");
            return Err(e.into());
        }
    };
    info!(verdict = ?outcome.verdict, elapsed = ?outcome.elapsed, events = outcome.events, "run finished");

    if args.summary {
        let started = journal.meals_started().await;
        for (i, meals) in outcome.meals.iter().enumerate() {
            let id = i + 1;
            eprintln!(
                "philosopher {id}: {meals} meals eaten, {} started",
                started.get(&id).copied().unwrap_or(0)
            );
        }
        match outcome.verdict {
            Verdict::AllFed => eprintln!("every philosopher ate enough"),
            Verdict::Starved { philosopher, at_ms } => {
                eprintln!("philosopher {philosopher} starved at {at_ms}ms")
            }
            Verdict::Interrupted => eprintln!("interrupted"),
        }
    }

    Ok(match outcome.verdict {
        Verdict::Interrupted => ExitCode::from(130),
        _ => ExitCode::SUCCESS,
    })
}
