use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use dreadps_core::{
    Aggregator, CombatLogWorker, Error, LogOffsets, MemoryReader, PROCESS_NAME, ProcessHandle,
    load_offsets,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dreadps")]
#[command(about = "Live combat log damage meter", version)]
struct Args {
    /// Path to offsets file
    #[arg(short, long, default_value = "offsets.txt")]
    offsets: PathBuf,

    /// Combat log poll interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Print the final statistics snapshot as JSON on exit
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("dreadps=info".parse()?)
                .add_directive("dreadps_core=info".parse()?),
        )
        .init();

    let args = Args::parse();

    info!("dreadps starting...");

    let offsets = match load_offsets(&args.offsets) {
        Ok(o) => {
            info!("Loaded offsets version: {}", o.version);
            o
        }
        Err(e) => {
            warn!("Failed to load offsets: {}, using defaults", e);
            LogOffsets::default()
        }
    };

    // Process acquisition is the one fatal failure: without a target there is
    // nothing to poll.
    let process = match ProcessHandle::find_and_open() {
        Ok(p) => {
            info!(
                "Found {} (PID {}, base {:#x})",
                PROCESS_NAME, p.pid, p.base_address
            );
            p
        }
        Err(e @ Error::AccessDenied(_)) => {
            error!("{e}. Try running from an elevated prompt.");
            std::process::exit(1);
        }
        Err(e) => {
            error!("{e}. Start the game before launching the meter.");
            std::process::exit(1);
        }
    };

    let aggregator = Arc::new(Aggregator::new());
    let (stop_tx, stop_rx) = mpsc::channel();
    let shutting_down = Arc::new(AtomicBool::new(false));

    let loop_stop_tx = stop_tx.clone();
    {
        let shutting_down = Arc::clone(&shutting_down);
        ctrlc::set_handler(move || {
            shutting_down.store(true, Ordering::SeqCst);
            let _ = stop_tx.send(());
        })?;
    }

    let worker = CombatLogWorker::with_intervals(
        &offsets,
        Duration::from_millis(args.poll_interval_ms),
        dreadps_core::config::timing::ERROR_BACKOFF,
    );

    thread::scope(|scope| {
        let reader = MemoryReader::new(&process);
        let worker_aggregator = Arc::clone(&aggregator);
        scope.spawn(move || worker.run(&reader, &worker_aggregator, &stop_rx));

        while !shutting_down.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_secs(1));
            if !process.is_alive() {
                warn!("{} exited, shutting down", PROCESS_NAME);
                break;
            }
            if !shutting_down.load(Ordering::SeqCst) {
                render_stats(&aggregator);
            }
        }
        let _ = loop_stop_tx.send(());
    });

    if args.json {
        let stats = aggregator.get_stats();
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }

    info!("Exiting combat log meter");
    Ok(())
}

/// Print the damage table, highest contributor first.
fn render_stats(aggregator: &Aggregator) {
    let stats = aggregator.get_stats();
    let Some(origin) = aggregator.global_start_time() else {
        return;
    };
    if stats.is_empty() {
        return;
    }

    let now = Utc::now();
    let mut rows: Vec<_> = stats.into_iter().collect();
    rows.sort_by(|a, b| b.1.total_damage.cmp(&a.1.total_damage));

    println!(
        "{:<20} {:>12} {:>10} {:>6} {:>7} {:>12}  {}",
        "Actor", "Damage", "DPS", "Hits", "Crit%", "Highest", "Class"
    );
    for (name, s) in rows {
        println!(
            "{:<20} {:>12} {:>10.1} {:>6} {:>6.1}% {:>12}  {}",
            name,
            s.total_damage,
            s.damage_per_second(origin, now),
            s.events,
            s.crit_rate(),
            s.highest_hit,
            s.class
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    println!();
}
