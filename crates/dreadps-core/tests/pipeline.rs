//! End-to-end pipeline tests against mock process memory.
//!
//! These lay out a full pointer chain and log ring buffer in a mock memory
//! region and drive the capture pipeline the way the real worker thread does,
//! including live buffer changes via a swappable reader.

use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use dreadps_core::process::{MockMemoryBuilder, MockMemoryReader};
use dreadps_core::{
    Aggregator, ChainResolver, CharacterClass, CombatLogWorker, LogOffsets, ReadMemory,
    class_for_skill, parse_combat_line, read_combat_log,
};

const BASE: u64 = 0x10000;
const RING: u64 = 0x5000;
const TEXT: u64 = 0x8000;

fn offsets() -> LogOffsets {
    LogOffsets {
        version: "TEST".to_string(),
        chain: vec![0x100, 0x20, 0x8],
        slot_count: 8,
    }
}

/// Chain: [BASE+0x100] -> BASE+0x3000, [BASE+0x3000+0x20] -> BASE+RING.
fn memory_with_lines(lines: &[&str]) -> MockMemoryReader {
    let mut builder = MockMemoryBuilder::new()
        .base(BASE)
        .with_size(0x10000)
        .write_u64(0x100, BASE + 0x3000)
        .write_u64(0x3000 + 0x20, BASE + RING);

    for (i, line) in lines.iter().enumerate() {
        builder = builder
            .write_u64(RING as usize + i * 8, BASE + TEXT + i as u64 * 0x400)
            .write_utf16(TEXT as usize + i * 0x400, line);
    }
    builder.build()
}

/// Same layout but with the second chain step left null.
fn memory_with_broken_chain() -> MockMemoryReader {
    MockMemoryBuilder::new()
        .base(BASE)
        .with_size(0x10000)
        .write_u64(0x100, BASE + 0x3000)
        .build()
}

/// Reader whose backing buffer can be replaced while a worker polls it,
/// standing in for the game overwriting ring slots between reads.
struct SwappableReader {
    inner: Mutex<MockMemoryReader>,
}

impl SwappableReader {
    fn new(initial: MockMemoryReader) -> Self {
        Self {
            inner: Mutex::new(initial),
        }
    }

    fn swap(&self, next: MockMemoryReader) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

impl ReadMemory for SwappableReader {
    fn read_bytes(&self, address: u64, size: usize) -> dreadps_core::Result<Vec<u8>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .read_bytes(address, size)
    }

    fn base_address(&self) -> u64 {
        BASE
    }
}

fn wait_for(condition: impl Fn() -> bool, what: &str) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("Timed out waiting for {what}");
}

#[test]
fn test_full_pipeline_from_mock_memory() {
    let lines = [
        "You received 1,234 Critical Damage from Bob&apos;s Typhoon.",
        "Smite hit Bob for 500 damage.",
        "The wind howls over the Cinderlands.",
    ];
    let reader = memory_with_lines(&lines);
    let offsets = offsets();

    let resolver = ChainResolver::new(&offsets);
    let ring = resolver.resolve(&reader).unwrap();
    assert_eq!(ring, BASE + RING);

    let captured = read_combat_log(&reader, ring, offsets.slot_count, resolver.stride());
    assert_eq!(captured.len(), offsets.slot_count);

    let aggregator = Aggregator::new();
    for line in &captured {
        let line = line.trim();
        if let Some(event) = parse_combat_line(line) {
            aggregator.update(&event.actor, event.damage, event.critical);
            if let Some(class) = class_for_skill(&event.skill) {
                aggregator.set_actor_class(&event.actor, class);
            }
        }
    }

    let stats = aggregator.get_stats();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats["Bob"].total_damage, 1234);
    assert_eq!(stats["Bob"].crit_events, 1);
    assert_eq!(stats["Bob"].class, Some(CharacterClass::Destroyer));
    assert_eq!(stats["You"].total_damage, 500);
    assert_eq!(stats["You"].class, Some(CharacterClass::KungFuMaster));
}

#[test]
fn test_worker_seeds_dedups_and_stops() {
    let offsets = offsets();
    let reader = Arc::new(SwappableReader::new(memory_with_lines(&[
        "Smite hit Bob for 10 damage.",
    ])));
    let aggregator = Arc::new(Aggregator::new());
    let (stop_tx, stop_rx) = mpsc::channel();

    let worker = CombatLogWorker::with_intervals(
        &offsets,
        Duration::from_millis(2),
        Duration::from_millis(5),
    );
    let handle = {
        let reader = Arc::clone(&reader);
        let aggregator = Arc::clone(&aggregator);
        thread::spawn(move || worker.run(&*reader, &aggregator, &stop_rx))
    };

    // Lines present at startup are seeded, never replayed as events
    thread::sleep(Duration::from_millis(50));
    assert!(aggregator.get_stats().is_empty());

    // A new line lands in the buffer alongside the old one
    reader.swap(memory_with_lines(&[
        "Smite hit Bob for 10 damage.",
        "Flicker critically hit Bob for 2,000 damage.",
    ]));
    wait_for(
        || aggregator.get_stats().contains_key("You"),
        "the new line to be dispatched",
    );

    // Give the worker plenty of extra cycles to prove dedup holds
    thread::sleep(Duration::from_millis(50));
    let stats = aggregator.get_stats();
    assert_eq!(stats["You"].events, 1);
    assert_eq!(stats["You"].total_damage, 2000);
    assert_eq!(stats["You"].crit_events, 1);
    assert_eq!(stats["You"].class, Some(CharacterClass::BladeDancer));

    stop_tx.send(()).unwrap();
    handle.join().unwrap();
}

#[test]
fn test_worker_recovers_from_chain_failure() {
    let offsets = offsets();
    let reader = Arc::new(SwappableReader::new(memory_with_broken_chain()));
    let aggregator = Arc::new(Aggregator::new());
    let (stop_tx, stop_rx) = mpsc::channel();

    let worker = CombatLogWorker::with_intervals(
        &offsets,
        Duration::from_millis(2),
        Duration::from_millis(5),
    );
    let handle = {
        let reader = Arc::clone(&reader);
        let aggregator = Arc::clone(&aggregator);
        thread::spawn(move || worker.run(&*reader, &aggregator, &stop_rx))
    };

    // Every cycle fails while the chain is broken
    thread::sleep(Duration::from_millis(50));
    assert!(aggregator.get_stats().is_empty());

    // Chain comes back (zone load finished); first good read seeds
    reader.swap(memory_with_lines(&["Smite hit Bob for 10 damage."]));
    thread::sleep(Duration::from_millis(100));
    assert!(aggregator.get_stats().is_empty());

    reader.swap(memory_with_lines(&[
        "Smite hit Bob for 10 damage.",
        "Typhoon hit Bob for 77 damage.",
    ]));
    wait_for(
        || aggregator.get_stats().contains_key("You"),
        "dispatch after chain recovery",
    );

    let stats = aggregator.get_stats();
    assert_eq!(stats["You"].total_damage, 77);

    stop_tx.send(()).unwrap();
    handle.join().unwrap();
}

#[test]
fn test_stats_reset_reseeds_seen_lines() {
    let offsets = offsets();
    let reader = Arc::new(SwappableReader::new(memory_with_lines(&[
        "Smite hit Bob for 10 damage.",
    ])));
    let aggregator = Arc::new(Aggregator::new());
    let (stop_tx, stop_rx) = mpsc::channel();

    let worker = CombatLogWorker::with_intervals(
        &offsets,
        Duration::from_millis(2),
        Duration::from_millis(5),
    );
    let handle = {
        let reader = Arc::clone(&reader);
        let aggregator = Arc::clone(&aggregator);
        thread::spawn(move || worker.run(&*reader, &aggregator, &stop_rx))
    };

    // Let the worker seed from the initial buffer before changing it
    thread::sleep(Duration::from_millis(50));

    reader.swap(memory_with_lines(&[
        "Smite hit Bob for 10 damage.",
        "Typhoon hit Bob for 100 damage.",
    ]));
    wait_for(
        || aggregator.get_stats().contains_key("You"),
        "pre-reset dispatch",
    );

    aggregator.reset();
    // Let the worker observe the reset and reseed from the current buffer
    thread::sleep(Duration::from_millis(100));
    assert!(aggregator.get_stats().is_empty());

    reader.swap(memory_with_lines(&[
        "Smite hit Bob for 10 damage.",
        "Typhoon hit Bob for 100 damage.",
        "Flicker hit Bob for 7 damage.",
    ]));
    wait_for(
        || aggregator.get_stats().contains_key("You"),
        "post-reset dispatch",
    );

    let stats = aggregator.get_stats();
    assert_eq!(stats["You"].events, 1);
    assert_eq!(stats["You"].total_damage, 7);

    stop_tx.send(()).unwrap();
    handle.join().unwrap();
}

#[test]
fn test_dropped_stop_sender_terminates_worker() {
    let offsets = offsets();
    let reader = memory_with_lines(&[]);
    let aggregator = Aggregator::new();
    let (stop_tx, stop_rx) = mpsc::channel::<()>();

    let worker = CombatLogWorker::with_intervals(
        &offsets,
        Duration::from_millis(2),
        Duration::from_millis(5),
    );

    drop(stop_tx);
    // Returns promptly instead of polling forever
    worker.run(&reader, &aggregator, &stop_rx);
}
