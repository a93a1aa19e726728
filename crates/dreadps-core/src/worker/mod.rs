//! Deduplicating combat log poll loop.
//!
//! The ring buffer is re-read in full every cycle, so the same line is seen
//! hundreds of times. The worker keeps a seen-line set for the session,
//! dispatches only newly observed lines to the parser, and feeds the
//! aggregator. Failures inside a cycle are logged and absorbed with a longer
//! back-off; nothing past process acquisition is fatal.

use std::collections::HashSet;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::class::class_for_skill;
use crate::config::timing;
use crate::error::Result;
use crate::log::{ChainResolver, read_combat_log};
use crate::offset::LogOffsets;
use crate::parse::parse_combat_line;
use crate::process::ReadMemory;
use crate::stats::Aggregator;

/// Background capture loop: resolve, read, dedup, parse, aggregate.
pub struct CombatLogWorker {
    resolver: ChainResolver,
    slot_count: usize,
    poll_interval: Duration,
    error_backoff: Duration,
}

impl CombatLogWorker {
    pub fn new(offsets: &LogOffsets) -> Self {
        Self::with_intervals(
            offsets,
            timing::LOG_POLL_INTERVAL,
            timing::ERROR_BACKOFF,
        )
    }

    /// Create a worker with custom poll and back-off intervals.
    pub fn with_intervals(
        offsets: &LogOffsets,
        poll_interval: Duration,
        error_backoff: Duration,
    ) -> Self {
        Self {
            resolver: ChainResolver::new(offsets),
            slot_count: offsets.slot_count,
            poll_interval,
            error_backoff,
        }
    }

    /// Run until the stop channel fires or its sender is dropped.
    ///
    /// The wait between cycles is a timed receive on the stop channel, so
    /// shutdown interrupts the sleep instead of waiting out a full back-off.
    pub fn run(mut self, reader: &impl ReadMemory, aggregator: &Aggregator, stop: &Receiver<()>) {
        let mut session = Session::new(aggregator.generation());

        info!("Combat log worker started");

        loop {
            let wait = match self.cycle(reader, aggregator, &mut session) {
                Ok(dispatched) => {
                    if dispatched > 0 {
                        debug!("Dispatched {} new combat event(s)", dispatched);
                    }
                    self.poll_interval
                }
                Err(e) => {
                    warn!("Poll cycle failed, backing off: {}", e);
                    self.resolver.invalidate();
                    self.error_backoff
                }
            };

            match stop.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => continue,
                // Stop requested, or the controlling side went away
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        info!("Combat log worker stopped");
    }

    fn cycle(
        &mut self,
        reader: &impl ReadMemory,
        aggregator: &Aggregator,
        session: &mut Session,
    ) -> Result<usize> {
        let base = self.resolver.cached_address(reader)?;
        let lines = read_combat_log(reader, base, self.slot_count, self.resolver.stride());

        // Lines already in the buffer at startup, or left over from before a
        // stats reset, are history: mark them seen without dispatching.
        let generation = aggregator.generation();
        if !session.seeded || generation != session.generation {
            session.reseed(generation, &lines);
            return Ok(0);
        }

        let mut dispatched = 0;
        for line in &lines {
            let line = line.trim();
            if line.is_empty() || !session.seen.insert(line.to_string()) {
                continue;
            }

            if let Some(event) = parse_combat_line(line) {
                debug!(
                    "Parsed event: actor={}, skill={}, damage={}",
                    event.actor, event.skill, event.damage
                );
                aggregator.update(&event.actor, event.damage, event.critical);

                if let Some(class) = class_for_skill(&event.skill) {
                    aggregator.set_actor_class(&event.actor, class);
                }
                dispatched += 1;
            }
        }

        Ok(dispatched)
    }
}

/// Seen-line state for one polling session.
struct Session {
    seen: HashSet<String>,
    generation: u64,
    seeded: bool,
}

impl Session {
    fn new(generation: u64) -> Self {
        Self {
            seen: HashSet::new(),
            generation,
            seeded: false,
        }
    }

    fn reseed(&mut self, generation: u64, lines: &[String]) {
        self.seen.clear();
        self.seen.extend(
            lines
                .iter()
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        );
        self.generation = generation;
        self.seeded = true;
        debug!("Seeded seen-line set with {} line(s)", self.seen.len());
    }
}
