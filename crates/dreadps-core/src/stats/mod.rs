//! Per-actor damage statistics.
//!
//! One producer (the poll loop) and one consumer (the presentation layer)
//! share the aggregator. The internal lock is held only for map mutation or
//! snapshot copying, never across memory reads or parsing.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::class::CharacterClass;

/// Accumulated statistics for one actor since the last reset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorStats {
    pub total_damage: u64,
    pub events: u32,
    pub crit_events: u32,
    pub highest_hit: u64,
    pub class: Option<CharacterClass>,
    pub start_time: DateTime<Utc>,
}

impl ActorStats {
    fn first_event(damage: u64, critical: bool, now: DateTime<Utc>) -> Self {
        Self {
            total_damage: damage,
            events: 1,
            crit_events: if critical { 1 } else { 0 },
            highest_hit: damage,
            class: None,
            start_time: now,
        }
    }

    /// Zeroed record for an actor known only by class so far.
    fn unseen(now: DateTime<Utc>) -> Self {
        Self {
            total_damage: 0,
            events: 0,
            crit_events: 0,
            highest_hit: 0,
            class: None,
            start_time: now,
        }
    }

    /// Fraction of events that were critical, as a percentage.
    pub fn crit_rate(&self) -> f64 {
        if self.events == 0 {
            0.0
        } else {
            f64::from(self.crit_events) * 100.0 / f64::from(self.events)
        }
    }

    /// Damage per second measured from the session origin.
    pub fn damage_per_second(&self, origin: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let elapsed = (now - origin).num_milliseconds() as f64 / 1000.0;
        if elapsed <= 0.0 {
            return self.total_damage as f64;
        }
        self.total_damage as f64 / elapsed
    }
}

#[derive(Debug, Default)]
struct AggregatorState {
    actors: HashMap<String, ActorStats>,
    global_start_time: Option<DateTime<Utc>>,
    generation: u64,
}

/// Thread-safe accumulator of per-actor damage statistics.
///
/// The session origin (`global_start_time`) is set by the first damage event
/// after a reset, not by process start, so idle time before combat does not
/// dilute damage-per-second figures.
#[derive(Debug, Default)]
pub struct Aggregator {
    state: Mutex<AggregatorState>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one damage event for `actor`.
    pub fn update(&self, actor: &str, damage: u64, critical: bool) {
        let now = Utc::now();
        let mut state = self.lock();

        if state.global_start_time.is_none() {
            state.global_start_time = Some(now);
        }

        match state.actors.entry(actor.to_string()) {
            Entry::Occupied(mut entry) => {
                let stats = entry.get_mut();
                stats.total_damage += damage;
                stats.events += 1;
                if critical {
                    stats.crit_events += 1;
                }
                if damage > stats.highest_hit {
                    stats.highest_hit = damage;
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(ActorStats::first_event(damage, critical, now));
            }
        }
    }

    /// Attribute a class to `actor`, creating a zeroed record if needed.
    ///
    /// Never touches existing damage counters.
    pub fn set_actor_class(&self, actor: &str, class: CharacterClass) {
        let now = Utc::now();
        let mut state = self.lock();

        state
            .actors
            .entry(actor.to_string())
            .or_insert_with(|| ActorStats::unseen(now))
            .class = Some(class);
    }

    /// Point-in-time copy of all actor statistics.
    pub fn get_stats(&self) -> HashMap<String, ActorStats> {
        self.lock().actors.clone()
    }

    /// Timestamp of the first damage event since the last reset.
    pub fn global_start_time(&self) -> Option<DateTime<Utc>> {
        self.lock().global_start_time
    }

    /// Clear all statistics and the session origin atomically.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.actors.clear();
        state.global_start_time = None;
        state.generation += 1;
    }

    /// Reset counter, bumped once per `reset()`.
    ///
    /// The poll loop watches this to know when its seen-line set must be
    /// rebuilt alongside the cleared statistics.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AggregatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
