//! Core pipeline for the dreadps combat meter: open the game process, walk a
//! pointer chain to the in-memory combat log ring buffer, decode and dedup
//! the log lines, parse them into damage events, and aggregate per-actor
//! statistics for a presentation layer to render.

pub mod class;
pub mod config;
pub mod error;
pub mod log;
pub mod offset;
pub mod parse;
pub mod process;
pub mod stats;
pub mod worker;

pub use class::{CharacterClass, class_for_skill};
pub use error::{Error, Result};
pub use log::{ChainResolver, read_combat_log};
pub use offset::{LogOffsets, load_offsets, save_offsets};
pub use parse::{CombatEvent, SELF_IDENTITY, parse_combat_line};
pub use process::{MemoryReader, PROCESS_NAME, ProcessHandle, ReadMemory};
pub use stats::{ActorStats, Aggregator};
pub use worker::CombatLogWorker;
