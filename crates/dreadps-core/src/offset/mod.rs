//! Combat log offset chain configuration.
//!
//! The pointer chain and slot count are reverse-engineered from one specific
//! game build and are expected to break on updates, so they are loaded from
//! an external text file with compiled-in defaults for the known build.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Offsets describing the combat log ring buffer location.
///
/// The chain is walked from the module base: every offset except the last is
/// an 8-byte pointer dereference. The final element is the per-slot stride of
/// the ring buffer and is never dereferenced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogOffsets {
    pub version: String,
    pub chain: Vec<u64>,
    pub slot_count: usize,
}

impl Default for LogOffsets {
    fn default() -> Self {
        Self {
            version: "BNSR:LIVE:2025022600".to_string(),
            chain: vec![0x7485118, 0xA0, 0x670, 0x8],
            slot_count: crate::config::capture::LOG_SLOT_COUNT,
        }
    }
}

impl LogOffsets {
    /// The dereference steps of the chain (everything but the stride).
    pub fn steps(&self) -> &[u64] {
        &self.chain[..self.chain.len().saturating_sub(1)]
    }

    /// Byte distance between consecutive ring buffer slots.
    pub fn stride(&self) -> u64 {
        self.chain.last().copied().unwrap_or(0)
    }

    /// Check that the chain is usable: at least one dereference step plus
    /// the stride, a non-zero module offset, and a non-zero stride.
    pub fn is_valid(&self) -> bool {
        self.chain.len() >= 2 && self.chain[0] != 0 && self.stride() != 0 && self.slot_count != 0
    }
}

pub fn load_offsets<P: AsRef<Path>>(path: P) -> Result<LogOffsets> {
    let content = fs::read_to_string(&path)?;
    parse_offsets(&content)
}

pub fn save_offsets<P: AsRef<Path>>(path: P, offsets: &LogOffsets) -> Result<()> {
    let content = format_offsets(offsets);
    fs::write(path, content)?;
    Ok(())
}

fn parse_offsets(content: &str) -> Result<LogOffsets> {
    let mut offsets = LogOffsets::default();
    let mut lines = content.lines();

    // First line is the game build tag
    if let Some(version) = lines.next() {
        offsets.version = version.trim().to_string();
    }

    // Parse key = value pairs
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "chain" => {
                    offsets.chain = value
                        .split(',')
                        .map(|v| parse_hex_value(v.trim()))
                        .collect::<Result<Vec<u64>>>()?;
                }
                "slotcount" => {
                    offsets.slot_count = value.parse().map_err(|e| {
                        Error::InvalidOffset(format!("Failed to parse slot count '{value}': {e}"))
                    })?;
                }
                _ => {
                    warn!("Unknown offset key: '{}' (value: {})", key, value);
                }
            }
        }
    }

    if !offsets.is_valid() {
        return Err(Error::InvalidOffset(
            "Offset chain needs at least one dereference step and a stride".to_string(),
        ));
    }

    Ok(offsets)
}

fn parse_hex_value(value: &str) -> Result<u64> {
    let value = value.trim();
    let value = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    u64::from_str_radix(value, 16)
        .map_err(|e| Error::InvalidOffset(format!("Failed to parse '{value}': {e}")))
}

fn format_offsets(offsets: &LogOffsets) -> String {
    let chain = offsets
        .chain
        .iter()
        .map(|o| format!("{o:#x}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{}\nchain = {}\nslotCount = {}",
        offsets.version, chain, offsets.slot_count
    )
}
