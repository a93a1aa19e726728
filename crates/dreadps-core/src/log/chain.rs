//! Pointer-chain resolution for the combat log ring buffer.
//!
//! The ring buffer is a heap allocation whose address moves across loads and
//! zone transitions, but it is always reachable through a fixed chain of
//! pointer dereferences starting at the module base. Walking the chain costs
//! several round-trip reads, so the resolved address is cached and only
//! revalidated once its freshness window expires.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::timing::CHAIN_CACHE_VALIDITY;
use crate::error::{Error, Result};
use crate::offset::LogOffsets;
use crate::process::ReadMemory;

struct CachedAddress {
    address: u64,
    resolved_at: Instant,
}

/// Walks the offset chain to the combat log base address, with a
/// time-bounded cache of the result.
pub struct ChainResolver {
    steps: Vec<u64>,
    stride: u64,
    validity: Duration,
    cached: Option<CachedAddress>,
}

impl ChainResolver {
    pub fn new(offsets: &LogOffsets) -> Self {
        Self::with_validity(offsets, CHAIN_CACHE_VALIDITY)
    }

    /// Create a resolver with a custom cache freshness window.
    pub fn with_validity(offsets: &LogOffsets, validity: Duration) -> Self {
        Self {
            steps: offsets.steps().to_vec(),
            stride: offsets.stride(),
            validity,
            cached: None,
        }
    }

    /// Byte distance between consecutive ring buffer slots.
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Walk the full chain from the module base.
    ///
    /// A null or unreadable pointer at any step aborts the whole walk; a
    /// partially resolved chain is worthless because every later step would
    /// dereference garbage.
    pub fn resolve(&self, reader: &impl ReadMemory) -> Result<u64> {
        let mut current = reader.base_address();

        for (step, &offset) in self.steps.iter().enumerate() {
            let pointer =
                reader
                    .read_u64(current + offset)
                    .map_err(|e| Error::ChainReadFailed {
                        step,
                        offset,
                        message: e.to_string(),
                    })?;

            if pointer == 0 {
                return Err(Error::NullPointer { step, offset });
            }

            debug!(
                "Pointer at step {} (offset {:#x}): {:#018x}",
                step, offset, pointer
            );
            current = pointer;
        }

        Ok(current)
    }

    /// Return the cached combat log base address, re-walking the chain if the
    /// cache is empty or older than the freshness window.
    ///
    /// A failed re-resolution leaves the cache cleared; stale addresses are
    /// never served as a fallback.
    pub fn cached_address(&mut self, reader: &impl ReadMemory) -> Result<u64> {
        if let Some(cached) = &self.cached
            && cached.resolved_at.elapsed() <= self.validity
        {
            return Ok(cached.address);
        }

        self.cached = None;
        let address = self.resolve(reader)?;
        debug!("Updated cached combat log base address: {:#018x}", address);
        self.cached = Some(CachedAddress {
            address,
            resolved_at: Instant::now(),
        });

        Ok(address)
    }

    /// Drop the cached address, forcing a re-resolution on the next call.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
