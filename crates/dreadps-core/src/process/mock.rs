//! Mock memory reader for testing
//!
//! Provides a configurable mock implementation of the ReadMemory trait
//! that reads from an in-memory buffer instead of a real process.

use crate::error::{Error, Result};
use crate::process::ReadMemory;

/// Mock memory reader for testing
///
/// Reads from an in-memory buffer, allowing tests to verify pointer-chain
/// and log-capture logic without requiring access to a real process.
#[derive(Debug, Clone)]
pub struct MockMemoryReader {
    data: Vec<u8>,
    base: u64,
}

impl MockMemoryReader {
    /// Create a new mock reader with the given data at base address 0x1000
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, base: 0x1000 }
    }

    /// Create a new mock reader with custom base address
    pub fn with_base(data: Vec<u8>, base: u64) -> Self {
        Self { data, base }
    }

    /// Get the size of the underlying buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ReadMemory for MockMemoryReader {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        if address < self.base {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!("Address below base (base=0x{:X})", self.base),
            });
        }
        let offset = (address - self.base) as usize;
        if offset + size > self.data.len() {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!(
                    "Out of bounds: offset={}, size={}, len={}",
                    offset,
                    size,
                    self.data.len()
                ),
            });
        }
        Ok(self.data[offset..offset + size].to_vec())
    }

    fn base_address(&self) -> u64 {
        self.base
    }
}

/// Builder for creating test memory buffers
///
/// Provides a fluent API for laying out pointer chains and log ring buffers
/// for testing.
#[derive(Debug, Clone, Default)]
pub struct MockMemoryBuilder {
    data: Vec<u8>,
    base: u64,
}

impl MockMemoryBuilder {
    /// Create a new builder with default base address (0x1000)
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            base: 0x1000,
        }
    }

    /// Set the base address for the mock reader
    pub fn base(mut self, base: u64) -> Self {
        self.base = base;
        self
    }

    /// Pre-allocate buffer with zeros up to the specified size
    pub fn with_size(mut self, size: usize) -> Self {
        self.data.resize(size, 0);
        self
    }

    /// Write an unsigned 64-bit integer (a pointer) at the specified offset from base
    pub fn write_u64(mut self, offset: usize, value: u64) -> Self {
        self.ensure_size(offset + 8);
        self.data[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
        self
    }

    /// Write raw bytes at the specified offset from base
    pub fn write_bytes(mut self, offset: usize, bytes: &[u8]) -> Self {
        self.ensure_size(offset + bytes.len());
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    /// Write a double-null-terminated UTF-16LE string at the specified offset
    pub fn write_utf16(mut self, offset: usize, text: &str) -> Self {
        let bytes: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        self.ensure_size(offset + bytes.len() + 2);
        self.data[offset..offset + bytes.len()].copy_from_slice(&bytes);
        self.data[offset + bytes.len()] = 0; // null code unit terminator
        self.data[offset + bytes.len() + 1] = 0;
        self
    }

    /// Build the MockMemoryReader
    pub fn build(self) -> MockMemoryReader {
        MockMemoryReader {
            data: self.data,
            base: self.base,
        }
    }

    fn ensure_size(&mut self, required: usize) {
        if self.data.len() < required {
            self.data.resize(required, 0);
        }
    }
}
