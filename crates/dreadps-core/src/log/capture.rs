//! Combat log ring buffer capture.
//!
//! Each slot of the ring buffer holds a pointer to a UTF-16 line, written
//! asynchronously by the game with no lock the reader could take. Any slot
//! may be null, stale, or mid-overwrite at read time, so every per-slot
//! failure degrades to an empty line instead of aborting the capture.

use tracing::trace;

use crate::config::capture::LOG_TEXT_READ_SIZE;
use crate::process::ReadMemory;

/// Read every slot of the combat log ring buffer.
///
/// Always returns exactly `slot_count` lines in slot order. Unpopulated or
/// unreadable slots come back as empty strings; populated ones are decoded
/// and truncated at the sentence boundary.
pub fn read_combat_log(
    reader: &impl ReadMemory,
    base_address: u64,
    slot_count: usize,
    stride: u64,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(slot_count);

    for i in 0..slot_count {
        let slot_address = base_address + i as u64 * stride;

        let entry_ptr = match reader.read_u64(slot_address) {
            Ok(ptr) => ptr,
            Err(e) => {
                trace!("Slot {} pointer unreadable: {}", i, e);
                lines.push(String::new());
                continue;
            }
        };

        if entry_ptr == 0 {
            lines.push(String::new());
            continue;
        }

        match reader.read_string_utf16(entry_ptr, LOG_TEXT_READ_SIZE) {
            Ok(text) => lines.push(truncate_sentence(&text)),
            Err(e) => {
                trace!("Slot {} payload unreadable: {}", i, e);
                lines.push(String::new());
            }
        }
    }

    lines
}

/// Cut a decoded line at the first period, inclusive.
///
/// Log sentences are period-terminated; anything beyond that is leftover
/// heap content from the fixed-size over-read.
fn truncate_sentence(line: &str) -> String {
    match line.find('.') {
        Some(idx) => line[..=idx].to_string(),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::capture::LOG_SLOT_COUNT;
    use crate::process::{MockMemoryBuilder, MockMemoryReader};

    const RING: usize = 0x100;
    const TEXT: usize = 0x800;
    const STRIDE: u64 = 8;

    /// Ring at base+0x100, payloads from base+0x800 onwards.
    fn populated_memory(lines: &[&str]) -> MockMemoryReader {
        let mut builder = MockMemoryBuilder::new().base(0x1000).with_size(0x10000);
        for (i, line) in lines.iter().enumerate() {
            let text_offset = TEXT + i * 0x400;
            builder = builder
                .write_u64(RING + i * STRIDE as usize, 0x1000 + text_offset as u64)
                .write_utf16(text_offset, line);
        }
        builder.build()
    }

    #[test]
    fn test_empty_buffer_yields_slot_count_lines() {
        let reader = MockMemoryBuilder::new().with_size(0x10000).build();
        let lines = read_combat_log(&reader, 0x1000 + RING as u64, 16, STRIDE);

        assert_eq!(lines.len(), 16);
        assert!(lines.iter().all(String::is_empty));
    }

    #[test]
    fn test_single_populated_slot() {
        let reader = populated_memory(&["Received 10 damage from Bob&apos;s Smite."]);
        let lines = read_combat_log(&reader, 0x1000 + RING as u64, 16, STRIDE);

        assert_eq!(lines.len(), 16);
        assert_eq!(lines[0], "Received 10 damage from Bob&apos;s Smite.");
        assert!(lines[1..].iter().all(String::is_empty));
    }

    #[test]
    fn test_fully_populated_buffer() {
        let texts: Vec<String> = (0..16).map(|i| format!("Line number {i}.")).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let reader = populated_memory(&refs);

        let lines = read_combat_log(&reader, 0x1000 + RING as u64, 16, STRIDE);
        assert_eq!(lines.len(), 16);
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(line, &format!("Line number {i}."));
        }
    }

    #[test]
    fn test_sentence_truncation_discards_tail() {
        let reader = populated_memory(&["Typhoon hit Dummy for 55 damage. leftover garbage"]);
        let lines = read_combat_log(&reader, 0x1000 + RING as u64, 1, STRIDE);

        assert_eq!(lines[0], "Typhoon hit Dummy for 55 damage.");
    }

    #[test]
    fn test_dangling_slot_pointer_recovers_as_empty() {
        // Slot 0 points outside mapped memory, slot 1 is fine
        let reader = MockMemoryBuilder::new()
            .with_size(0x10000)
            .write_u64(RING, 0xDEAD0000)
            .write_u64(RING + STRIDE as usize, 0x1000 + TEXT as u64)
            .write_utf16(TEXT, "Still here.")
            .build();

        let lines = read_combat_log(&reader, 0x1000 + RING as u64, 2, STRIDE);
        assert_eq!(lines, vec!["".to_string(), "Still here.".to_string()]);
    }

    #[test]
    fn test_unreadable_slot_recovers_as_empty() {
        // Ring extends past the mapped region; the tail slots fail the pointer read
        let reader = MockMemoryBuilder::new().with_size(RING + 8).build();
        let lines = read_combat_log(&reader, 0x1000 + RING as u64, 4, STRIDE);

        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(String::is_empty));
    }

    #[test]
    fn test_full_slot_count() {
        let ring_bytes = LOG_SLOT_COUNT * STRIDE as usize;
        let reader = MockMemoryBuilder::new()
            .with_size(RING + ring_bytes)
            .build();

        let lines = read_combat_log(&reader, 0x1000 + RING as u64, LOG_SLOT_COUNT, STRIDE);
        assert_eq!(lines.len(), LOG_SLOT_COUNT);
    }

    #[test]
    fn test_truncate_sentence() {
        assert_eq!(truncate_sentence("Hello. world"), "Hello.");
        assert_eq!(truncate_sentence("no period"), "no period");
        assert_eq!(truncate_sentence(""), "");
    }
}
