//! UTF-16 payload decoding for combat log entries.

/// Decode a little-endian UTF-16 buffer, stopping at the first aligned
/// double-null code unit.
///
/// Log entries are over-read as fixed-size blocks, so anything past the
/// terminator is unrelated heap memory. Malformed code units are replaced
/// rather than surfaced as errors; a torn entry decodes to garbage text that
/// simply fails to parse downstream.
pub fn decode_utf16_le(bytes: &[u8]) -> String {
    let terminator = bytes
        .chunks_exact(2)
        .position(|unit| unit == [0, 0])
        .map(|units| units * 2)
        .unwrap_or(bytes.len());

    let (decoded, _) = encoding_rs::UTF_16LE.decode_without_bom_handling(&bytes[..terminator]);
    decoded.into_owned()
}
