mod bytes;
mod handle;
mod reader;

// Mock memory reader for testing (always available for unit and integration tests)
#[doc(hidden)]
pub mod mock;

pub use bytes::decode_utf16_le;
pub use handle::*;
pub use reader::{MemoryReader, ReadMemory};

// Re-export mock for convenient access in tests
#[doc(hidden)]
pub use mock::{MockMemoryBuilder, MockMemoryReader};
