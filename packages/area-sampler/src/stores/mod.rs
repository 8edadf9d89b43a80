//! Storage implementations for the sampler.
//!
//! Available backends:
//! - `JsonFileStore` - Durable JSON file, rewritten atomically on append
//! - `MemoryStore` - In-memory storage (tests and dry runs)

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
