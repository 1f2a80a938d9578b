//! Save/load system
//!
//! Every state slice lives in its own named entry of a flat key-value store
//! and is read and written independently.

pub mod store;
pub mod slices;

pub use store::{KeyValueStore, FileStore, MemoryStore, data_directory};
pub use slices::{Slice, clear_slice, load_slice, save_slice};
