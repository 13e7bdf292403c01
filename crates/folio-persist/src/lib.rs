//! Client-side state that survives restarts.
//!
//! [`KeyValueStore`] is the storage seam; [`PersistentState`] keeps one typed
//! value mirrored into a store under a fixed key.

pub mod error;
pub mod file;
pub mod memory;
pub mod state;
pub mod store;

pub use error::{PersistError, Result};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use state::PersistentState;
pub use store::KeyValueStore;
