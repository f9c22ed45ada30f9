//! Utility modules shared by the loader, store and watcher.

pub mod date;
pub mod fs;
pub mod slug;
