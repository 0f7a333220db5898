//! Path utilities.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `normalize_watch_path`, `expand_path`, `expand_path_in`)

pub mod fs;

pub use fs::{expand_path, expand_path_in, normalize_path, normalize_watch_path};
