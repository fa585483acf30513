//! Constants for the download module.

/// Extension appended to every product archive.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Write buffer size used when streaming archives to disk (8 KiB).
pub const CHUNK_SIZE: usize = 8 * 1024;
