//! Shared crate-wide constants for stagedwrite.
//!
//! Centralizes magic values and default labels used across modules.

/// Default temp filename template. The trailing run of `X` is replaced by random
/// alphanumerics when the staged file is created, e.g. `.tmp.a8Zk01QmT3`.
pub const DEFAULT_TEMP_TEMPLATE: &str = ".tmp.XXXXXXXXXX";

/// Placeholder character expanded into randomness in temp templates.
pub const TEMPLATE_PLACEHOLDER: char = 'X';

/// A template must end in at least this many placeholders.
pub const MIN_TEMPLATE_PLACEHOLDERS: usize = 4;

/// Chunk size used when streaming a reader into the staged file and when re-reading
/// the staged file for checksum verification.
pub const DEFAULT_COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Largest accepted permission value (setuid, setgid, sticky and rwx bits).
pub const MAX_FILE_MODE: u32 = 0o7777;

/// Delimiters accepted between user and group in an owner spec.
/// `:` takes precedence when both are present.
pub const OWNER_DELIMITERS: [char; 2] = [':', '.'];

/// Subsystem label used on every emitted fact.
pub const FACTS_SUBSYSTEM: &str = "stagedwrite";
