#![forbid(unsafe_code)]
//! stagedwrite: atomic replacement of a file's contents.
//!
//! Every write follows one commit protocol:
//! stage a temp file next to the target (same partition) → stream bytes in → `fsync` →
//! validate (min size, checksum re-read from disk) → close → chmod → chown →
//! `renameat` over the target → `fsync(parent)`.
//! Readers of the target see either the old or the new content, never a mixture. Any failure
//! before the rename removes the temp file and leaves the target untouched.
//!
//! ```rust,no_run
//! use stagedwrite::{AtomicWriter, WriteRequest, logging::JsonlSink, policy::Policy};
//!
//! let writer = AtomicWriter::new(JsonlSink, JsonlSink, Policy::default());
//! writer.write(
//!     WriteRequest::new("/etc/motd")
//!         .bytes(b"hello\n")
//!         .checksum(true)
//!         .file_mode(0o644),
//! )?;
//! # Ok::<(), stagedwrite::types::WriteError>(())
//! ```
//!
//! Portability: Unix only. Rename-over is atomic on POSIX filesystems; platforms without an
//! atomic replacing rename (Windows) are not supported, and no non-atomic fallback exists.
//! Writers racing on the same target are not serialized: the last rename wins.

pub mod adapters;
pub mod api;
pub mod cancel;
pub mod constants;
pub mod fs;
pub mod logging;
pub mod policy;
pub mod types;

pub use api::*;
pub use cancel::CancelToken;
pub use types::{DataSource, WriteError, WriteOptions, WriteReport, WriteRequest};
