//! Cooperative cancellation for in-flight writes.
//!
//! A host that wants signal-driven cleanup clones a [`CancelToken`] into its signal hook and
//! calls [`CancelToken::cancel`] there. The writer polls the token between chunks and before
//! the rename; a cancelled write is aborted and its temp file removed. A cancellation that
//! arrives after the rename has been issued is too late and the write completes.
//!
//! A writer blocked inside a read never gets to poll the token. The token therefore also
//! records the temp files of writes it governs, so the host can remove them itself with
//! [`CancelToken::remove_staged`] before exiting.
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    staged: Arc<Mutex<Vec<PathBuf>>>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn staged(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        self.staged.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn track(&self, temp: &Path) {
        self.staged().push(temp.to_path_buf());
    }

    pub(crate) fn untrack(&self, temp: &Path) {
        self.staged().retain(|p| p != temp);
    }

    /// Temp files of writes that are staged but not yet renamed or cleaned up.
    #[must_use]
    pub fn staged_paths(&self) -> Vec<PathBuf> {
        self.staged().clone()
    }

    /// Unlink every tracked temp file. Files already gone are not an error.
    ///
    /// # Errors
    ///
    /// Returns the first unlink failure; the remaining files are still attempted.
    pub fn remove_staged(&self) -> io::Result<()> {
        let mut first = None;
        for p in std::mem::take(&mut *self.staged()) {
            match std::fs::remove_file(&p) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    first.get_or_insert(e);
                }
            }
        }
        first.map_or(Ok(()), Err)
    }
}
