//! Two-phase staged write: `Open -> Committed | Aborted`.
//!
//! Commit sequence once the caller is done writing:
//! `sync -> min_size -> checksum (re-read from disk) -> close -> chmod -> chown`, then
//! `renameat -> fsync(parent)`.
//! Any failure removes the temp file and leaves the target as it was.
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::IntoRawFd;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::Level;
use serde_json::json;
use tempfile::TempPath;

use super::AtomicWriter;
use crate::adapters::ownership::{apply_owner_change, parse_owner_spec};
use crate::adapters::Hasher;
use crate::fs;
use crate::logging::audit::AuditCtx;
use crate::logging::{AuditSink, FactsEmitter, StageLogger};
use crate::types::{DataSource, Result, StageState, WriteError, WriteOptions, WriteReport};

/// An in-flight write owned by exactly one caller.
///
/// Bytes written through [`Write`] are counted and, when checksum streaming is on, hashed.
/// Writing through [`StagedWrite::path`] by other means bypasses both.
pub struct StagedWrite<'w, E: FactsEmitter, A: AuditSink> {
    writer: &'w AtomicWriter<E, A>,
    target: PathBuf,
    options: WriteOptions,
    write_id: String,
    temp_path: PathBuf,
    file: Option<File>,
    temp: Option<TempPath>,
    hasher: Option<Box<dyn Hasher>>,
    written: u64,
    state: StageState,
    started: Instant,
}

impl<'w, E: FactsEmitter, A: AuditSink> StagedWrite<'w, E, A> {
    pub(super) fn open(
        writer: &'w AtomicWriter<E, A>,
        target: PathBuf,
        options: WriteOptions,
        write_id: String,
    ) -> Result<Self> {
        let started = Instant::now();
        let mut ctx = AuditCtx::new(&writer.facts, write_id.clone(), target.display().to_string());
        ctx.redact = writer.redact;
        let staged = fs::resolve(
            &target,
            options.temp_dir.as_deref(),
            options.create_parent_dirs,
            writer.devices.as_ref(),
        )
        .and_then(|dirs| {
            let template = options
                .temp_template
                .as_deref()
                .unwrap_or(&writer.policy.staging.default_template);
            fs::create_staged(&dirs.staging, template)
        });
        let (file, temp) = match staged {
            Ok(parts) => parts,
            Err(e) => {
                StageLogger::new(&ctx).stage().error(&e).emit_failure();
                writer
                    .audit
                    .log(Level::Error, &format!("stage {}: {e}", target.display()));
                return Err(e);
            }
        };
        let temp_path = temp.to_path_buf();
        if let Some(token) = writer.cancel.as_ref() {
            token.track(&temp_path);
        }
        let hasher = options
            .streams_checksum()
            .then(|| writer.checksum.hasher());
        StageLogger::new(&ctx)
            .stage()
            .merge(json!({
                "temp_path": temp_path.display().to_string(),
                "binary_mode": options.binary_mode,
                "checksum_alg": options.verifies_checksum().then(|| writer.checksum.name()),
            }))
            .emit_success();
        Ok(Self {
            writer,
            target,
            options,
            write_id,
            temp_path,
            file: Some(file),
            temp: Some(temp),
            hasher,
            written: 0,
            state: StageState::Open,
            started,
        })
    }

    /// Path of the temp file while `Open`. Meaningless after commit or abort.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// The open temp file handle, while `Open`.
    pub fn file(&self) -> Option<&File> {
        self.file.as_ref()
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    fn ctx(&self) -> AuditCtx<'w> {
        let mut ctx = AuditCtx::new(
            &self.writer.facts,
            self.write_id.clone(),
            self.target.display().to_string(),
        );
        ctx.redact = self.writer.redact;
        ctx
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == StageState::Open {
            Ok(())
        } else {
            Err(WriteError::NotOpen(self.state))
        }
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Err(WriteError::NotOpen(self.state));
        };
        file.write_all(chunk).map_err(|source| WriteError::WriteFailed {
            path: self.temp_path.clone(),
            source,
        })?;
        if let Some(h) = self.hasher.as_mut() {
            h.update(chunk);
        }
        self.written += chunk.len() as u64;
        Ok(())
    }

    fn copy_from(&mut self, source: DataSource<'_>) -> Result<()> {
        match source {
            DataSource::Bytes(bytes) => {
                if self.writer.is_cancelled() {
                    return Err(WriteError::Cancelled);
                }
                self.write_chunk(bytes)
            }
            DataSource::Reader(mut r) => {
                let mut buf = vec![0u8; self.writer.policy.staging.copy_buffer_size.max(1)];
                loop {
                    if self.writer.is_cancelled() {
                        return Err(WriteError::Cancelled);
                    }
                    let n = match r.read(&mut buf) {
                        Ok(0) => return Ok(()),
                        Ok(n) => n,
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(source) => {
                            return Err(WriteError::WriteFailed {
                                path: self.temp_path.clone(),
                                source,
                            })
                        }
                    };
                    self.write_chunk(&buf[..n])?;
                }
            }
        }
    }

    /// Copy all of `source` into the temp file. A failure aborts the write.
    ///
    /// # Errors
    ///
    /// `WriteFailed` for read or write errors, `Cancelled` when the cancel token fires,
    /// `NotOpen` if the write is no longer open.
    pub fn stream(&mut self, source: DataSource<'_>) -> Result<()> {
        self.ensure_open()?;
        self.copy_from(source).map_err(|e| {
            self.fail(&e);
            e
        })
    }

    /// Validate, finalize and rename the temp file onto the target.
    ///
    /// # Errors
    ///
    /// Any failure of the commit sequence; the write is then `Aborted` with its temp file
    /// removed and the target untouched.
    pub fn commit(&mut self) -> Result<WriteReport> {
        self.ensure_open()?;
        match self.finish() {
            Ok(report) => {
                self.state = StageState::Committed;
                let ctx = self.ctx();
                StageLogger::new(&ctx)
                    .commit()
                    .merge(json!({
                        "bytes": report.bytes_written,
                        "duration_ms": report.duration_ms,
                    }))
                    .emit_success();
                Ok(report)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Discard the temp file. The target is never touched.
    ///
    /// # Errors
    ///
    /// `NotOpen` if already committed or aborted.
    pub fn abort(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.cleanup();
        self.state = StageState::Aborted;
        let ctx = self.ctx();
        StageLogger::new(&ctx)
            .abort()
            .field("reason", json!("requested"))
            .emit_success();
        Ok(())
    }

    fn finish(&mut self) -> Result<WriteReport> {
        if self.writer.is_cancelled() {
            return Err(WriteError::Cancelled);
        }
        self.sync()?;
        let checksum = self.validate()?;
        self.close()?;
        if let Some(mode) = self.options.file_mode {
            fs::set_mode(&self.temp_path, mode)?;
        }
        if let Some(spec) = self.options.owner.as_deref() {
            let change = parse_owner_spec(spec, self.writer.accounts.as_ref())?;
            apply_owner_change(change, &self.temp_path)?;
        }
        if self.writer.is_cancelled() {
            return Err(WriteError::Cancelled);
        }
        fs::rename_into_place(&self.temp_path, &self.target).map_err(|source| {
            WriteError::RenameFailed {
                from: self.temp_path.clone(),
                to: self.target.clone(),
                source,
            }
        })?;
        // The inode now lives at the target; disarm the unlink-on-drop.
        self.untrack();
        if let Some(t) = self.temp.take() {
            if let Err(e) = t.keep() {
                self.writer.audit.log(
                    Level::Warn,
                    &format!("could not disarm {}: {}", self.temp_path.display(), e.error),
                );
            }
        }
        if self.writer.policy.durability.fsync_parent_dir {
            if let Err(e) = fs::fsync_parent_dir(&self.target) {
                self.writer.audit.log(
                    Level::Warn,
                    &format!("fsync of {} parent failed: {e}", self.target.display()),
                );
            }
        }
        Ok(WriteReport {
            target: self.target.clone(),
            bytes_written: self.written,
            checksum,
            duration_ms: u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }

    fn sync(&mut self) -> Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Err(WriteError::NotOpen(self.state));
        };
        let synced = file.flush().and_then(|()| {
            if self.writer.policy.durability.sync_file {
                file.sync_all()
            } else {
                Ok(())
            }
        });
        synced.map_err(|source| WriteError::SyncFailed {
            path: self.temp_path.clone(),
            source,
        })
    }

    /// Size first, then checksum. Returns the verified digest, if any.
    fn validate(&mut self) -> Result<Option<String>> {
        let ctx = self.ctx();
        if let Some(min_size) = self.options.min_size {
            if self.written <= min_size {
                return Err(WriteError::BelowMinSize {
                    written: self.written,
                    min_size,
                });
            }
        }
        if !self.options.verifies_checksum() {
            return Ok(None);
        }
        let expected = match (self.options.expected_checksum.as_deref(), self.hasher.take()) {
            (Some(hex), _) => hex.to_ascii_lowercase(),
            (None, Some(h)) => h.finalize_hex(),
            (None, None) => return Err(WriteError::InvalidRequest("checksum state missing".into())),
        };
        let actual = fs::digest_of(
            &self.temp_path,
            self.writer.checksum.as_ref(),
            self.writer.policy.staging.copy_buffer_size,
        )
        .map_err(|source| WriteError::WriteFailed {
            path: self.temp_path.clone(),
            source,
        })?;
        if actual != expected {
            return Err(WriteError::ChecksumMismatch { expected, actual });
        }
        StageLogger::new(&ctx)
            .validate()
            .merge(json!({
                "bytes": self.written,
                "checksum": actual,
                "checksum_alg": self.writer.checksum.name(),
            }))
            .emit_success();
        Ok(Some(actual))
    }

    /// Close the handle explicitly so close-time errors are observed.
    fn close(&mut self) -> Result<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        nix::unistd::close(file.into_raw_fd()).map_err(|e| WriteError::CloseFailed {
            path: self.temp_path.clone(),
            source: e.into(),
        })
    }

    /// Close the handle if still open and unlink the temp file. Failures are logged and never
    /// replace the error that triggered the cleanup.
    fn cleanup(&mut self) {
        drop(self.file.take());
        if let Some(t) = self.temp.take() {
            if let Err(e) = t.close() {
                if e.kind() != io::ErrorKind::NotFound {
                    self.writer.audit.log(
                        Level::Warn,
                        &format!("cleanup: could not remove {}: {e}", self.temp_path.display()),
                    );
                }
            }
        }
        self.untrack();
    }

    fn untrack(&self) {
        if let Some(token) = self.writer.cancel.as_ref() {
            token.untrack(&self.temp_path);
        }
    }

    fn fail(&mut self, err: &WriteError) {
        self.cleanup();
        self.state = StageState::Aborted;
        let ctx = self.ctx();
        StageLogger::new(&ctx)
            .abort()
            .field("bytes", json!(self.written))
            .error(err)
            .emit_failure();
        self.writer
            .audit
            .log(Level::Error, &format!("write {}: {err}", self.target.display()));
    }
}

impl<E: FactsEmitter, A: AuditSink> Write for StagedWrite<'_, E, A> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.ensure_open()?;
        let Some(file) = self.file.as_mut() else {
            return Err(WriteError::NotOpen(self.state).into());
        };
        let n = file.write(buf)?;
        if let Some(h) = self.hasher.as_mut() {
            h.update(&buf[..n]);
        }
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.ensure_open()?;
        match self.file.as_mut() {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }
}

impl<E: FactsEmitter, A: AuditSink> Drop for StagedWrite<'_, E, A> {
    fn drop(&mut self) {
        if self.state != StageState::Open {
            return;
        }
        self.cleanup();
        self.state = StageState::Aborted;
        let ctx = self.ctx();
        StageLogger::new(&ctx)
            .abort()
            .field("reason", json!("dropped while open"))
            .emit_warn();
    }
}
