// Facade for API module; the commit protocol itself lives in `staged`.

use std::path::Path;

use log::Level;
use uuid::Uuid;

use crate::adapters::{
    AccountDb, ChecksumAlgorithm, DeviceProbe, Sha256Checksum, StatDeviceProbe, SystemAccountDb,
};
use crate::cancel::CancelToken;
use crate::logging::{AuditSink, FactsEmitter};
use crate::policy::Policy;
use crate::types::request::validate_target;
use crate::types::{Result, WriteError, WriteOptions, WriteReport, WriteRequest};

mod builder;
pub mod errors;
mod staged;

pub use builder::ApiBuilder;
pub use staged::StagedWrite;

/// Replaces files atomically: stage into a temp file on the target's partition, validate,
/// apply mode/owner, rename into place.
///
/// One writer can be shared between threads; every write owns its own temp file, so
/// concurrent writes never interfere with each other's cleanup. Writes racing on the *same*
/// target are not coordinated: each rename is atomic and the last one wins.
pub struct AtomicWriter<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
    policy: Policy,
    checksum: Box<dyn ChecksumAlgorithm>,
    accounts: Box<dyn AccountDb>,
    devices: Box<dyn DeviceProbe>,
    cancel: Option<CancelToken>,
    redact: bool,
}

impl<E: FactsEmitter, A: AuditSink> AtomicWriter<E, A> {
    pub fn new(facts: E, audit: A, policy: Policy) -> Self {
        Self {
            facts,
            audit,
            policy,
            checksum: Box::new(Sha256Checksum),
            accounts: Box::new(SystemAccountDb),
            devices: Box::new(StatDeviceProbe),
            cancel: None,
            redact: false,
        }
    }

    pub fn with_checksum_algorithm(mut self, algo: Box<dyn ChecksumAlgorithm>) -> Self {
        self.checksum = algo;
        self
    }

    pub fn with_account_db(mut self, db: Box<dyn AccountDb>) -> Self {
        self.accounts = db;
        self
    }

    pub fn with_device_probe(mut self, probe: Box<dyn DeviceProbe>) -> Self {
        self.devices = probe;
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Emit facts with volatile fields (timestamps, ids, temp paths, durations) normalized so
    /// runs can be diffed byte for byte.
    pub fn with_redacted_facts(mut self, yes: bool) -> Self {
        self.redact = yes;
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Atomically replace `request.target` with the bytes of `request.source`.
    ///
    /// On failure the target is untouched and the temp file is gone.
    ///
    /// # Errors
    ///
    /// Any [`WriteError`]; see the variant docs for the step that produces each.
    pub fn write(&self, request: WriteRequest<'_>) -> Result<WriteReport> {
        let WriteRequest {
            target,
            source,
            options,
        } = request;
        let target = validate_target(target.as_deref()).inspect_err(|e| {
            self.audit.log(Level::Error, &format!("write rejected: {e}"));
        })?;
        let Some(source) = source else {
            let e = WriteError::InvalidRequest("missing data source".into());
            self.audit
                .log(Level::Error, &format!("write {} rejected: {e}", target.display()));
            return Err(e);
        };
        let mut staged = self.begin(target, options)?;
        staged.stream(source)?;
        staged.commit()
    }

    /// Open a staged write of `target` for incremental writing. Nothing touches the target
    /// until [`StagedWrite::commit`]; dropping the handle without committing aborts it.
    ///
    /// # Errors
    ///
    /// Errors from request validation, directory resolution and temp file creation.
    pub fn begin(
        &self,
        target: impl AsRef<Path>,
        options: WriteOptions,
    ) -> Result<StagedWrite<'_, E, A>> {
        let target = validate_target(Some(target.as_ref()))?;
        let write_id = Uuid::new_v4().to_string();
        StagedWrite::open(self, target.to_path_buf(), options, write_id)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}
