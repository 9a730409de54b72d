use crate::adapters::{AccountDb, ChecksumAlgorithm, DeviceProbe};
use crate::cancel::CancelToken;
use crate::logging::{AuditSink, FactsEmitter};
use crate::policy::Policy;

/// Builder for constructing an `AtomicWriter` with ergonomic chaining.
/// Mirrors `AtomicWriter::new(...).with_*` but keeps optional adapters in one place.
pub struct ApiBuilder<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
    policy: Policy,
    checksum: Option<Box<dyn ChecksumAlgorithm>>,
    accounts: Option<Box<dyn AccountDb>>,
    devices: Option<Box<dyn DeviceProbe>>,
    cancel: Option<CancelToken>,
    redact: bool,
}

impl<E: FactsEmitter, A: AuditSink> ApiBuilder<E, A> {
    pub fn new(facts: E, audit: A, policy: Policy) -> Self {
        Self {
            facts,
            audit,
            policy,
            checksum: None,
            accounts: None,
            devices: None,
            cancel: None,
            redact: false,
        }
    }

    pub fn checksum_algorithm(mut self, algo: Box<dyn ChecksumAlgorithm>) -> Self {
        self.checksum = Some(algo);
        self
    }

    pub fn account_db(mut self, db: Box<dyn AccountDb>) -> Self {
        self.accounts = Some(db);
        self
    }

    pub fn device_probe(mut self, probe: Box<dyn DeviceProbe>) -> Self {
        self.devices = Some(probe);
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn redacted_facts(mut self, yes: bool) -> Self {
        self.redact = yes;
        self
    }

    pub fn build(self) -> super::AtomicWriter<E, A> {
        let mut w = super::AtomicWriter::new(self.facts, self.audit, self.policy);
        if let Some(c) = self.checksum {
            w = w.with_checksum_algorithm(c);
        }
        if let Some(db) = self.accounts {
            w = w.with_account_db(db);
        }
        if let Some(p) = self.devices {
            w = w.with_device_probe(p);
        }
        if let Some(t) = self.cancel {
            w = w.with_cancel_token(t);
        }
        w.with_redacted_facts(self.redact)
    }
}
