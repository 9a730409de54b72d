//! Data-only type for a parsed owner spec.
//! Centralized under `crate::types` for cross-layer reuse.

/// Numeric ownership change derived from an owner spec. `None` leaves that id unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OwnerChange {
    /// User ID to set
    pub uid: Option<u32>,
    /// Group ID to set
    pub gid: Option<u32>,
}

impl OwnerChange {
    /// Both ids unchanged; applying this is a no-op.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.uid.is_none() && self.gid.is_none()
    }
}
