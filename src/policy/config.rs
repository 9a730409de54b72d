use crate::constants::{DEFAULT_COPY_BUFFER_SIZE, DEFAULT_TEMP_TEMPLATE};

use super::types::{Durability, Staging};

/// Runtime configuration of an [`AtomicWriter`](crate::AtomicWriter).
///
/// Per-write choices (mode, owner, checksum, ...) live in
/// [`WriteOptions`](crate::types::WriteOptions); this struct holds what stays fixed across
/// writes.
#[derive(Clone, Debug)]
pub struct Policy {
    pub durability: Durability,
    pub staging: Staging,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            durability: Durability::default(),
            staging: Staging {
                default_template: DEFAULT_TEMP_TEMPLATE.to_string(),
                copy_buffer_size: DEFAULT_COPY_BUFFER_SIZE,
            },
        }
    }
}

impl Policy {
    /// Skip every fsync. Only for scratch data where crash durability does not matter.
    #[must_use]
    pub fn fast_preset() -> Self {
        let mut p = Self::default();
        p.durability.sync_file = false;
        p.durability.fsync_parent_dir = false;
        p
    }
}
