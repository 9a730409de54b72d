use crate::types::WriteError;

// Stable identifiers emitted on failure facts and mapped to process exit codes.
// We intentionally keep SCREAMING_SNAKE_CASE to match emitted IDs.
#[allow(non_camel_case_types, reason = "Error IDs are emitted verbatim in facts")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorId {
    E_REQUEST,
    E_DIR,
    E_EXDEV,
    E_STAGE,
    E_IO,
    E_VALIDATE,
    E_PERMS,
    E_OWNERSHIP,
    E_RENAME,
    E_CANCELLED,
    E_GENERIC,
}

impl From<&WriteError> for ErrorId {
    fn from(e: &WriteError) -> Self {
        match e {
            WriteError::InvalidRequest(_) | WriteError::NotOpen(_) => ErrorId::E_REQUEST,
            WriteError::MissingParentDir(_) | WriteError::CreateDirFailed { .. } => {
                ErrorId::E_DIR
            }
            WriteError::CrossPartition { .. } => ErrorId::E_EXDEV,
            WriteError::InvalidTemplate { .. } | WriteError::StageFailed { .. } => {
                ErrorId::E_STAGE
            }
            WriteError::WriteFailed { .. }
            | WriteError::SyncFailed { .. }
            | WriteError::CloseFailed { .. } => ErrorId::E_IO,
            WriteError::BelowMinSize { .. } | WriteError::ChecksumMismatch { .. } => {
                ErrorId::E_VALIDATE
            }
            WriteError::InvalidMode(_) | WriteError::ChmodFailed { .. } => ErrorId::E_PERMS,
            WriteError::Ownership(_) => ErrorId::E_OWNERSHIP,
            WriteError::RenameFailed { .. } => ErrorId::E_RENAME,
            WriteError::Cancelled => ErrorId::E_CANCELLED,
        }
    }
}

#[must_use]
pub const fn id_str(id: ErrorId) -> &'static str {
    match id {
        ErrorId::E_REQUEST => "E_REQUEST",
        ErrorId::E_DIR => "E_DIR",
        ErrorId::E_EXDEV => "E_EXDEV",
        ErrorId::E_STAGE => "E_STAGE",
        ErrorId::E_IO => "E_IO",
        ErrorId::E_VALIDATE => "E_VALIDATE",
        ErrorId::E_PERMS => "E_PERMS",
        ErrorId::E_OWNERSHIP => "E_OWNERSHIP",
        ErrorId::E_RENAME => "E_RENAME",
        ErrorId::E_CANCELLED => "E_CANCELLED",
        ErrorId::E_GENERIC => "E_GENERIC",
    }
}

#[must_use]
pub const fn exit_code_for(id: ErrorId) -> i32 {
    match id {
        ErrorId::E_REQUEST => 10,
        ErrorId::E_DIR => 20,
        ErrorId::E_EXDEV => 30,
        ErrorId::E_STAGE => 40,
        ErrorId::E_IO => 50,
        ErrorId::E_VALIDATE => 60,
        ErrorId::E_PERMS => 70,
        ErrorId::E_OWNERSHIP => 80,
        ErrorId::E_RENAME => 90,
        ErrorId::E_CANCELLED => 130,
        ErrorId::E_GENERIC => 1,
    }
}
