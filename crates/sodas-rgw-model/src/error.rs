//! Error types for the data model.

/// A permission string did not name any known permission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} permission: {value}")]
pub struct PermissionParseError {
    /// Which permission family was being parsed (`"sub-user"` or `"acl"`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}
