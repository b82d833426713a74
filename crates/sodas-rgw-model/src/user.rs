//! Users, sub-users and their permissions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::credentials::S3Credential;
use crate::error::PermissionParseError;
use crate::normalize_permission;
use crate::quota::Quota;

/// Parameters for creating a gateway user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSpec {
    /// User id.
    pub uid: String,
    /// Human readable name.
    pub display_name: String,
    /// Contact email.
    pub email: String,
}

/// Access level of a sub-user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SubUserPermission {
    /// No access.
    #[default]
    None,
    /// Read-only access.
    Read,
    /// Write-only access.
    Write,
    /// Read and write access.
    ReadWrite,
    /// Full control, including ACL changes.
    FullControl,
}

impl SubUserPermission {
    /// Spelling used in admin API responses.
    #[must_use]
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Self::None => "<none>",
            Self::Read => "read",
            Self::Write => "write",
            Self::ReadWrite => "read-write",
            Self::FullControl => "full-control",
        }
    }

    /// Value of the admin API `access` request parameter.
    ///
    /// The gateway maps an empty value to "no access".
    #[must_use]
    pub fn as_access_param(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Read => "read",
            Self::Write => "write",
            Self::ReadWrite => "readwrite",
            Self::FullControl => "full",
        }
    }
}

impl fmt::Display for SubUserPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "NONE",
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::ReadWrite => "READ_WRITE",
            Self::FullControl => "FULL_CONTROL",
        };
        f.write_str(name)
    }
}

impl FromStr for SubUserPermission {
    type Err = PermissionParseError;

    /// Accepts enum spellings (`READ_WRITE`) as well as wire spellings
    /// (`read-write`, `<none>`, `full`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_permission(s).as_str() {
            "none" | "" => Ok(Self::None),
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "readwrite" => Ok(Self::ReadWrite),
            "full" | "fullcontrol" => Ok(Self::FullControl),
            _ => Err(PermissionParseError {
                kind: "sub-user",
                value: s.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for SubUserPermission {
    type Error = PermissionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SubUserPermission> for String {
    fn from(value: SubUserPermission) -> Self {
        value.as_wire_str().to_owned()
    }
}

/// Parameters for creating a sub-user with one S3 key pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubUserSpec {
    /// Sub-user id, without the `<uid>:` prefix.
    pub sub_user_id: String,
    /// Access key registered for the sub-user.
    pub access_key: String,
    /// Secret key registered for the sub-user.
    pub secret_key: String,
    /// Requested permission.
    #[serde(default)]
    pub permission: SubUserPermission,
}

/// A sub-user as reported by the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubUser {
    /// Fully qualified id, `"<uid>:<sub_user_id>"`.
    pub id: String,
    /// Current permission.
    pub permissions: SubUserPermission,
}

impl SubUser {
    /// Whether this entry is `sub_user_id` of `uid`.
    ///
    /// Accepts both the bare and the `<uid>:`-qualified form of the id.
    #[must_use]
    pub fn is(&self, uid: &str, sub_user_id: &str) -> bool {
        self.id == sub_user_id || self.id == qualified_sub_user_id(uid, sub_user_id)
    }
}

/// `"<uid>:<sub_user_id>"`, leaving already-qualified ids unchanged.
#[must_use]
pub fn qualified_sub_user_id(uid: &str, sub_user_id: &str) -> String {
    if sub_user_id.contains(':') {
        sub_user_id.to_owned()
    } else {
        format!("{uid}:{sub_user_id}")
    }
}

/// User record returned by `GET /admin/user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// User id.
    pub user_id: String,
    /// Human readable name.
    #[serde(default)]
    pub display_name: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Sub-users of this user.
    #[serde(default)]
    pub subusers: Vec<SubUser>,
    /// S3 keys of the user and its sub-users.
    #[serde(default)]
    pub keys: Vec<S3Credential>,
    /// Aggregate quota across the user's buckets.
    #[serde(default)]
    pub user_quota: Option<Quota>,
    /// Default quota applied to each of the user's buckets.
    #[serde(default)]
    pub bucket_quota: Option<Quota>,
}

impl UserInfo {
    /// Look up a sub-user by bare or qualified id.
    #[must_use]
    pub fn sub_user(&self, sub_user_id: &str) -> Option<&SubUser> {
        self.subusers
            .iter()
            .find(|s| s.is(&self.user_id, sub_user_id))
    }
}
