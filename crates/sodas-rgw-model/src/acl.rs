//! Access control lists for buckets and objects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PermissionParseError;
use crate::normalize_permission;

/// A permission that can be granted through an ACL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AclPermission {
    /// All of the permissions below.
    FullControl,
    /// List (bucket) or read (object).
    Read,
    /// Create, overwrite and delete objects.
    Write,
    /// Read the ACL itself.
    ReadAcp,
    /// Write the ACL itself.
    WriteAcp,
}

impl AclPermission {
    /// S3 wire spelling, e.g. `FULL_CONTROL`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullControl => "FULL_CONTROL",
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::ReadAcp => "READ_ACP",
            Self::WriteAcp => "WRITE_ACP",
        }
    }
}

impl fmt::Display for AclPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AclPermission {
    type Err = PermissionParseError;

    /// Accepts `FULL_CONTROL` as well as `FullControl` and `full-control`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_permission(s).as_str() {
            "fullcontrol" => Ok(Self::FullControl),
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "readacp" => Ok(Self::ReadAcp),
            "writeacp" => Ok(Self::WriteAcp),
            _ => Err(PermissionParseError {
                kind: "acl",
                value: s.to_owned(),
            }),
        }
    }
}

/// The subject of a grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Grantee {
    /// A gateway user, by canonical id.
    CanonicalUser {
        /// Canonical user id.
        id: String,
        /// Display name, if the gateway reported one.
        display_name: Option<String>,
    },
    /// A predefined group, by URI.
    Group {
        /// Group URI.
        uri: String,
    },
    /// A user addressed by email.
    Email {
        /// Email address.
        address: String,
    },
}

impl Grantee {
    /// A canonical-user grantee without display name.
    pub fn canonical(id: impl Into<String>) -> Self {
        Self::CanonicalUser {
            id: id.into(),
            display_name: None,
        }
    }

    /// Whether both grantees name the same subject, ignoring display names.
    #[must_use]
    pub fn same_subject(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::CanonicalUser { id: a, .. }, Self::CanonicalUser { id: b, .. }) => a == b,
            (Self::Group { uri: a }, Self::Group { uri: b }) => a == b,
            (Self::Email { address: a }, Self::Email { address: b }) => {
                a.eq_ignore_ascii_case(b)
            }
            _ => false,
        }
    }
}

/// One grantee/permission pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclGrant {
    /// Who receives the permission.
    pub grantee: Grantee,
    /// The permission granted.
    pub permission: AclPermission,
}

/// Owner of a bucket or object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclOwner {
    /// Canonical user id.
    pub id: String,
    /// Display name.
    pub display_name: Option<String>,
}

/// Owner and grants attached to a bucket or object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    /// Resource owner.
    pub owner: Option<AclOwner>,
    /// Grants in the order the gateway returned them.
    pub grants: Vec<AclGrant>,
}

impl Acl {
    /// Add a grant unless an equivalent one is already present.
    ///
    /// Returns `true` when the grant was added.
    pub fn grant(&mut self, grantee: Grantee, permission: AclPermission) -> bool {
        let present = self
            .grants
            .iter()
            .any(|g| g.permission == permission && g.grantee.same_subject(&grantee));
        if !present {
            self.grants.push(AclGrant {
                grantee,
                permission,
            });
        }
        !present
    }
}
