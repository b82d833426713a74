//! Storage administration operations.
//!
//! Each submodule adds methods to [`StorageAdmin`](crate::StorageAdmin):
//!
//! - [`bucket`]: bucket listing, creation, deletion and object listing.
//! - [`object`]: object upload, deletion and presigned downloads.
//! - [`acl`]: bucket and object ACLs.
//! - [`quota`]: bucket quotas and usage.
//! - [`user`]: users, sub-users and S3 credentials.
//!
//! Key-scoped operations consult the access checker before any remote call.

pub mod acl;
pub mod bucket;
pub mod object;
pub mod quota;
pub mod user;
