//! Storage administration facade over a Ceph RADOS Gateway.
//!
//! [`StorageAdmin`] groups bucket, object, ACL, quota, user, sub-user and
//! credential operations. Bucket and object calls go through the gateway's
//! S3 API with the caller's own key pair; quota, user and credential calls go
//! through the RGW admin API with the service's admin credentials.
//!
//! # Architecture
//!
//! ```text
//!                 StorageAdmin (ops: bucket, object, acl, quota, user)
//!                 /            |                       \
//!                v             v                        v
//!          AuthChecker   ObjectStoreFactory        AdminHandle (built once)
//!                              |                        |
//!                              v                        v
//!                  S3ObjectStore (aws-sdk-s3)   RgwAdminClient (reqwest + SigV4)
//! ```
//!
//! Both remote seams are traits ([`ObjectStore`], [`AdminApi`]) so the
//! facade can run against in-memory doubles.

pub mod access;
pub mod admin;
pub mod config;
pub mod error;
mod ops;
pub mod provider;
pub mod s3;
pub mod store;

#[cfg(test)]
mod testing;

pub use access::{AllowAll, AuthChecker, StaticKeyChecker};
pub use admin::{AdminApi, AdminHandle, RgwAdminClient};
pub use config::GatewayConfig;
pub use error::{StorageAdminError, StorageAdminResult};
pub use ops::bucket::INVALID_CONTINUATION;
pub use provider::StorageAdmin;
pub use s3::{S3ObjectStore, S3StoreFactory};
pub use store::{ObjectStore, ObjectStoreFactory};
