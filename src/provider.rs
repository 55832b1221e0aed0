//! The service provider interface (SPI) for user directories

use crate::{error::Result, user::User};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;

/// Defines the requirements for user directory implementations.
///
/// Every operation other than [`close`](DataProvider::close) must fail with
/// [`ErrorKind::ClosedProvider`](crate::ErrorKind::ClosedProvider) once the provider has been
/// closed. Providers that cannot write to their store return
/// [`ErrorKind::UnsupportedOperation`](crate::ErrorKind::UnsupportedOperation) from the write
/// operations instead of pretending to succeed.
#[async_trait]
pub trait DataProvider: Send + Sync + Debug {
    /// Succeeds if the provider can serve requests.
    async fn check_availability(&self) -> Result<()>;

    /// Releases the provider. Closing an already closed provider is an error.
    async fn close(&self) -> Result<()>;

    /// Checks the password of the given user and returns the user on success.
    async fn validate_user_and_pass(&self, username: &str, password: &str) -> Result<User>;

    /// Checks the public key of the given user. On success returns the user and the fingerprint of
    /// the key that matched.
    async fn validate_user_and_pub_key(&self, username: &str, pub_key: &str) -> Result<(User, String)>;

    /// Looks up a user by name.
    async fn user_exists(&self, username: &str) -> Result<User>;

    /// Looks up a user by numeric id.
    async fn get_user_by_id(&self, id: i64) -> Result<User>;

    /// Records a successful login.
    async fn update_last_login(&self, username: &str) -> Result<()>;

    /// Adds to, or resets, the quota usage of a user.
    async fn update_quota(&self, username: &str, update: QuotaUpdate) -> Result<()>;

    /// Returns the quota usage of a user.
    async fn get_used_quota(&self, username: &str) -> Result<UsedQuota>;

    /// Creates a new user.
    async fn add_user(&self, user: &User) -> Result<()>;

    /// Replaces an existing user.
    async fn update_user(&self, user: &User) -> Result<()>;

    /// Removes a user.
    async fn delete_user(&self, user: &User) -> Result<()>;

    /// Lists at most `limit` users ordered by username, starting after `offset`. Implementations
    /// may ignore `username` if their store cannot filter.
    async fn get_users(&self, limit: usize, offset: usize, order: SortOrder, username: &str) -> Result<Vec<User>>;

    /// Returns the id the next created user would get, or `-1` if it cannot be determined.
    async fn get_next_id(&self) -> i64;

    /// The name of the driver, used in log messages.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Direction in which [`DataProvider::get_users`] sorts by username.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// A to Z
    Asc,
    /// Z to A
    #[default]
    Desc,
}

/// Only the exact string `"ASC"` selects ascending order. Anything else, including `"asc"` and the
/// empty string, sorts descending.
impl From<&str> for SortOrder {
    fn from(s: &str) -> Self {
        if s == "ASC" { SortOrder::Asc } else { SortOrder::Desc }
    }
}

/// How the `offset` argument of [`DataProvider::get_users`] is applied.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    /// Skips every element up to *and including* index `offset`, so the first result is the
    /// element at `offset + 1`. This is what existing deployments rely on.
    #[default]
    Legacy,
    /// Skips exactly `offset` elements.
    Exclusive,
}

impl PaginationMode {
    /// Applies `offset` and `limit` to an already sorted listing.
    pub fn window<T>(self, items: Vec<T>, limit: usize, offset: usize) -> Vec<T> {
        let skip = match self {
            PaginationMode::Legacy => offset.saturating_add(1),
            PaginationMode::Exclusive => offset,
        };
        items.into_iter().skip(skip).take(limit).collect()
    }
}

/// Quota usage as reported by [`DataProvider::get_used_quota`]. All zero means the provider has
/// no information, not that usage is enforced to be zero.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct UsedQuota {
    /// Number of files stored
    pub files: u64,
    /// Total bytes stored
    pub size: u64,
}

/// A change to the quota usage of a user.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct QuotaUpdate {
    /// Files added (negative when removed)
    pub files_add: i64,
    /// Bytes added (negative when removed)
    pub size_add: i64,
    /// Set usage to the given values instead of adding to it
    pub reset: bool,
}
