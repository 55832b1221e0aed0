//! The canonical user that every [`DataProvider`](crate::DataProvider) hands out, whatever its
//! backing store looks like.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf};

/// A capability granted to a user on the files below its home directory.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// All permissions
    #[display("*")]
    #[serde(rename = "*")]
    Any,
    /// List items such as files and directories
    #[display("list")]
    #[serde(rename = "list")]
    List,
    /// Download files
    #[display("download")]
    #[serde(rename = "download")]
    Download,
    /// Upload files
    #[display("upload")]
    #[serde(rename = "upload")]
    Upload,
    /// Overwrite an existing file
    #[display("overwrite")]
    #[serde(rename = "overwrite")]
    Overwrite,
    /// Delete files or directories
    #[display("delete")]
    #[serde(rename = "delete")]
    Delete,
    /// Rename files or directories
    #[display("rename")]
    #[serde(rename = "rename")]
    Rename,
    /// Create directories
    #[display("create_dirs")]
    #[serde(rename = "create_dirs")]
    CreateDirs,
}

/// Whether a user may log in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", from = "i32")]
pub enum UserStatus {
    /// Login allowed, numerically `1`
    #[default]
    Enabled,
    /// Login refused, numerically `0`
    Disabled,
}

impl UserStatus {
    /// The numeric representation used on the wire and in storage.
    pub fn as_i32(self) -> i32 {
        match self {
            UserStatus::Enabled => 1,
            UserStatus::Disabled => 0,
        }
    }
}

impl From<bool> for UserStatus {
    fn from(enabled: bool) -> Self {
        if enabled { UserStatus::Enabled } else { UserStatus::Disabled }
    }
}

impl From<i32> for UserStatus {
    fn from(v: i32) -> Self {
        UserStatus::from(v == 1)
    }
}

impl From<UserStatus> for i32 {
    fn from(s: UserStatus) -> i32 {
        s.as_i32()
    }
}

/// The provider-independent representation of a user account.
///
/// Providers never echo back password material: `password` is empty on every `User` a provider
/// returns, and is only meaningful when a `User` is handed *to* a provider that supports writes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Numeric id. For some providers it is only valid within a single listing snapshot.
    pub id: i64,
    /// The login name
    pub username: String,
    /// Absolute path of the directory the user is jailed in
    pub home_dir: PathBuf,
    /// Always empty when returned by a provider
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    /// What the user may do below `home_dir`
    pub permissions: Vec<Permission>,
    /// Whether the user may log in
    pub status: UserStatus,
}

impl User {
    /// Returns true if the user may log in.
    pub fn is_enabled(&self) -> bool {
        self.status == UserStatus::Enabled
    }

    /// Returns true if the user holds `perm`, either directly or through [`Permission::Any`].
    pub fn has_permission(&self, perm: Permission) -> bool {
        self.permissions.iter().any(|p| *p == Permission::Any || *p == perm)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username)
    }
}
