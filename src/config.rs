//! Configuration that selects and parameterizes a [`DataProvider`](crate::DataProvider).
//!
//! The host server deserializes this from its own configuration file, e.g.:
//!
//! ```json
//! {
//!   "driver": "filezilla",
//!   "name": "C:\\Program Files (x86)\\FileZilla Server\\FileZilla Server.xml",
//!   "pagination": "legacy",
//!   "cache": "disabled"
//! }
//! ```

use serde::Deserialize;
use std::path::PathBuf;

pub use crate::provider::PaginationMode;

/// The backends a [`ProviderConfig`] can select.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Driver {
    /// Read-only users from a FileZilla Server XML configuration file
    #[display("filezilla")]
    Filezilla,
}

/// Whether a file based provider may reuse a previous parse of its file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Read and parse the file on every call.
    #[default]
    Disabled,
    /// Reuse the previous parse while the file's modification time and length are unchanged.
    ModificationTime,
}

/// Settings for constructing a provider.
#[derive(Clone, Debug, Deserialize)]
pub struct ProviderConfig {
    /// Which backend to use
    pub driver: Driver,
    /// Driver specific name of the store. For file based drivers this is the path of the file.
    pub name: PathBuf,
    /// How `offset` is applied when listing users
    #[serde(default)]
    pub pagination: PaginationMode,
    /// Caching of the parsed store
    #[serde(default)]
    pub cache: CacheMode,
}

impl ProviderConfig {
    /// A configuration for `driver` at `name` with every other setting at its default.
    pub fn new<P: Into<PathBuf>>(driver: Driver, name: P) -> Self {
        ProviderConfig {
            driver,
            name: name.into(),
            pagination: PaginationMode::default(),
            cache: CacheMode::default(),
        }
    }
}
