//! Contains the [`DataProvider`] contract that unFTP servers program against to look up, authenticate
//! and list users, independent of where those users are actually stored.
//!
//! Pre-made implementations exist as separate crates (search for `unftp-dp-`). An implementation
//! is constructed once at startup and handed to the server as an explicit instance:
//!
//! ```no_run
//! use std::sync::Arc;
//! use unftp_dataprovider::{
//!     DataProvider,
//!     auth::{AuthenticationPipeline, ProviderAuthenticator, ProviderUserDetailProvider},
//! };
//!
//! fn wire<P: DataProvider + 'static>(provider: Arc<P>) -> AuthenticationPipeline<unftp_dataprovider::User> {
//!     AuthenticationPipeline::new(
//!         Arc::new(ProviderAuthenticator::new(provider.clone())),
//!         Arc::new(ProviderUserDetailProvider::new(provider)),
//!     )
//! }
//! ```
//!
//! [`DataProvider`]: crate::provider::DataProvider

pub mod auth;
pub mod config;
pub mod error;
pub mod provider;
pub mod user;

pub use config::{CacheMode, Driver, PaginationMode, ProviderConfig};
pub use error::{Error, ErrorKind, Result};
pub use provider::{DataProvider, QuotaUpdate, SortOrder, UsedQuota};
pub use user::{Permission, User, UserStatus};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
