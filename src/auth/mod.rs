//! Connects a [`DataProvider`](crate::DataProvider) to the server's login path.
//!
//! The server authenticates with an [`Authenticator`] and then turns the resulting [`Principal`]
//! into a [`UserDetail`] with a [`UserDetailProvider`]. [`ProviderAuthenticator`] and
//! [`ProviderUserDetailProvider`] implement both steps on top of any `DataProvider`, and
//! [`AuthenticationPipeline`] runs them in sequence:
//!
//! ```no_run
//! use std::sync::Arc;
//! use unftp_dataprovider::{
//!     DataProvider, User,
//!     auth::{AuthenticationPipeline, ProviderAuthenticator, ProviderUserDetailProvider},
//! };
//!
//! async fn login(provider: Arc<dyn DataProvider>) -> Option<User> {
//!     let pipeline = AuthenticationPipeline::new(
//!         Arc::new(ProviderAuthenticator::new(provider.clone())),
//!         Arc::new(ProviderUserDetailProvider::new(provider)),
//!     );
//!     pipeline.authenticate_and_get_user("alice", &"secret".into()).await.ok()
//! }
//! ```

mod authenticator;
pub use authenticator::{AuthenticationError, Authenticator, Credentials, Principal};

mod user;
pub use user::{UserDetail, UserDetailError, UserDetailProvider};

mod pipeline;
pub use pipeline::AuthenticationPipeline;

mod provider;
pub use provider::{ProviderAuthenticator, ProviderUserDetailProvider};
