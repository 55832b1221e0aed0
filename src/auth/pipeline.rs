//! Authentication pipeline that combines authentication and user detail retrieval.

use super::{
    authenticator::{AuthenticationError, Authenticator, Credentials},
    user::{UserDetail, UserDetailError, UserDetailProvider},
};
use std::fmt::Debug;
use std::sync::Arc;

/// Combines an [`Authenticator`] and a [`UserDetailProvider`] so that a login yields the full
/// [`UserDetail`] in one call.
#[derive(Debug)]
pub struct AuthenticationPipeline<User>
where
    User: UserDetail,
{
    authenticator: Arc<dyn Authenticator + Send + Sync>,
    user_provider: Arc<dyn UserDetailProvider<User = User> + Send + Sync>,
}

impl<User> AuthenticationPipeline<User>
where
    User: UserDetail,
{
    /// Creates a new `AuthenticationPipeline` combining the given authenticator and user provider.
    pub fn new(authenticator: Arc<dyn Authenticator + Send + Sync>, user_provider: Arc<dyn UserDetailProvider<User = User> + Send + Sync>) -> Self {
        Self { authenticator, user_provider }
    }

    /// Authenticates the user and returns the full user detail.
    ///
    /// A user that authenticates but whose account is disabled is refused with
    /// [`AuthenticationError::BadUser`].
    pub async fn authenticate_and_get_user(&self, username: &str, creds: &Credentials) -> Result<User, AuthenticationError> {
        let principal = self.authenticator.authenticate(username, creds).await?;

        let user = self.user_provider.provide_user_detail(&principal).await.map_err(|e| match e {
            UserDetailError::UserNotFound { .. } => AuthenticationError::BadUser,
            UserDetailError::ImplPropagated(msg, source) => AuthenticationError::ImplPropagated(msg, source),
        })?;

        if !user.account_enabled() {
            return Err(AuthenticationError::BadUser);
        }
        Ok(user)
    }

    /// Returns the name of the authenticator.
    pub fn name(&self) -> &str {
        self.authenticator.name()
    }
}
