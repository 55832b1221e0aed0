//! Adapters that let any [`DataProvider`] act as the server's authenticator and user detail
//! provider.

use super::{AuthenticationError, Authenticator, Credentials, Principal, UserDetailError, UserDetailProvider};
use crate::{DataProvider, ErrorKind, User};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

/// [`Authenticator`] implementation that checks passwords with
/// [`DataProvider::validate_user_and_pass`].
///
/// The distinction between an unknown user and a wrong password stays in the provider's logs; the
/// server only sees [`AuthenticationError::BadUser`] or [`AuthenticationError::BadPassword`].
#[derive(Debug)]
pub struct ProviderAuthenticator<P: ?Sized> {
    provider: Arc<P>,
}

impl<P: DataProvider + ?Sized> ProviderAuthenticator<P> {
    /// Wraps `provider`.
    pub fn new(provider: Arc<P>) -> Self {
        ProviderAuthenticator { provider }
    }
}

#[async_trait]
impl<P: DataProvider + ?Sized> Authenticator for ProviderAuthenticator<P> {
    #[tracing_attributes::instrument(skip(creds))]
    async fn authenticate(&self, username: &str, creds: &Credentials) -> Result<Principal, AuthenticationError> {
        let password = creds.password.as_deref().unwrap_or_default();
        match self.provider.validate_user_and_pass(username, password).await {
            Ok(user) => Ok(Principal { username: user.username }),
            Err(err) => Err(match err.kind() {
                ErrorKind::NotFound | ErrorKind::MalformedRecord => AuthenticationError::BadUser,
                ErrorKind::InvalidCredentials => AuthenticationError::BadPassword,
                _ => AuthenticationError::with_source(format!("{} provider failed", self.provider.name()), err),
            }),
        }
    }

    fn name(&self) -> &str {
        self.provider.name()
    }
}

/// [`UserDetailProvider`] implementation that resolves principals with
/// [`DataProvider::user_exists`].
#[derive(Debug)]
pub struct ProviderUserDetailProvider<P: ?Sized> {
    provider: Arc<P>,
}

impl<P: DataProvider + ?Sized> ProviderUserDetailProvider<P> {
    /// Wraps `provider`.
    pub fn new(provider: Arc<P>) -> Self {
        ProviderUserDetailProvider { provider }
    }
}

#[async_trait]
impl<P: DataProvider + ?Sized> UserDetailProvider for ProviderUserDetailProvider<P> {
    type User = User;

    #[tracing_attributes::instrument]
    async fn provide_user_detail(&self, principal: &Principal) -> Result<User, UserDetailError> {
        self.provider.user_exists(&principal.username).await.map_err(|err| match err.kind() {
            ErrorKind::NotFound | ErrorKind::MalformedRecord => UserDetailError::UserNotFound {
                username: principal.username.clone(),
            },
            _ => UserDetailError::ImplPropagated(format!("{} provider failed", self.provider.name()), Some(Box::new(err))),
        })
    }
}
