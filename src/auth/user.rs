use super::Principal;
use crate::{BoxError, user::User};
use async_trait::async_trait;
use std::{
    fmt::{Debug, Display},
    path::Path,
};
use thiserror::Error;

/// UserDetail defines the requirements for implementations that hold _Security Subject_
/// information for use by the server.
pub trait UserDetail: Send + Sync + Display + Debug {
    /// Tells if this subject's account is enabled. Disabled accounts are refused after a
    /// successful authentication.
    fn account_enabled(&self) -> bool {
        true
    }

    /// Returns the user's home directory, if any.
    fn home(&self) -> Option<&Path> {
        None
    }
}

impl UserDetail for User {
    fn account_enabled(&self) -> bool {
        self.is_enabled()
    }

    fn home(&self) -> Option<&Path> {
        Some(self.home_dir.as_path())
    }
}

/// Turns an authenticated [`Principal`] into the full user detail the server works with.
#[async_trait]
pub trait UserDetailProvider: Debug {
    /// The concrete type of user detail produced
    type User: UserDetail;

    /// Looks up the detail of an authenticated principal.
    async fn provide_user_detail(&self, principal: &Principal) -> Result<Self::User, UserDetailError>;
}

/// Error returned by a [`UserDetailProvider`]
#[derive(Error, Debug)]
pub enum UserDetailError {
    /// The principal has no user record
    #[error("user '{username}' not found")]
    UserNotFound {
        /// The name that was looked up
        username: String,
    },
    /// Any other failure, with an optional cause
    #[error("error getting user details: {0}: {1:?}")]
    ImplPropagated(String, #[source] Option<BoxError>),
}
