//! Turns FileZilla users into canonical users.

use crate::configuration::FilezillaUser;
use unftp_dataprovider::{Permission, User, UserStatus};

/// Converts a FileZilla user into the canonical [`User`].
///
/// FileZilla's per directory permissions have no counterpart here, so every user gets
/// [`Permission::Any`] on its home directory. The password is never copied.
pub fn to_user(fz_user: &FilezillaUser) -> User {
    User {
        id: fz_user.ordinal as i64,
        username: fz_user.name.clone(),
        home_dir: fz_user.home.clone().into(),
        password: String::new(),
        permissions: vec![Permission::Any],
        status: UserStatus::from(fz_user.enabled),
    }
}
