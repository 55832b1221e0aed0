//! A [`DataProvider`] that serves the users defined in a FileZilla Server configuration file.
//!
//! FileZilla Server stays the owner of its `FileZilla Server.xml`: this provider only reads it,
//! parsing the file again on every call so that changes made in the FileZilla Server Interface
//! apply immediately. Every operation that would modify a user fails with
//! [`ErrorKind::UnsupportedOperation`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use unftp_dataprovider::DataProvider;
//! use unftp_dp_filezilla::FilezillaProvider;
//!
//! # async fn demo() {
//! let provider = Arc::new(FilezillaProvider::new(r"C:\Program Files (x86)\FileZilla Server\FileZilla Server.xml"));
//! let user = provider.validate_user_and_pass("alice", "secret").await.unwrap();
//! println!("{} logs in to {}", user.username, user.home_dir.display());
//! # }
//! ```
//!
//! [`DataProvider`]: unftp_dataprovider::DataProvider

pub mod cache;
pub mod configuration;
pub mod document;
pub mod hash;
pub mod mapper;

use async_trait::async_trait;
use cache::DocumentCache;
use configuration::FilezillaConfiguration;
use slog::Drain;
use std::path::PathBuf;
use tokio::sync::Mutex;
use unftp_dataprovider::{
    CacheMode, DataProvider, Driver, Error, ErrorKind, PaginationMode, ProviderConfig, QuotaUpdate, Result, SortOrder, UsedQuota, User,
};

/// The reason given for every write operation.
pub const UNSUPPORTED: &str = "Unsupported. Please use FileZilla Server Interface for all user-related configuration.";

const DRIVER_NAME: &str = "filezilla";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Open,
    Closed,
}

/// Read-only [`DataProvider`] backed by a `FileZilla Server.xml` file.
///
/// User ids are the position of the user in the file. They are only meaningful until the file is
/// next changed: re-resolve users by name after FileZilla Server rewrites it.
#[derive(Debug)]
pub struct FilezillaProvider {
    state: Mutex<State>,
    configuration: FilezillaConfiguration,
    pagination: PaginationMode,
    logger: slog::Logger,
}

/// Used to build the [`FilezillaProvider`]
#[derive(Debug)]
pub struct Builder {
    path: PathBuf,
    pagination: PaginationMode,
    cache: CacheMode,
    logger: Option<slog::Logger>,
}

impl Builder {
    /// Starts building a provider for the configuration file at `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Builder {
        Builder {
            path: path.into(),
            pagination: PaginationMode::default(),
            cache: CacheMode::default(),
            logger: None,
        }
    }

    /// Sets how `offset` is applied by [`DataProvider::get_users`]. Defaults to
    /// [`PaginationMode::Legacy`].
    pub fn pagination(mut self, mode: PaginationMode) -> Self {
        self.pagination = mode;
        self
    }

    /// Enables or disables reuse of parsed files. Defaults to [`CacheMode::Disabled`].
    pub fn cache(mut self, mode: CacheMode) -> Self {
        self.cache = mode;
        self
    }

    /// Sets the logger authentication failures are reported to. Defaults to a logger that
    /// forwards to the `log` crate.
    pub fn logger(mut self, logger: slog::Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Creates the provider. The file is not read until the first call.
    pub fn build(self) -> FilezillaProvider {
        let mut configuration = FilezillaConfiguration::new(self.path);
        if self.cache == CacheMode::ModificationTime {
            configuration = configuration.with_cache(DocumentCache::new());
        }
        let logger = self
            .logger
            .unwrap_or_else(|| slog::Logger::root(slog_stdlog::StdLog {}.fuse(), slog::o!()))
            .new(slog::o!("provider" => DRIVER_NAME, "file" => configuration.path().display().to_string()));
        FilezillaProvider {
            state: Mutex::new(State::Open),
            configuration,
            pagination: self.pagination,
            logger,
        }
    }
}

impl FilezillaProvider {
    /// Creates a provider for the file at `path` with default settings.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Builder::new(path).build()
    }

    /// Creates a provider from the host's provider configuration.
    pub fn from_config(config: &ProviderConfig, logger: Option<slog::Logger>) -> Result<Self> {
        match config.driver {
            Driver::Filezilla => {}
            other => {
                return Err(Error::new(
                    ErrorKind::ConfigUnreadable,
                    format!("driver {} is not handled by the {} provider", other, DRIVER_NAME),
                ));
            }
        }
        let mut builder = Builder::new(config.name.clone()).pagination(config.pagination).cache(config.cache);
        if let Some(logger) = logger {
            builder = builder.logger(logger);
        }
        Ok(builder.build())
    }

    async fn ensure_open(&self) -> Result<()> {
        match *self.state.lock().await {
            State::Open => Ok(()),
            State::Closed => Err(ErrorKind::ClosedProvider.into()),
        }
    }

    async fn open_and_unsupported(&self) -> Result<()> {
        self.ensure_open().await?;
        Err(Error::unsupported(UNSUPPORTED))
    }
}

#[async_trait]
impl DataProvider for FilezillaProvider {
    async fn check_availability(&self) -> Result<()> {
        self.ensure_open().await
    }

    async fn close(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if *state == State::Closed {
            return Err(ErrorKind::ClosedProvider.into());
        }
        *state = State::Closed;
        slog::debug!(self.logger, "Provider closed");
        Ok(())
    }

    #[tracing_attributes::instrument(skip(self, password))]
    async fn validate_user_and_pass(&self, username: &str, password: &str) -> Result<User> {
        self.ensure_open().await?;
        if password.is_empty() {
            return Err(Error::new(ErrorKind::InvalidCredentials, "Credentials cannot be null or empty"));
        }
        let user = match self.user_exists(username).await {
            Ok(user) => user,
            Err(err) => {
                slog::warn!(self.logger, "Error authenticating user {}: {:?}", username, err);
                return Err(err);
            }
        };
        match self.configuration.verify_password(username, password).await {
            Ok(true) => Ok(user),
            Ok(false) => {
                let err = Error::new(ErrorKind::InvalidCredentials, "Invalid password");
                slog::warn!(self.logger, "Error authenticating user {}: {:?}", username, err);
                Err(err)
            }
            Err(err) => {
                slog::warn!(self.logger, "Error authenticating user {}: {:?}", username, err);
                Err(err)
            }
        }
    }

    #[tracing_attributes::instrument(skip(self, _pub_key))]
    async fn validate_user_and_pub_key(&self, _username: &str, _pub_key: &str) -> Result<(User, String)> {
        self.ensure_open().await?;
        Err(Error::unsupported(UNSUPPORTED))
    }

    #[tracing_attributes::instrument(skip(self))]
    async fn user_exists(&self, username: &str) -> Result<User> {
        self.ensure_open().await?;
        let fz_user = self.configuration.user(username).await?;
        Ok(mapper::to_user(&fz_user))
    }

    #[tracing_attributes::instrument(skip(self))]
    async fn get_user_by_id(&self, id: i64) -> Result<User> {
        self.ensure_open().await?;
        let fz_users = self.configuration.users().await?;
        usize::try_from(id)
            .ok()
            .and_then(|index| fz_users.get(index))
            .map(mapper::to_user)
            .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("user with ID {} does not exist", id)))
    }

    async fn update_last_login(&self, _username: &str) -> Result<()> {
        // FileZilla keeps no record of this
        self.ensure_open().await
    }

    async fn update_quota(&self, _username: &str, _update: QuotaUpdate) -> Result<()> {
        self.open_and_unsupported().await
    }

    async fn get_used_quota(&self, _username: &str) -> Result<UsedQuota> {
        self.ensure_open().await?;
        Ok(UsedQuota::default())
    }

    async fn add_user(&self, _user: &User) -> Result<()> {
        self.open_and_unsupported().await
    }

    async fn update_user(&self, _user: &User) -> Result<()> {
        self.open_and_unsupported().await
    }

    async fn delete_user(&self, _user: &User) -> Result<()> {
        self.open_and_unsupported().await
    }

    #[tracing_attributes::instrument(skip(self, _username))]
    async fn get_users(&self, limit: usize, offset: usize, order: SortOrder, _username: &str) -> Result<Vec<User>> {
        self.ensure_open().await?;
        let mut fz_users = self.configuration.users().await?;
        fz_users.sort_by(|a, b| match order {
            SortOrder::Asc => a.name.cmp(&b.name),
            SortOrder::Desc => b.name.cmp(&a.name),
        });
        Ok(self.pagination.window(fz_users, limit, offset).iter().map(mapper::to_user).collect())
    }

    async fn get_next_id(&self) -> i64 {
        if self.ensure_open().await.is_err() {
            return -1;
        }
        match self.configuration.users().await {
            Ok(fz_users) => fz_users.len() as i64,
            Err(err) => {
                slog::debug!(self.logger, "Cannot determine next id: {:?}", err);
                -1
            }
        }
    }

    fn name(&self) -> &str {
        DRIVER_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    // bob, carol and dave in that order, all with password "secret"
    fn users_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<FileZillaServer><Users>").unwrap();
        for name in ["carol", "bob", "dave"] {
            write!(
                file,
                r#"<User Name="{0}"><Option Name="Pass">5ebe2294ecd0e0f08eab7690d2a6ee69</Option>
                <Permissions><Permission Dir="/data/{0}"><Option Name="IsHome">1</Option></Permission></Permissions></User>"#,
                name
            )
            .unwrap();
        }
        write!(file, "</Users></FileZillaServer>").unwrap();
        file
    }

    fn names(users: &[User]) -> Vec<&str> {
        users.iter().map(|u| u.username.as_str()).collect()
    }

    #[tokio::test]
    async fn sorting_follows_order() {
        let file = users_file();
        let provider = FilezillaProvider::new(file.path());
        let pagination = Builder::new(file.path()).pagination(PaginationMode::Exclusive).build();

        assert_eq!(names(&pagination.get_users(10, 0, SortOrder::Asc, "").await.unwrap()), vec!["bob", "carol", "dave"]);
        assert_eq!(names(&pagination.get_users(10, 0, SortOrder::Desc, "").await.unwrap()), vec!["dave", "carol", "bob"]);
        assert_eq!(names(&provider.get_users(10, 0, SortOrder::from("asc"), "").await.unwrap()), vec!["carol", "bob"]);
    }

    #[tokio::test]
    async fn username_filter_is_ignored() {
        let file = users_file();
        let provider = Builder::new(file.path()).pagination(PaginationMode::Exclusive).build();
        assert_eq!(provider.get_users(10, 0, SortOrder::Asc, "bob").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn ids_index_the_document_order() {
        let file = users_file();
        let provider = FilezillaProvider::new(file.path());
        assert_eq!(provider.get_user_by_id(0).await.unwrap().username, "carol");
        assert_eq!(provider.get_user_by_id(2).await.unwrap().username, "dave");
        assert_eq!(provider.get_user_by_id(3).await.unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(provider.get_user_by_id(-1).await.unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(provider.get_next_id().await, 3);
    }

    #[tokio::test]
    async fn from_config_applies_settings() {
        let file = users_file();
        let mut config = ProviderConfig::new(Driver::Filezilla, file.path());
        config.pagination = PaginationMode::Exclusive;
        config.cache = CacheMode::ModificationTime;
        let provider = FilezillaProvider::from_config(&config, None).unwrap();
        assert_eq!(names(&provider.get_users(1, 0, SortOrder::Asc, "").await.unwrap()), vec!["bob"]);
        assert_eq!(provider.name(), "filezilla");

        let logger = slog::Logger::root(slog::Discard, slog::o!());
        let provider = FilezillaProvider::from_config(&config, Some(logger)).unwrap();
        assert_eq!(provider.get_next_id().await, 3);
    }

    #[tokio::test]
    async fn closed_state_wins_over_an_empty_password() {
        let file = users_file();
        let provider = FilezillaProvider::new(file.path());
        assert_eq!(
            provider.validate_user_and_pass("bob", "").await.unwrap_err().kind(),
            ErrorKind::InvalidCredentials
        );
        provider.close().await.unwrap();
        assert_eq!(
            provider.validate_user_and_pass("bob", "").await.unwrap_err().kind(),
            ErrorKind::ClosedProvider
        );
    }
}
