//! Reads users out of a `FileZilla Server.xml` file.
//!
//! The relevant part of the schema looks like this:
//!
//! ```xml
//! <FileZillaServer>
//!   <Users>
//!     <User Name="alice">
//!       <Option Name="Pass">BD2B1AAF...</Option>
//!       <Option Name="Salt">NaCl</Option>
//!       <Option Name="Enabled">1</Option>
//!       <Permissions>
//!         <Permission Dir="C:\ftp\alice">
//!           <Option Name="IsHome">1</Option>
//!         </Permission>
//!       </Permissions>
//!     </User>
//!   </Users>
//! </FileZillaServer>
//! ```

use crate::{
    cache::{DocumentCache, Stamp},
    document::{self, Element},
    hash,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use unftp_dataprovider::{Error, ErrorKind, Result};

/// A user as found in the FileZilla configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilezillaUser {
    /// Position among all `User` elements of the document. Shifts when users are added or removed.
    pub ordinal: usize,
    /// The `Name` attribute
    pub name: String,
    /// `Dir` of the permission entry marked as home
    pub home: String,
    /// False only if the `Enabled` option is present and not `1`
    pub enabled: bool,
}

impl FilezillaUser {
    fn from_element(ordinal: usize, user: &Element) -> Result<FilezillaUser> {
        // A user without a home directory cannot log in, whatever else is configured.
        let home = home_directory(user)?;
        Ok(FilezillaUser {
            ordinal,
            name: user.attr("Name").unwrap_or_default().to_string(),
            home,
            enabled: user.option("Enabled").is_none_or(|e| e.text() == "1"),
        })
    }
}

/// The password material of one user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredCredentials {
    /// Hex digest, in whatever case the server wrote it
    pub hash: String,
    /// Empty when the user has no salt
    pub salt: String,
}

impl StoredCredentials {
    fn from_element(user: &Element) -> StoredCredentials {
        let option = |name: &str| user.option(name).map(|o| o.text().to_string()).unwrap_or_default();
        StoredCredentials {
            hash: option("Pass"),
            salt: option("Salt"),
        }
    }

    /// Checks `password` against this hash and salt.
    pub fn verify(&self, password: &str) -> bool {
        hash::verify(password, &self.hash, &self.salt)
    }
}

fn home_directory(user: &Element) -> Result<String> {
    user.children("Permissions")
        .flat_map(|p| p.children("Permission"))
        .find(|p| p.option("IsHome").is_some_and(|o| o.text() == "1"))
        .map(|p| p.attr("Dir").unwrap_or_default().to_string())
        .ok_or_else(|| {
            let name = user.attr("Name").unwrap_or_default();
            Error::new(ErrorKind::MalformedRecord, format!("cannot find home directory of user {}", name))
        })
}

/// Access to the users of one FileZilla Server configuration file.
///
/// Nothing is kept between calls unless a [`DocumentCache`] is attached: every query reads and
/// parses the file again, so the result always reflects what is on disk.
#[derive(Clone, Debug)]
pub struct FilezillaConfiguration {
    path: PathBuf,
    cache: Option<DocumentCache>,
}

impl FilezillaConfiguration {
    /// Reads users from the file at `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        FilezillaConfiguration {
            path: path.into(),
            cache: None,
        }
    }

    /// Reuses parses while the file's modification time and length stay the same.
    pub fn with_cache(mut self, cache: DocumentCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The path of the configuration file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Arc<Element>> {
        let unreadable = |e: std::io::Error| Error::new(ErrorKind::ConfigUnreadable, e);
        let stamp = match &self.cache {
            Some(cache) => {
                let meta = match tokio::fs::metadata(&self.path).await {
                    Ok(meta) => meta,
                    Err(e) => {
                        cache.invalidate(&self.path);
                        return Err(unreadable(e));
                    }
                };
                let stamp = Stamp::of(&meta);
                if let Some(document) = cache.get(&self.path, stamp) {
                    return Ok(document);
                }
                Some(stamp)
            }
            None => None,
        };

        let xml = tokio::fs::read_to_string(&self.path).await.map_err(unreadable)?;
        let document = Arc::new(document::parse(&xml).map_err(|e| Error::new(ErrorKind::ConfigUnreadable, e))?);

        if let (Some(cache), Some(stamp)) = (&self.cache, stamp) {
            cache.insert(&self.path, stamp, document.clone());
        }
        Ok(document)
    }

    /// All users that have a home directory, in document order. Users without one are left out
    /// but still count towards the ordinals of the users after them.
    pub async fn users(&self) -> Result<Vec<FilezillaUser>> {
        let document = self.load().await?;
        Ok(document
            .descendants("User")
            .into_iter()
            .enumerate()
            .filter_map(|(ordinal, user)| FilezillaUser::from_element(ordinal, user).ok())
            .collect())
    }

    /// The user called `name`, taken from [`users`](Self::users).
    pub async fn user(&self, name: &str) -> Result<FilezillaUser> {
        self.users()
            .await?
            .into_iter()
            .find(|u| u.name == name)
            .ok_or_else(|| Error::not_found(name))
    }

    /// The home directory of `name`. Fails with [`ErrorKind::MalformedRecord`] if the user exists
    /// but has no permission entry marked as home.
    pub async fn home_directory(&self, name: &str) -> Result<String> {
        let document = self.load().await?;
        let user = find_user_by_name(&document, name).ok_or_else(|| Error::not_found(name))?;
        home_directory(user)
    }

    /// The hash and salt stored for `name`, or `None` if there is no such user.
    pub async fn credentials(&self, name: &str) -> Result<Option<StoredCredentials>> {
        let document = self.load().await?;
        Ok(find_user_by_name(&document, name).map(StoredCredentials::from_element))
    }

    /// Returns true if `password` matches what is stored for `name`. An unknown user never
    /// matches.
    pub async fn verify_password(&self, name: &str, password: &str) -> Result<bool> {
        Ok(self.credentials(name).await?.is_some_and(|c| c.verify(password)))
    }
}

/// The first `User` element whose `Name` attribute equals `name` exactly. The name is compared as
/// data, so characters like `"` or `]` in it have no special meaning.
pub fn find_user_by_name<'a>(document: &'a Element, name: &str) -> Option<&'a Element> {
    document.descendants("User").into_iter().find(|u| u.attr("Name") == Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const XML: &str = r#"<FileZillaServer><Users>
        <User Name="alice">
            <Option Name="Pass">5EBE2294ECD0E0F08EAB7690D2A6EE69</Option>
            <Permissions>
                <Permission Dir="/data/other"><Option Name="IsHome">0</Option></Permission>
                <Permission Dir="/data/alice"><Option Name="IsHome">1</Option></Permission>
            </Permissions>
        </User>
        <User Name="homeless">
            <Option Name="Pass">5EBE2294ECD0E0F08EAB7690D2A6EE69</Option>
            <Permissions/>
        </User>
        <User Name="bob&quot;]">
            <Option Name="Enabled">0</Option>
            <Option Name="Salt"></Option>
            <Permissions><Permission Dir="/data/bob"><Option Name="IsHome">1</Option></Permission></Permissions>
        </User>
    </Users></FileZillaServer>"#;

    #[test]
    fn users_skip_the_homeless_but_keep_ordinals() {
        let doc = document::parse(XML).unwrap();
        let users: Vec<_> = doc
            .descendants("User")
            .into_iter()
            .enumerate()
            .filter_map(|(i, u)| FilezillaUser::from_element(i, u).ok())
            .collect();
        assert_eq!(
            users,
            vec![
                FilezillaUser {
                    ordinal: 0,
                    name: "alice".to_string(),
                    home: "/data/alice".to_string(),
                    enabled: true,
                },
                FilezillaUser {
                    ordinal: 2,
                    name: "bob\"]".to_string(),
                    home: "/data/bob".to_string(),
                    enabled: false,
                },
            ]
        );
    }

    #[test]
    fn missing_home_is_malformed() {
        let doc = document::parse(XML).unwrap();
        let user = find_user_by_name(&doc, "homeless").unwrap();
        assert_eq!(home_directory(user).unwrap_err().kind(), ErrorKind::MalformedRecord);
    }

    #[test]
    fn lookup_treats_name_as_data() {
        let doc = document::parse(XML).unwrap();
        assert!(find_user_by_name(&doc, "bob\"]").is_some());
        assert!(find_user_by_name(&doc, "bob").is_none());
        assert!(find_user_by_name(&doc, "Alice").is_none());
    }

    #[test]
    fn absent_and_empty_salt_are_the_same() {
        let doc = document::parse(XML).unwrap();
        let alice = StoredCredentials::from_element(find_user_by_name(&doc, "alice").unwrap());
        let bob = StoredCredentials::from_element(find_user_by_name(&doc, "bob\"]").unwrap());
        assert_eq!(alice.salt, "");
        assert_eq!(bob.salt, "");
        assert_eq!(bob.hash, "");
        assert!(alice.verify("secret"));
        assert!(!bob.verify("secret"));
    }

    #[tokio::test]
    async fn missing_file_is_unreadable() {
        let cfg = FilezillaConfiguration::new("/nonexistent/FileZilla Server.xml");
        let err = cfg.users().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigUnreadable);
        assert_eq!(err.get_io_error().map(|e| e.kind()), Some(std::io::ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn corrupt_file_is_unreadable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "<Users><User Name=\"x\"></Users>").unwrap();
        let cfg = FilezillaConfiguration::new(file.path());
        assert_eq!(cfg.users().await.unwrap_err().kind(), ErrorKind::ConfigUnreadable);
        assert_eq!(cfg.verify_password("x", "pw").await.unwrap_err().kind(), ErrorKind::ConfigUnreadable);
    }

    #[tokio::test]
    async fn every_call_sees_the_latest_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), XML).unwrap();
        let cfg = FilezillaConfiguration::new(file.path());
        assert_eq!(cfg.users().await.unwrap().len(), 2);

        std::fs::write(file.path(), "<FileZillaServer><Users/></FileZillaServer>").unwrap();
        assert!(cfg.users().await.unwrap().is_empty());
        assert_eq!(cfg.user("alice").await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn targeted_lookups() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), XML).unwrap();
        let cfg = FilezillaConfiguration::new(file.path());

        assert_eq!(cfg.home_directory("alice").await.unwrap(), "/data/alice");
        assert_eq!(cfg.home_directory("homeless").await.unwrap_err().kind(), ErrorKind::MalformedRecord);
        assert_eq!(cfg.home_directory("nobody").await.unwrap_err().kind(), ErrorKind::NotFound);
        assert!(cfg.verify_password("alice", "secret").await.unwrap());
        assert!(!cfg.verify_password("nobody", "secret").await.unwrap());
        assert_eq!(cfg.credentials("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn cached_parse_expires_when_the_stamp_cannot_tell() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), XML).unwrap();
        let modified = std::fs::metadata(file.path()).unwrap().modified().unwrap();
        let cfg = FilezillaConfiguration::new(file.path())
            .with_cache(DocumentCache::with_time_to_live(std::time::Duration::from_millis(100)));
        assert!(cfg.verify_password("alice", "secret").await.unwrap());

        // same length, and the mtime is put back: only expiry can notice the new hash
        let rewritten = XML.replacen("5EBE2294ECD0E0F08EAB7690D2A6EE69", "2AB96390C7DBE3439DE74D0C9B0B1767", 1);
        assert_eq!(rewritten.len(), XML.len());
        std::fs::write(file.path(), &rewritten).unwrap();
        std::fs::File::options()
            .write(true)
            .open(file.path())
            .unwrap()
            .set_modified(modified)
            .unwrap();

        std::thread::sleep(std::time::Duration::from_millis(250));
        assert!(cfg.verify_password("alice", "hunter2").await.unwrap());
        assert!(!cfg.verify_password("alice", "secret").await.unwrap());
    }

    #[tokio::test]
    async fn vanished_file_drops_the_cached_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("FileZilla Server.xml");
        std::fs::write(&path, XML).unwrap();
        let stamp = Stamp::of(&std::fs::metadata(&path).unwrap());
        let cache = DocumentCache::new();
        let cfg = FilezillaConfiguration::new(&path).with_cache(cache.clone());
        assert_eq!(cfg.users().await.unwrap().len(), 2);
        assert!(cache.get(&path, stamp).is_some());

        std::fs::remove_file(&path).unwrap();
        assert_eq!(cfg.users().await.unwrap_err().kind(), ErrorKind::ConfigUnreadable);
        assert_eq!(cache.get(&path, stamp), None);
    }
}
