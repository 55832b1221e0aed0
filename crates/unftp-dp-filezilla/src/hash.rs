//! Verifies passwords against the salted digests FileZilla Server stores.

use md5::Md5;
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

/// Number of hex characters in an MD5 digest. Any other length is taken to be SHA-512.
const MD5_HEX_LEN: usize = 32;

/// The digest algorithm used to produce a stored hash.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// Older FileZilla Server versions: unsalted MD5
    Md5,
    /// Newer versions: SHA-512 over password and salt
    Sha512,
}

impl Algorithm {
    /// Infers the algorithm from the length of the stored hex hash.
    pub fn for_stored_hash(stored_hash: &str) -> Algorithm {
        if stored_hash.len() == MD5_HEX_LEN { Algorithm::Md5 } else { Algorithm::Sha512 }
    }

    /// Hex encoded digest of `password` followed by `salt`.
    pub fn hex_digest(self, password: &[u8], salt: &[u8]) -> String {
        match self {
            Algorithm::Md5 => digest::<Md5>(password, salt),
            Algorithm::Sha512 => digest::<Sha512>(password, salt),
        }
    }
}

fn digest<D: Digest>(password: &[u8], salt: &[u8]) -> String {
    let mut hasher = D::new();
    hasher.update(password);
    hasher.update(salt);
    hex::encode(hasher.finalize())
}

/// Returns true if `password` plus `salt` hashes to `stored_hash`. The hex comparison ignores case
/// and takes the same time wherever the first difference is.
pub fn verify(password: &str, stored_hash: &str, salt: &str) -> bool {
    let computed = Algorithm::for_stored_hash(stored_hash).hex_digest(password.as_bytes(), salt.as_bytes());
    let stored = stored_hash.to_ascii_lowercase();
    computed.as_bytes().ct_eq(stored.as_bytes()).into()
}
