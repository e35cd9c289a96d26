//! Object storage for certificate files
//!
//! Files are addressed by keys of the form `{principal_id}/{uuid}.{ext}`,
//! partitioning storage per owner. Each stored object has a public URL
//! `{base_url}/{bucket}/{key}`; records keep that URL, and the key is
//! recovered from it when the file has to be deleted.

use async_trait::async_trait;
use std::path::Path;
use url::Url;

use crate::models::PrincipalId;
use crate::Result;

mod fs;

pub use fs::FsObjectStore;

/// Default bucket name for certificate files
pub const DEFAULT_BUCKET: &str = "certificates";

/// Binary blob storage addressed by key
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under `key`, failing if the key is already taken
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Remove the object at `key`; removing an absent object succeeds
    async fn delete(&self, key: &str) -> Result<()>;

    /// Publicly resolvable URL for `key`
    fn url_for(&self, key: &str) -> String;

    /// Recover the key from a URL produced by [`ObjectStore::url_for`]
    fn key_from_url(&self, url: &str) -> Option<String>;
}

/// Derives public URLs from keys and back, without I/O
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrls {
    base_url: String,
    bucket: String,
}

impl PublicUrls {
    pub fn new(base_url: &str, bucket: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.trim_matches('/').to_string(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.bucket, key.trim_start_matches('/'))
    }

    /// Path component of the base URL without trailing slash (`""` at the root)
    ///
    /// `None` if the base URL does not parse.
    pub fn base_path(&self) -> Option<String> {
        let url = Url::parse(&self.base_url).ok()?;
        Some(url.path().trim_end_matches('/').to_string())
    }

    /// Recover the storage key from a public URL
    ///
    /// URLs under the current `{base_url}/{bucket}/` prefix are stripped
    /// exactly. Anything else is assumed to be minted under an earlier base
    /// URL, and the key is whatever follows its first `/{bucket}/` segment.
    pub fn key_from_url(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/{}/", self.base_url, self.bucket);
        let key = match url.strip_prefix(&prefix) {
            Some(key) => key,
            None => {
                let marker = format!("/{}/", self.bucket);
                url.split_once(&marker)?.1
            }
        };
        let key = key.split(['?', '#']).next().unwrap_or_default();
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }
}

/// Generate a collision-resistant storage key for an uploaded file
///
/// The key is scoped under the owner's identifier and keeps the original
/// file extension.
pub fn file_key(owner: &PrincipalId, file_name: &str) -> String {
    let stem = uuid::Uuid::new_v4();
    match file_extension(file_name) {
        Some(ext) => format!("{}/{}.{}", owner, stem, ext),
        None => format!("{}/{}", owner, stem),
    }
}

fn file_extension(file_name: &str) -> Option<&str> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// Check a key is a relative path without traversal components
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('/')
        && !key.contains('\\')
        && key.split('/').all(|part| !part.is_empty() && part != "." && part != "..");

    if valid {
        Ok(())
    } else {
        Err(crate::Error::InvalidInput(format!("Invalid storage key: {}", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_key_scoped_under_owner_with_extension() {
        let owner = PrincipalId::new("user-42");
        let key = file_key(&owner, "aws-cert.final.PDF");

        assert!(key.starts_with("user-42/"));
        assert!(key.ends_with(".PDF"));
        assert!(validate_key(&key).is_ok());
    }

    #[test]
    fn test_file_key_without_extension() {
        let owner = PrincipalId::new("u");
        let key = file_key(&owner, "README");
        let stem = key.strip_prefix("u/").unwrap();
        assert!(uuid::Uuid::parse_str(stem).is_ok());
    }

    #[test]
    fn test_file_key_drops_unsafe_extension() {
        let owner = PrincipalId::new("u");
        let key = file_key(&owner, "evil.p df");
        assert!(!key.contains(' '));
    }

    #[test]
    fn test_file_keys_are_unique() {
        let owner = PrincipalId::new("u");
        assert_ne!(file_key(&owner, "a.png"), file_key(&owner, "a.png"));
    }

    #[test]
    fn test_public_url_roundtrip() {
        let urls = PublicUrls::new("https://cdn.example.com/files/", DEFAULT_BUCKET);
        let url = urls.url_for("user-1/abc.pdf");

        assert_eq!(url, "https://cdn.example.com/files/certificates/user-1/abc.pdf");
        assert_eq!(urls.key_from_url(&url).as_deref(), Some("user-1/abc.pdf"));
    }

    #[test]
    fn test_key_from_url_other_base() {
        let urls = PublicUrls::new("http://localhost:5780/files", DEFAULT_BUCKET);
        let key = urls.key_from_url("https://old.example.com/storage/v1/object/public/certificates/u/x.png?download=1");
        assert_eq!(key.as_deref(), Some("u/x.png"));
    }

    #[test]
    fn test_key_from_url_bucket_name_in_base_path() {
        let urls = PublicUrls::new("https://example.com/certificates", DEFAULT_BUCKET);
        let url = urls.url_for("alice/abc.pdf");

        assert_eq!(url, "https://example.com/certificates/certificates/alice/abc.pdf");
        assert_eq!(urls.key_from_url(&url).as_deref(), Some("alice/abc.pdf"));
    }

    #[test]
    fn test_base_path() {
        let cases = [
            ("http://127.0.0.1:5780/files", Some("/files")),
            ("https://example.com/a/b/", Some("/a/b")),
            ("https://cdn.example.com", Some("")),
            ("not a url", None),
        ];

        for (base, expected) in cases {
            let urls = PublicUrls::new(base, DEFAULT_BUCKET);
            assert_eq!(urls.base_path().as_deref(), expected, "base {}", base);
        }
    }

    #[test]
    fn test_key_from_url_without_bucket() {
        let urls = PublicUrls::new("http://localhost/files", DEFAULT_BUCKET);
        assert_eq!(urls.key_from_url("http://localhost/files/other/u/x.png"), None);
        assert_eq!(urls.key_from_url("http://localhost/files/certificates/"), None);
    }

    #[test]
    fn test_validate_key_rejects_traversal() {
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("/abs/path").is_err());
        assert!(validate_key("user//x").is_err());
        assert!(validate_key("user/./x").is_err());
        assert!(validate_key("").is_err());
        assert!(validate_key("user\\x").is_err());
        assert!(validate_key("user/x.pdf").is_ok());
    }
}
