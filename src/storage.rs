//! Blob storage for uploaded files (tech-pack documents, product images).
//!
//! Buckets live under one root directory. Keys are caller-supplied relative
//! paths and every key passes the guard before touching the filesystem:
//! normalized, length-checked, and rejected when it would escape the store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use unicode_normalization::UnicodeNormalization;

use crate::error::{AppError, AppResult};

pub const ERR_KEY_INVALID: &str = "STORAGE/KEY_INVALID";
pub const ERR_KEY_OUT_OF_STORE: &str = "STORAGE/KEY_OUT_OF_STORE";
pub const ERR_KEY_TOO_LONG: &str = "STORAGE/KEY_TOO_LONG";
pub const ERR_KEY_CONFLICT: &str = "STORAGE/KEY_CONFLICT";
pub const ERR_MIME_INVALID: &str = "STORAGE/MIME_INVALID";

pub const MAX_KEY_BYTES: usize = 512;
pub const MAX_COMPONENT_BYTES: usize = 255;

static MIME_HINT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._+-]+/[a-zA-Z0-9._+-]+$")
        .expect("mime hint validation pattern to compile")
});

/// Content-type hints follow type/subtype syntax or are rejected.
pub fn validate_mime_hint(mime: Option<&str>) -> AppResult<()> {
    if let Some(value) = mime {
        if value.is_empty() || !MIME_HINT_PATTERN.is_match(value) {
            return Err(AppError::new(
                ERR_MIME_INVALID,
                "Content-type hints must follow type/subtype syntax.",
            )
            .with_context("mime_hint", value.to_string()));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobBucket {
    TechPacks,
    ProductImages,
}

impl BlobBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobBucket::TechPacks => "tech-packs",
            BlobBucket::ProductImages => "product-images",
        }
    }
}

/// Reference returned by a successful upload; the path is the key needed
/// to delete or replace the blob later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub path: String,
}

fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();
    digest
        .iter()
        .take(8)
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Normalize a storage key: NFC, forward-slash separated, no traversal, no
/// absolute paths, bounded length.
pub fn normalize_key(key: &str) -> AppResult<String> {
    let normalized: String = key.nfc().collect();
    if normalized.trim().is_empty() {
        return Err(AppError::new(ERR_KEY_INVALID, "Storage keys cannot be empty."));
    }
    if normalized.len() > MAX_KEY_BYTES {
        return Err(AppError::new(ERR_KEY_TOO_LONG, "Storage key is too long.")
            .with_context("length", normalized.len().to_string()));
    }
    if normalized.starts_with('/') || normalized.contains('\\') {
        return Err(AppError::new(
            ERR_KEY_OUT_OF_STORE,
            "Storage keys must be relative forward-slash paths.",
        ));
    }
    let mut parts = Vec::new();
    for component in normalized.split('/') {
        if component.is_empty() || component == "." || component == ".." {
            return Err(AppError::new(
                ERR_KEY_OUT_OF_STORE,
                "Storage keys cannot traverse outside the store.",
            )
            .with_context("key_hash", hash_key(&normalized)));
        }
        if component.len() > MAX_COMPONENT_BYTES {
            return Err(AppError::new(ERR_KEY_TOO_LONG, "Storage key segment is too long.")
                .with_context("length", component.len().to_string()));
        }
        parts.push(component);
    }
    Ok(parts.join("/"))
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, bucket: BlobBucket, key: &str, bytes: &[u8]) -> AppResult<StoredBlob>;
    fn public_url(&self, bucket: BlobBucket, path: &str) -> String;
    /// Best effort per path: missing blobs are not an error.
    async fn remove(&self, bucket: BlobBucket, paths: &[String]) -> AppResult<()>;
    /// Remove every blob whose key starts with `prefix/`.
    async fn remove_prefix(&self, bucket: BlobBucket, prefix: &str) -> AppResult<()>;
}

// ---------------------------------------------------------------------------
// Filesystem implementation
// ---------------------------------------------------------------------------

pub struct FsBlobStore {
    base: Arc<PathBuf>,
    public_base: String,
}

impl FsBlobStore {
    pub fn new(base: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            base: Arc::new(base.into()),
            public_base: public_base.into(),
        }
    }

    pub fn base(&self) -> &Path {
        self.base.as_path()
    }

    fn resolve(&self, bucket: BlobBucket, key: &str) -> AppResult<(String, PathBuf)> {
        let normalized = normalize_key(key)?;
        let mut full = self.base.as_ref().clone();
        full.push(bucket.as_str());
        full.push(&normalized);
        if !full.starts_with(self.base.as_path()) {
            return Err(AppError::new(
                ERR_KEY_OUT_OF_STORE,
                "Storage key escaped the store root.",
            )
            .with_context("key_hash", hash_key(key)));
        }
        Ok((normalized, full))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(&self, bucket: BlobBucket, key: &str, bytes: &[u8]) -> AppResult<StoredBlob> {
        let (normalized, full) = self.resolve(bucket, key)?;
        if full.exists() {
            return Err(
                AppError::new(ERR_KEY_CONFLICT, "A blob with this key already exists.")
                    .with_context("bucket", bucket.as_str())
                    .with_context("key_hash", hash_key(&normalized)),
            );
        }
        let parent = full
            .parent()
            .ok_or_else(|| AppError::new(ERR_KEY_INVALID, "Storage key has no parent directory."))?;
        std::fs::create_dir_all(parent).map_err(AppError::from)?;

        // Write through a temp file in the same directory so the blob
        // appears atomically.
        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(AppError::from)?;
        std::io::Write::write_all(&mut tmp, bytes).map_err(AppError::from)?;
        tmp.persist(&full)
            .map_err(|err| AppError::from(err.error).with_context("stage", "persist"))?;

        info!(
            target: "stitchdesk",
            event = "blob_upload",
            bucket = bucket.as_str(),
            key_hash = %hash_key(&normalized),
            size = bytes.len()
        );
        Ok(StoredBlob { path: normalized })
    }

    fn public_url(&self, bucket: BlobBucket, path: &str) -> String {
        format!("{}/{}/{path}", self.public_base, bucket.as_str())
    }

    async fn remove(&self, bucket: BlobBucket, paths: &[String]) -> AppResult<()> {
        for path in paths {
            let (normalized, full) = self.resolve(bucket, path)?;
            match std::fs::remove_file(&full) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(AppError::from(err)
                        .with_context("bucket", bucket.as_str())
                        .with_context("key_hash", hash_key(&normalized)));
                }
            }
        }
        Ok(())
    }

    async fn remove_prefix(&self, bucket: BlobBucket, prefix: &str) -> AppResult<()> {
        let normalized = normalize_key(prefix)?;
        let mut root = self.base.as_ref().clone();
        root.push(bucket.as_str());
        root.push(&normalized);
        if !root.exists() {
            return Ok(());
        }
        for entry in walkdir::WalkDir::new(&root)
            .contents_first(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let result = if entry.file_type().is_dir() {
                std::fs::remove_dir(entry.path())
            } else {
                std::fs::remove_file(entry.path())
            };
            if let Err(err) = result {
                warn!(
                    target: "stitchdesk",
                    event = "blob_sweep_failed",
                    bucket = bucket.as_str(),
                    key_hash = %hash_key(&normalized),
                    error = %err
                );
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryBlobStore {
    files: Mutex<BTreeMap<(String, String), Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn contains(&self, bucket: BlobBucket, path: &str) -> bool {
        let guard = self.files.lock().unwrap_or_else(|e| e.into_inner());
        guard.contains_key(&(bucket.as_str().to_string(), path.to_string()))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, bucket: BlobBucket, key: &str, bytes: &[u8]) -> AppResult<StoredBlob> {
        let normalized = normalize_key(key)?;
        let mut guard = self.files.lock().unwrap_or_else(|e| e.into_inner());
        let slot = (bucket.as_str().to_string(), normalized.clone());
        if guard.contains_key(&slot) {
            return Err(
                AppError::new(ERR_KEY_CONFLICT, "A blob with this key already exists.")
                    .with_context("bucket", bucket.as_str()),
            );
        }
        guard.insert(slot, bytes.to_vec());
        Ok(StoredBlob { path: normalized })
    }

    fn public_url(&self, bucket: BlobBucket, path: &str) -> String {
        format!("memory://{}/{path}", bucket.as_str())
    }

    async fn remove(&self, bucket: BlobBucket, paths: &[String]) -> AppResult<()> {
        let mut guard = self.files.lock().unwrap_or_else(|e| e.into_inner());
        for path in paths {
            let normalized = normalize_key(path)?;
            guard.remove(&(bucket.as_str().to_string(), normalized));
        }
        Ok(())
    }

    async fn remove_prefix(&self, bucket: BlobBucket, prefix: &str) -> AppResult<()> {
        let normalized = normalize_key(prefix)?;
        let mut guard = self.files.lock().unwrap_or_else(|e| e.into_inner());
        let needle = format!("{normalized}/");
        guard.retain(|(b, path), _| b != bucket.as_str() || !path.starts_with(&needle));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct StorageHandle {
    inner: Arc<dyn BlobStore>,
}

impl StorageHandle {
    pub fn fs(base: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(FsBlobStore::new(base, public_base)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(MemoryBlobStore::default()),
        }
    }

    /// Wrap any blob store implementation, e.g. a fault-injecting test double.
    pub fn custom(store: Arc<dyn BlobStore>) -> Self {
        Self { inner: store }
    }

    pub async fn upload(
        &self,
        bucket: BlobBucket,
        key: &str,
        bytes: &[u8],
    ) -> AppResult<StoredBlob> {
        self.inner.upload(bucket, key, bytes).await
    }

    pub fn public_url(&self, bucket: BlobBucket, path: &str) -> String {
        self.inner.public_url(bucket, path)
    }

    pub async fn remove(&self, bucket: BlobBucket, paths: &[String]) -> AppResult<()> {
        self.inner.remove(bucket, paths).await
    }

    pub async fn remove_prefix(&self, bucket: BlobBucket, prefix: &str) -> AppResult<()> {
        self.inner.remove_prefix(bucket, prefix).await
    }
}
