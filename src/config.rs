use std::env;
use std::path::PathBuf;

/// Runtime configuration for the persistence backend and blob storage.
///
/// Everything has a platform default so the layer boots with no setup;
/// each knob can be overridden through the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// sqlx connection string for the projects store.
    pub database_url: String,
    /// Root directory for blob buckets.
    pub blob_root: PathBuf,
    /// Base URL prepended to stored blob paths when building public URLs.
    pub public_base_url: String,
}

impl Config {
    pub const ENV_DB_URL: &'static str = "STITCHDESK_DB_URL";
    pub const ENV_BLOB_ROOT: &'static str = "STITCHDESK_BLOB_ROOT";
    pub const ENV_PUBLIC_URL: &'static str = "STITCHDESK_PUBLIC_URL";

    pub fn from_env() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stitchdesk");

        let database_url = env::var(Self::ENV_DB_URL).unwrap_or_else(|_| {
            format!("sqlite://{}", data_dir.join("stitchdesk.sqlite").display())
        });
        let blob_root = env::var(Self::ENV_BLOB_ROOT)
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("blobs"));
        let public_base_url = env::var(Self::ENV_PUBLIC_URL)
            .unwrap_or_else(|_| format!("file://{}", blob_root.display()));

        Self {
            database_url,
            blob_root,
            public_base_url,
        }
    }
}
