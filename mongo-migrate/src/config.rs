//! Run configuration
//!
//! Everything a run needs is collected once into an immutable
//! [`SnapshotConfig`] and handed to the engine.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Mongo listens on the loopback interface only
pub const MONGO_HOST: &str = "127.0.0.1";

/// User the app's database is owned by
pub const MONGO_USER: &str = "sandstorm";

/// Database every tool in this crate operates on
pub const MONGO_DATABASE: &str = "meteor";

/// Where the password file lives unless told otherwise
pub const DEFAULT_PASSWD_FILE: &str = "/var/mongo/passwd";

/// How to reach the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub database: String,
    /// File holding the password. `None` connects without credentials.
    pub passwd_file: Option<PathBuf>,
}

impl MongoConfig {
    /// Local database on `port`, authenticating with the default password file
    pub fn local(port: u16) -> Self {
        Self {
            host: MONGO_HOST.to_string(),
            port,
            username: MONGO_USER.to_string(),
            database: MONGO_DATABASE.to_string(),
            passwd_file: Some(PathBuf::from(DEFAULT_PASSWD_FILE)),
        }
    }

    /// Read the password, if authentication is configured
    pub fn load_password(&self) -> Result<Option<String>> {
        self.passwd_file
            .as_deref()
            .map(read_password_file)
            .transpose()
    }
}

/// Configuration for one dump run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    pub mongo: MongoConfig,
    /// Directory receiving one file per collection
    pub snapshot_dir: PathBuf,
    /// Re-read the snapshot after writing it
    pub verify: bool,
    /// Where to write a JSON report of the run
    pub report: Option<PathBuf>,
}

impl SnapshotConfig {
    pub fn new(mongo: MongoConfig, snapshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            mongo,
            snapshot_dir: snapshot_dir.into(),
            verify: false,
            report: None,
        }
    }
}

/// Read a password file verbatim.
///
/// The whole file is the password; surrounding whitespace and trailing
/// newlines are kept.
pub fn read_password_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read password file: {}", path.display()))?;
    String::from_utf8(bytes)
        .with_context(|| format!("Password file is not valid UTF-8: {}", path.display()))
}
