//! Command-line flags shared by the binaries

use anyhow::Result;
use clap::{Args, Parser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::{MongoConfig, SnapshotConfig, DEFAULT_PASSWD_FILE};

/// Flags describing how to reach the database
#[derive(Debug, Args)]
pub struct MongoArgs {
    /// Port on which mongo is listening
    #[arg(long, env = "MONGO_PORT")]
    pub mongo_port: u16,

    /// File storing the mongo user password
    #[arg(long, value_name = "PATH", default_value = DEFAULT_PASSWD_FILE)]
    pub passwd_file: PathBuf,

    /// Connect without credentials; the password file is not read
    #[arg(long, conflicts_with = "passwd_file")]
    pub no_auth: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl MongoArgs {
    pub fn to_config(&self) -> MongoConfig {
        MongoConfig {
            passwd_file: (!self.no_auth).then(|| self.passwd_file.clone()),
            ..MongoConfig::local(self.mongo_port)
        }
    }
}

/// Dump every collection of the app database to a snapshot directory
#[derive(Debug, Parser)]
#[command(name = "mongo-migrate", version)]
pub struct DumpCli {
    #[command(flatten)]
    pub mongo: MongoArgs,

    /// Directory in which to store the snapshot
    #[arg(long, value_name = "DIR")]
    pub snapshot_dir: PathBuf,

    /// Re-read every snapshot file after writing it
    #[arg(long)]
    pub verify: bool,

    /// Write a JSON report of the dump to this file
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

impl DumpCli {
    pub fn to_config(&self) -> SnapshotConfig {
        SnapshotConfig {
            mongo: self.mongo.to_config(),
            snapshot_dir: self.snapshot_dir.clone(),
            verify: self.verify,
            report: self.report.clone(),
        }
    }
}

/// Print the collection names of the app database, one per line
#[derive(Debug, Parser)]
#[command(name = "mongo-list-collections", version)]
pub struct ListCli {
    #[command(flatten)]
    pub mongo: MongoArgs,
}

/// Initialize logging to stderr.
///
/// `RUST_LOG` takes precedence over `verbose`.
pub fn init_tracing(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "mongo_migrate=info" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_flags() {
        let cli = DumpCli::try_parse_from([
            "mongo-migrate",
            "--mongo-port",
            "3002",
            "--snapshot-dir",
            "/var/snapshot",
            "--verify",
        ])
        .unwrap();

        let config = cli.to_config();
        assert_eq!(config.mongo.port, 3002);
        assert_eq!(config.mongo.database, "meteor");
        assert_eq!(config.mongo.passwd_file, Some(PathBuf::from("/var/mongo/passwd")));
        assert_eq!(config.snapshot_dir, PathBuf::from("/var/snapshot"));
        assert!(config.verify);
        assert_eq!(config.report, None);
    }

    #[test]
    fn test_snapshot_dir_required() {
        let result = DumpCli::try_parse_from(["mongo-migrate", "--mongo-port", "3002"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_passwd_file() {
        let cli = ListCli::try_parse_from([
            "mongo-list-collections",
            "--mongo-port",
            "3002",
            "--passwd-file",
            "/tmp/pw",
        ])
        .unwrap();

        assert_eq!(cli.mongo.to_config().passwd_file, Some(PathBuf::from("/tmp/pw")));
    }

    #[test]
    fn test_no_auth() {
        let cli = ListCli::try_parse_from([
            "mongo-list-collections",
            "--mongo-port",
            "3002",
            "--no-auth",
        ])
        .unwrap();

        assert_eq!(cli.mongo.to_config().passwd_file, None);
    }

    #[test]
    fn test_port_must_be_numeric() {
        let result = ListCli::try_parse_from(["mongo-list-collections", "--mongo-port", "http"]);
        assert!(result.is_err());
    }
}
