//! Where snapshot documents come from
//!
//! [`DocumentSource`] is the seam between the dump logic and the database
//! driver. [`MongoSource`] talks to MongoDB; [`MemorySource`] serves fixed
//! documents from memory.

use anyhow::{Context, Result};
use mongodb::bson::{doc, RawDocumentBuf};
use mongodb::options::{ClientOptions, Credential, ServerAddress};
use mongodb::{Client, Cursor, Database};
use tracing::debug;

use crate::config::MongoConfig;

/// A database whose collections can be enumerated and scanned
#[allow(async_fn_in_trait)]
pub trait DocumentSource {
    type Cursor: DocumentCursor;

    /// Collection names in the order the database reports them
    async fn collection_names(&self) -> Result<Vec<String>>;

    /// Unfiltered, unordered scan of one collection
    async fn find_all(&self, collection: &str) -> Result<Self::Cursor>;
}

/// Sequential cursor over raw documents
#[allow(async_fn_in_trait)]
pub trait DocumentCursor {
    /// Move to the next document. Returns `false` once exhausted.
    async fn advance(&mut self) -> Result<bool>;

    /// Raw bytes of the current document.
    ///
    /// Only valid after `advance` returned `true`.
    fn current(&self) -> &[u8];
}

/// Build driver options for `config`.
///
/// The password is passed to the driver as-is, never through a URI, so
/// it needs no escaping and keeps any trailing whitespace.
pub fn client_options(config: &MongoConfig, password: Option<String>) -> ClientOptions {
    let credential = password.map(|password| {
        Credential::builder()
            .username(config.username.clone())
            .password(password)
            .build()
    });

    let mut options = ClientOptions::builder()
        .hosts(vec![ServerAddress::Tcp {
            host: config.host.clone(),
            port: Some(config.port),
        }])
        .app_name(env!("CARGO_PKG_NAME").to_string())
        .build();
    options.credential = credential;
    options
}

/// MongoDB-backed document source
pub struct MongoSource {
    client: Client,
    database: Database,
}

impl MongoSource {
    /// Create a client for the configured database.
    ///
    /// The driver connects lazily; unreachable servers surface on the first
    /// operation.
    pub fn connect(config: &MongoConfig, password: Option<String>) -> Result<Self> {
        debug!(
            "Connecting to mongodb at {}:{} (database '{}', auth: {})",
            config.host,
            config.port,
            config.database,
            password.is_some()
        );

        let client = Client::with_options(client_options(config, password))
            .context("Failed to create MongoDB client")?;
        let database = client.database(&config.database);

        Ok(Self { client, database })
    }

    /// Close the client and its connection pool
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

impl DocumentSource for MongoSource {
    type Cursor = MongoCursor;

    async fn collection_names(&self) -> Result<Vec<String>> {
        self.database
            .list_collection_names()
            .await
            .with_context(|| format!("Failed to list collections of '{}'", self.database.name()))
    }

    async fn find_all(&self, collection: &str) -> Result<MongoCursor> {
        let cursor = self
            .database
            .collection::<RawDocumentBuf>(collection)
            .find(doc! {})
            .await
            .with_context(|| format!("Failed to query collection '{}'", collection))?;

        Ok(MongoCursor {
            collection: collection.to_string(),
            inner: cursor,
        })
    }
}

/// Driver cursor yielding raw BSON
pub struct MongoCursor {
    collection: String,
    inner: Cursor<RawDocumentBuf>,
}

impl DocumentCursor for MongoCursor {
    async fn advance(&mut self) -> Result<bool> {
        self.inner
            .advance()
            .await
            .with_context(|| format!("Failed to read from collection '{}'", self.collection))
    }

    fn current(&self) -> &[u8] {
        self.inner.current().as_bytes()
    }
}

/// Documents held in memory, keyed by collection in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    collections: Vec<MemoryCollection>,
}

#[derive(Debug, Clone)]
struct MemoryCollection {
    name: String,
    documents: Vec<Vec<u8>>,
    /// Cursor fails instead of yielding the document at this index
    fail_at: Option<usize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection holding `documents`, in that order
    pub fn with_collection<I, D>(mut self, name: &str, documents: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Vec<u8>>,
    {
        self.collections.push(MemoryCollection {
            name: name.to_string(),
            documents: documents.into_iter().map(Into::into).collect(),
            fail_at: None,
        });
        self
    }

    /// Add a collection whose cursor yields the first `fail_at` documents
    /// and then fails, the way a dropped connection does mid-scan
    pub fn with_failing_collection<I, D>(self, name: &str, documents: I, fail_at: usize) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Vec<u8>>,
    {
        let mut source = self.with_collection(name, documents);
        if let Some(collection) = source.collections.last_mut() {
            collection.fail_at = Some(fail_at);
        }
        source
    }
}

impl DocumentSource for MemorySource {
    type Cursor = MemoryCursor;

    async fn collection_names(&self) -> Result<Vec<String>> {
        Ok(self.collections.iter().map(|c| c.name.clone()).collect())
    }

    async fn find_all(&self, collection: &str) -> Result<MemoryCursor> {
        let found = self
            .collections
            .iter()
            .find(|c| c.name == collection)
            .with_context(|| format!("No such collection: '{}'", collection))?;

        Ok(MemoryCursor {
            documents: found.documents.clone(),
            position: 0,
            fail_at: found.fail_at,
        })
    }
}

/// Cursor over a [`MemorySource`] collection
#[derive(Debug)]
pub struct MemoryCursor {
    documents: Vec<Vec<u8>>,
    position: usize,
    fail_at: Option<usize>,
}

impl DocumentCursor for MemoryCursor {
    async fn advance(&mut self) -> Result<bool> {
        if self.fail_at == Some(self.position) {
            anyhow::bail!("Cursor failed after {} documents", self.position);
        }
        if self.position < self.documents.len() {
            self.position += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn current(&self) -> &[u8] {
        self.position
            .checked_sub(1)
            .and_then(|i| self.documents.get(i))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_options_target_local_port() {
        let config = MongoConfig::local(3002);
        let options = client_options(&config, None);

        assert_eq!(
            options.hosts,
            vec![ServerAddress::Tcp {
                host: "127.0.0.1".to_string(),
                port: Some(3002),
            }]
        );
        assert!(options.credential.is_none());
    }

    #[test]
    fn test_password_passed_verbatim() {
        let config = MongoConfig::local(3002);
        let options = client_options(&config, Some("secret\n".to_string()));

        let credential = options.credential.expect("credential set");
        assert_eq!(credential.username.as_deref(), Some("sandstorm"));
        assert_eq!(credential.password.as_deref(), Some("secret\n"));
    }

    #[test]
    fn test_password_with_uri_metacharacters() {
        let config = MongoConfig::local(3002);
        let options = client_options(&config, Some("p@ss:w/rd".to_string()));

        let credential = options.credential.unwrap();
        assert_eq!(credential.password.as_deref(), Some("p@ss:w/rd"));
    }

    #[tokio::test]
    async fn test_memory_source_preserves_order() {
        let source = MemorySource::new()
            .with_collection("zeta", [vec![1u8]])
            .with_collection("alpha", [vec![2u8], vec![3u8]]);

        assert_eq!(source.collection_names().await.unwrap(), vec!["zeta", "alpha"]);

        let mut cursor = source.find_all("alpha").await.unwrap();
        assert!(cursor.current().is_empty());
        assert!(cursor.advance().await.unwrap());
        assert_eq!(cursor.current(), &[2u8]);
        assert!(cursor.advance().await.unwrap());
        assert_eq!(cursor.current(), &[3u8]);
        assert!(!cursor.advance().await.unwrap());

        assert!(source.find_all("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_failing_cursor_yields_then_errors() {
        let source = MemorySource::new().with_failing_collection("a", [vec![1u8], vec![2u8]], 1);

        let mut cursor = source.find_all("a").await.unwrap();
        assert!(cursor.advance().await.unwrap());
        assert_eq!(cursor.current(), &[1u8]);
        assert!(cursor.advance().await.is_err());
    }
}
