//! MEGA cloud drive as a [`DocumentStore`].

use async_trait::async_trait;
use bytes::Bytes;
use mega::{Node, NodeKind};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use studybot_core::{BotError, DocumentStore, StoredDocument};

const PROVIDER: &str = "MEGA";

fn mega_error(err: mega::Error) -> BotError {
    BotError::provider(PROVIDER, err.to_string())
}

/// Every file in the logged-in account, sorted by name; the handle is the
/// MEGA node handle. The session is opened on first use and kept. A failed
/// login is retried on the next call.
pub struct MegaStore {
    email: String,
    password: String,
    http: reqwest::Client,
    session: OnceCell<mega::Client>,
}

impl MegaStore {
    pub fn new(http: reqwest::Client, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into(), http, session: OnceCell::new() }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    async fn client(&self) -> Result<&mega::Client, BotError> {
        self.session
            .get_or_try_init(|| async {
                info!(email = %self.email, "Connecting to MEGA");
                let mut client = mega::Client::builder().build(self.http.clone()).map_err(mega_error)?;
                if let Err(e) = client.login(&self.email, &self.password, None).await {
                    warn!(error = %e, "MEGA login failed");
                    return Err(BotError::provider(PROVIDER, "login failed, check MEGA_EMAIL and MEGA_PASSWORD"));
                }
                info!("MEGA connection established");
                Ok(client)
            })
            .await
    }
}

fn to_document(node: &Node) -> Option<StoredDocument> {
    matches!(node.kind(), NodeKind::File).then(|| StoredDocument {
        name: node.name().to_string(),
        size_bytes: node.size(),
        handle: node.handle().to_string(),
    })
}

#[async_trait]
impl DocumentStore for MegaStore {
    async fn list_files(&self) -> Result<Vec<StoredDocument>, BotError> {
        let client = self.client().await?;
        let nodes = client.fetch_own_nodes().await.map_err(mega_error)?;
        let mut files: Vec<StoredDocument> = nodes.iter().filter_map(to_document).collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = files.len(), "Listed MEGA files");
        Ok(files)
    }

    async fn download(&self, document: &StoredDocument) -> Result<Bytes, BotError> {
        let client = self.client().await?;
        let nodes = client.fetch_own_nodes().await.map_err(mega_error)?;
        let node = nodes
            .get_node_by_handle(&document.handle)
            .ok_or_else(|| BotError::provider(PROVIDER, format!("{} is no longer stored", document.name)))?;

        let mut data = Vec::with_capacity(usize::try_from(node.size()).unwrap_or_default());
        client.download_node(node, &mut data).await.map_err(mega_error)?;
        Ok(Bytes::from(data))
    }
}
