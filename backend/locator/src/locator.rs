use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};

use studybot_core::{BotError, DocumentStore, LookupQuery, StoredDocument};

use crate::matcher::{is_homework_image, is_material, material_expected, PagePattern};

/// Subject-aware lookup over a [`DocumentStore`].
#[derive(Clone)]
pub struct DocumentLocator {
    store: Arc<dyn DocumentStore>,
}

impl DocumentLocator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Find a book page from raw user input.
    pub async fn locate(&self, subject_input: &str, page: &str) -> Result<StoredDocument, BotError> {
        let query = LookupQuery::parse(subject_input, page)?;
        self.locate_query(&query).await
    }

    /// Find a book page for an already parsed query.
    pub async fn locate_query(&self, query: &LookupQuery) -> Result<StoredDocument, BotError> {
        self.find_page(query, PagePattern::new(query)).await
    }

    async fn find_page(&self, query: &LookupQuery, pattern: PagePattern) -> Result<StoredDocument, BotError> {
        let files = self.store.list_files().await?;
        info!(%query, candidates = files.len(), "Looking up book page");

        if let Some(doc) = files.iter().find(|f| pattern.is_exact(&f.name)) {
            info!(%query, file = %doc.name, "Exact match");
            return Ok(doc.clone());
        }
        if let Some(doc) = files.iter().find(|f| pattern.is_fuzzy(&f.name)) {
            info!(%query, file = %doc.name, "Fuzzy match");
            return Ok(doc.clone());
        }

        let near_misses: Vec<String> = files
            .iter()
            .filter(|f| pattern.is_near_miss(&f.name))
            .map(|f| f.name.clone())
            .collect();
        warn!(%query, ?near_misses, "No document matched");
        Err(BotError::NotFound { query: query.clone(), expected: pattern.expected(), near_misses })
    }

    /// Every material sheet for a page, in store order.
    pub async fn locate_all(&self, subject_input: &str, page: &str) -> Result<Vec<StoredDocument>, BotError> {
        let query = LookupQuery::parse(subject_input, page)?;
        self.locate_all_query(&query).await
    }

    pub async fn locate_all_query(&self, query: &LookupQuery) -> Result<Vec<StoredDocument>, BotError> {
        let files = self.store.list_files().await?;
        let found: Vec<StoredDocument> = files.into_iter().filter(|f| is_material(&f.name, query)).collect();
        if found.is_empty() {
            warn!(%query, "No material files found");
            return Err(BotError::NotFound {
                query: query.clone(),
                expected: material_expected(query.subject, &query.page),
                near_misses: Vec::new(),
            });
        }
        info!(%query, count = found.len(), "Found material files");
        Ok(found)
    }

    /// First stored photo named like a homework snapshot (`ha.jpg`).
    pub async fn find_homework_image(&self) -> Result<Option<StoredDocument>, BotError> {
        let files = self.store.list_files().await?;
        let found = files.into_iter().find(|f| is_homework_image(&f.name));
        if let Some(doc) = &found {
            info!(file = %doc.name, "Found homework image in store");
        }
        Ok(found)
    }

    /// Everything in the store, for diagnostics.
    pub async fn list_files(&self) -> Result<Vec<StoredDocument>, BotError> {
        self.store.list_files().await
    }

    pub async fn fetch(&self, document: &StoredDocument) -> Result<Bytes, BotError> {
        info!(file = %document.name, size_kb = document.size_bytes / 1024, "Downloading document");
        self.store.download(document).await
    }
}
