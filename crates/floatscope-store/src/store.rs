//! The full retrieval store: catalog + descriptions + flat index.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use floatscope_common::{DepthSample, FloatMetadata};

use crate::catalog::{read_json, FloatCatalog};
use crate::error::{Result, StoreError};
use crate::flat_index::FlatIndex;
use crate::{DESCRIPTIONS_FILE, INDEX_FILE, METADATA_FILE};

/// A retrieved profile together with its distance to the query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub position: usize,
    /// Squared L2 distance; lower is closer.
    pub score: f32,
    pub description: String,
    pub metadata: FloatMetadata,
    pub profile: Vec<DepthSample>,
}

#[derive(Debug, Clone)]
pub struct VectorStore {
    catalog: Arc<FloatCatalog>,
    descriptions: Vec<String>,
    index: FlatIndex,
}

impl VectorStore {
    pub fn new(catalog: Arc<FloatCatalog>, descriptions: Vec<String>, index: FlatIndex) -> Result<Self> {
        if descriptions.len() != catalog.len() {
            return Err(StoreError::Inconsistent {
                left: DESCRIPTIONS_FILE,
                left_len: descriptions.len(),
                right: METADATA_FILE,
                right_len: catalog.len(),
            });
        }
        if index.len() != catalog.len() {
            return Err(StoreError::Inconsistent {
                left: INDEX_FILE,
                left_len: index.len(),
                right: METADATA_FILE,
                right_len: catalog.len(),
            });
        }
        Ok(Self { catalog, descriptions, index })
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let catalog = Arc::new(FloatCatalog::load(dir)?);
        Self::load_with_catalog(dir, catalog)
    }

    /// Load descriptions and index next to an already loaded catalog.
    pub fn load_with_catalog(dir: &Path, catalog: Arc<FloatCatalog>) -> Result<Self> {
        let descriptions: Vec<String> = read_json(&dir.join(DESCRIPTIONS_FILE))?;
        let index = FlatIndex::load(&dir.join(INDEX_FILE))?;
        let store = Self::new(catalog, descriptions, index)?;
        tracing::info!(rows = store.len(), dim = store.dim(), "Vector store loaded");
        Ok(store)
    }

    pub fn catalog(&self) -> &Arc<FloatCatalog> {
        &self.catalog
    }

    pub fn description(&self, position: usize) -> Option<&str> {
        self.descriptions.get(position).map(String::as_str)
    }

    pub fn dim(&self) -> usize {
        self.index.dim()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        let nearest = self.index.search(embedding, k)?;
        let hits = nearest
            .into_iter()
            .filter_map(|(position, score)| {
                let entry = self.catalog.get(position)?;
                Some(SearchHit {
                    position,
                    score,
                    description: self.descriptions[position].clone(),
                    metadata: entry.metadata.clone(),
                    profile: entry.profile.to_vec(),
                })
            })
            .collect();
        Ok(hits)
    }
}
