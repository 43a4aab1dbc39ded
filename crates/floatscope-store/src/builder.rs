//! Offline store construction from a cleaned float dataset.
//!
//! Embedding is left to the caller: [`StoreBuilder::descriptions`] yields
//! the texts to embed and [`StoreBuilder::write`] takes the vectors back in
//! the same order.

use std::path::Path;

use serde::Serialize;

use floatscope_common::{describe_profile, DepthSample, FloatMetadata, FloatRecord};

use crate::catalog::{read_json, write_json};
use crate::error::{Result, StoreError};
use crate::flat_index::FlatIndex;
use crate::{DESCRIPTIONS_FILE, INDEX_FILE, METADATA_FILE, PROFILES_FILE};

#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    pub profiles: usize,
    pub skipped: usize,
    pub dim: usize,
}

#[derive(Debug, Default)]
pub struct StoreBuilder {
    descriptions: Vec<String>,
    metadata: Vec<FloatMetadata>,
    profiles: Vec<Vec<DepthSample>>,
    skipped: usize,
}

impl StoreBuilder {
    /// Read a JSON array of `{metadata, profiles}` records.
    pub fn from_dataset_file(path: &Path) -> Result<Self> {
        let records: Vec<FloatRecord> = read_json(path)?;
        Self::from_records(records)
    }

    /// Records that cannot be described (empty profile, unparseable date)
    /// are skipped and counted rather than aborting the build.
    pub fn from_records(records: Vec<FloatRecord>) -> Result<Self> {
        let mut builder = Self::default();
        for (i, record) in records.into_iter().enumerate() {
            let metadata = record.metadata.cleaned();
            match describe_profile(&metadata, &record.profiles) {
                Ok(description) => {
                    builder.descriptions.push(description);
                    builder.metadata.push(metadata);
                    builder.profiles.push(record.profiles);
                }
                Err(e) => {
                    tracing::warn!(record = i, "Skipping record: {e}");
                    builder.skipped += 1;
                }
            }
        }
        if builder.descriptions.is_empty() {
            return Err(StoreError::Empty(format!(
                "all {} records were skipped",
                builder.skipped
            )));
        }
        Ok(builder)
    }

    pub fn descriptions(&self) -> &[String] {
        &self.descriptions
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Write the four store files into `dir`, creating it if needed.
    pub fn write(&self, dir: &Path, embeddings: &[Vec<f32>]) -> Result<BuildSummary> {
        if embeddings.len() != self.descriptions.len() {
            return Err(StoreError::Inconsistent {
                left: "embeddings",
                left_len: embeddings.len(),
                right: DESCRIPTIONS_FILE,
                right_len: self.descriptions.len(),
            });
        }
        let index = FlatIndex::from_rows(embeddings)?;

        std::fs::create_dir_all(dir)
            .map_err(|source| StoreError::File { path: dir.to_path_buf(), source })?;
        index.save(&dir.join(INDEX_FILE))?;
        write_json(&dir.join(DESCRIPTIONS_FILE), &self.descriptions)?;
        write_json(&dir.join(METADATA_FILE), &self.metadata)?;
        write_json(&dir.join(PROFILES_FILE), &self.profiles)?;

        tracing::info!(dir = %dir.display(), profiles = index.len(), dim = index.dim(), "Vector store written");
        Ok(BuildSummary { profiles: index.len(), skipped: self.skipped, dim: index.dim() })
    }
}
