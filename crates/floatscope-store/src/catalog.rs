//! Float catalog: `metadata.json` + `profiles.json`.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use floatscope_common::{DepthSample, FloatMetadata};

use crate::error::{Result, StoreError};
use crate::{METADATA_FILE, PROFILES_FILE};

#[derive(Debug, Clone, Default)]
pub struct FloatCatalog {
    metadata: Vec<FloatMetadata>,
    profiles: Vec<Vec<DepthSample>>,
}

/// Borrowed view of one catalog entry.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FloatEntry<'a> {
    pub position: usize,
    pub metadata: &'a FloatMetadata,
    pub profile: &'a [DepthSample],
}

impl FloatCatalog {
    pub fn new(metadata: Vec<FloatMetadata>, profiles: Vec<Vec<DepthSample>>) -> Result<Self> {
        if metadata.len() != profiles.len() {
            return Err(StoreError::Inconsistent {
                left: METADATA_FILE,
                left_len: metadata.len(),
                right: PROFILES_FILE,
                right_len: profiles.len(),
            });
        }
        Ok(Self { metadata, profiles })
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let metadata: Vec<FloatMetadata> = read_json(&dir.join(METADATA_FILE))?;
        let profiles: Vec<Vec<DepthSample>> = read_json(&dir.join(PROFILES_FILE))?;
        let catalog = Self::new(metadata, profiles)?;
        tracing::info!(dir = %dir.display(), profiles = catalog.len(), "Float catalog loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<FloatEntry<'_>> {
        Some(FloatEntry {
            position,
            metadata: self.metadata.get(position)?,
            profile: self.profiles.get(position)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = FloatEntry<'_>> {
        self.metadata
            .iter()
            .zip(&self.profiles)
            .enumerate()
            .map(|(position, (metadata, profile))| FloatEntry { position, metadata, profile })
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path)
        .map_err(|source| StoreError::File { path: path.to_path_buf(), source })?;
    serde_json::from_slice(&bytes)
        .map_err(|source| StoreError::Json { path: path.to_path_buf(), source })
}

pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = std::fs::File::create(path)
        .map_err(|source| StoreError::File { path: path.to_path_buf(), source })?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)?;
    std::io::Write::flush(&mut writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn meta(platform: &str) -> FloatMetadata {
        FloatMetadata {
            platform_number: platform.to_string(),
            project_name: "ARGO".to_string(),
            pi_name: "PI".to_string(),
            latitude: 1.0,
            longitude: 2.0,
            date: "20010101000000".to_string(),
            extra: Map::new(),
        }
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let err = FloatCatalog::new(vec![meta("a"), meta("b")], vec![vec![]]).unwrap_err();
        assert!(err.to_string().contains("metadata.json has 2 entries but profiles.json has 1"));
    }

    #[test]
    fn test_get_and_iter() {
        let catalog = FloatCatalog::new(vec![meta("a"), meta("b")], vec![vec![], vec![]]).unwrap();
        assert_eq!(catalog.get(1).unwrap().metadata.platform_number, "b");
        assert!(catalog.get(2).is_none());
        let positions: Vec<usize> = catalog.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![0, 1]);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FloatCatalog::load(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::File { ref path, .. } if path.ends_with(METADATA_FILE)));
    }
}
