//! Float profile records as stored in the vector-store JSON files.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::describe::{clean_value, parse_float_date};
use crate::error::{FloatscopeError, Result};

/// One entry of `metadata.json`.
///
/// The named fields are the ones the dashboard and the description text
/// use; every other attribute the dataset carries is kept in `extra` and
/// written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatMetadata {
    #[serde(default, deserialize_with = "lenient_string")]
    pub platform_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub project_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pi_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FloatMetadata {
    /// Parsed measurement timestamp.
    pub fn timestamp(&self) -> Result<chrono::NaiveDateTime> {
        parse_float_date(&self.date)
    }

    /// Copy with byte-string markers and padding stripped from the text fields.
    pub fn cleaned(&self) -> Self {
        let extra = self
            .extra
            .iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => Value::String(clean_value(s)),
                    other => other.clone(),
                };
                (k.clone(), v)
            })
            .collect();
        Self {
            platform_number: clean_value(&self.platform_number),
            project_name: clean_value(&self.project_name),
            pi_name: clean_value(&self.pi_name),
            latitude: self.latitude,
            longitude: self.longitude,
            date: clean_value(&self.date),
            extra,
        }
    }
}

/// A single level of a depth profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthSample {
    pub depth: f64,
    pub temperature: f64,
    pub salinity: f64,
}

/// One row of the cleaned dataset fed to the index builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatRecord {
    pub metadata: FloatMetadata,
    pub profiles: Vec<DepthSample>,
}

/// Key figures of a depth profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub surface_temp: f64,
    pub surface_sal: f64,
    pub max_depth: f64,
    pub temp_range: f64,
    pub sal_range: f64,
}

impl ProfileSummary {
    /// Surface values come from the first sample, ranges span the whole series.
    pub fn analyze(label: &str, samples: &[DepthSample]) -> Result<Self> {
        let first = samples
            .first()
            .ok_or_else(|| FloatscopeError::EmptyProfile(label.to_string()))?;

        let (mut t_min, mut t_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut s_min, mut s_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let mut max_depth = f64::NEG_INFINITY;
        for s in samples {
            t_min = t_min.min(s.temperature);
            t_max = t_max.max(s.temperature);
            s_min = s_min.min(s.salinity);
            s_max = s_max.max(s.salinity);
            max_depth = max_depth.max(s.depth);
        }

        Ok(Self {
            surface_temp: first.temperature,
            surface_sal: first.salinity,
            max_depth,
            temp_range: t_max - t_min,
            sal_range: s_max - s_min,
        })
    }
}

// Platform numbers show up as strings in some exports and as integers in others.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
