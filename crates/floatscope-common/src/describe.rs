//! Natural-language descriptions of float profiles.
//! These strings are what gets embedded into the vector index, so the
//! layout must stay stable between index builds.

use chrono::NaiveDateTime;

use crate::error::{FloatscopeError, Result};
use crate::profile::{DepthSample, FloatMetadata, ProfileSummary};

const FLOAT_DATE_FORMAT: &str = "%Y%m%d%H%M%S";

/// Unwrap the `b'...'` byte-string marker some exports leave around text
/// values, then trim. Quotes inside the value are kept.
pub fn clean_value(raw: &str) -> String {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix("b'")
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| trimmed.strip_prefix("b\"").and_then(|s| s.strip_suffix('"')))
        .unwrap_or(trimmed);
    inner.trim().to_string()
}

/// Parse a `YYYYMMDDHHMMSS` timestamp, tolerating byte-string markers.
pub fn parse_float_date(raw: &str) -> Result<NaiveDateTime> {
    let cleaned = clean_value(raw);
    NaiveDateTime::parse_from_str(&cleaned, FLOAT_DATE_FORMAT).map_err(|e| {
        FloatscopeError::InvalidDate { value: raw.to_string(), reason: e.to_string() }
    })
}

/// `January 05, 2000`
pub fn format_date(ts: &NaiveDateTime) -> String {
    ts.format("%B %d, %Y").to_string()
}

/// `12.34°N, 56.78°W`
pub fn format_location(lat: f64, lon: f64) -> String {
    let lat_dir = if lat >= 0.0 { "N" } else { "S" };
    let lon_dir = if lon >= 0.0 { "E" } else { "W" };
    format!("{:.2}°{}, {:.2}°{}", lat.abs(), lat_dir, lon.abs(), lon_dir)
}

pub fn describe_profile(metadata: &FloatMetadata, samples: &[DepthSample]) -> Result<String> {
    let summary = ProfileSummary::analyze(&metadata.platform_number, samples)?;
    let date = format_date(&metadata.timestamp()?);
    let location = format_location(metadata.latitude, metadata.longitude);

    Ok(format!(
        "Ocean profile measurement taken on {date} at {location}.\n\
         Platform {platform} from project {project}.\n\
         Surface conditions: Temperature {surface_temp:.1}°C, Salinity {surface_sal:.3} PSU.\n\
         Profile depth range: 0 to {max_depth:.1} meters.\n\
         Temperature variation: {temp_range:.1}°C\n\
         Salinity variation: {sal_range:.3} PSU\n\
         Principal Investigator: {pi}",
        platform = clean_value(&metadata.platform_number),
        project = clean_value(&metadata.project_name),
        pi = clean_value(&metadata.pi_name),
        surface_temp = summary.surface_temp,
        surface_sal = summary.surface_sal,
        max_depth = summary.max_depth,
        temp_range = summary.temp_range,
        sal_range = summary.sal_range,
    ))
}
