//! Float catalog, map and depth-profile JSON endpoints.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use floatscope_common::{describe_profile, DepthSample, FloatMetadata, ProfileSummary};
use floatscope_store::FloatCatalog;

use crate::charts::{self, MapStyle};
use crate::error::ApiError;
use crate::handlers::dashboard::profile_label;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct FloatListItem {
    pub position: usize,
    pub label: String,
    pub platform_number: String,
    pub project_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// ISO 8601, `None` when the stored date does not parse.
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileDetail {
    pub position: usize,
    pub label: String,
    pub metadata: FloatMetadata,
    pub samples: Vec<DepthSample>,
    pub summary: Option<ProfileSummary>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MapQuery {
    pub style: Option<String>,
}

fn catalog(state: &SharedState) -> Result<&Arc<FloatCatalog>, ApiError> {
    state.catalog.as_ref().ok_or_else(|| {
        ApiError::Unavailable(
            state.load_errors.first().cloned().unwrap_or_else(|| "Float data is not loaded".to_string()),
        )
    })
}

pub async fn api_floats(State(state): State<SharedState>) -> Result<Json<Vec<FloatListItem>>, ApiError> {
    let catalog = catalog(&state)?;
    let items = catalog
        .iter()
        .map(|e| FloatListItem {
            position: e.position,
            label: profile_label(catalog, e.position),
            platform_number: e.metadata.platform_number.clone(),
            project_name: e.metadata.project_name.clone(),
            latitude: e.metadata.latitude,
            longitude: e.metadata.longitude,
            date: e.metadata.timestamp().ok().map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
        })
        .collect();
    Ok(Json(items))
}

pub async fn map_figure(
    State(state): State<SharedState>,
    query: Result<Query<MapQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let catalog = catalog(&state)?;
    let style = match query.style.as_deref() {
        Some("plain") => MapStyle::Plain,
        _ => MapStyle::Mapbox,
    };
    Ok(Json(charts::map_figure(catalog, style)))
}

pub async fn profile_detail(
    State(state): State<SharedState>,
    position: Result<Path<usize>, PathRejection>,
) -> Result<Json<ProfileDetail>, ApiError> {
    let Path(position) = position?;
    let catalog = catalog(&state)?;
    let entry = catalog
        .get(position)
        .ok_or_else(|| ApiError::NotFound(format!("Profile {position} not found")))?;

    let label = profile_label(catalog, position);
    Ok(Json(ProfileDetail {
        position,
        summary: ProfileSummary::analyze(&label, entry.profile).ok(),
        description: describe_profile(entry.metadata, entry.profile).ok(),
        label,
        metadata: entry.metadata.clone(),
        samples: entry.profile.to_vec(),
    }))
}

pub async fn profile_figure(
    State(state): State<SharedState>,
    position: Result<Path<usize>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(position) = position?;
    let catalog = catalog(&state)?;
    let entry = catalog
        .get(position)
        .ok_or_else(|| ApiError::NotFound(format!("Profile {position} not found")))?;
    Ok(Json(charts::profile_figure(entry.profile)))
}
