//! Dashboard handler: the single-page float explorer.

use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;

use floatscope_store::FloatCatalog;

use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// Kept as text so a malformed value falls back to the first profile
    /// instead of rejecting the page.
    pub profile: Option<String>,
}

pub async fn dashboard(
    State(state): State<SharedState>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    let body = match state.catalog.as_deref() {
        Some(catalog) if !catalog.is_empty() => {
            let selected = query
                .profile
                .as_deref()
                .and_then(|p| p.trim().parse::<usize>().ok())
                .filter(|&i| i < catalog.len())
                .unwrap_or(0);
            render_explorer(catalog, selected, &state.load_errors, state.chatbot.is_some())
        }
        Some(_) => render_alerts(&["The vector store contains no profiles.".to_string()]),
        None => render_alerts(&state.load_errors),
    };
    Html(render_page(&body))
}

/// `Profile 3: 2900123 at 12.35°, -56.79°`
pub fn profile_label(catalog: &FloatCatalog, position: usize) -> String {
    match catalog.get(position) {
        Some(entry) => format!(
            "Profile {}: {} at {:.2}°, {:.2}°",
            position,
            entry.metadata.platform_number,
            entry.metadata.latitude,
            entry.metadata.longitude
        ),
        None => format!("Profile {position}"),
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_alerts(errors: &[String]) -> String {
    let items: String = errors
        .iter()
        .map(|e| format!(r#"<div class="alert alert-danger">An error occurred: {}</div>"#, escape_html(e)))
        .collect();
    format!(
        r#"{items}
    <div class="alert alert-danger">Please check if the vector store files exist and are properly formatted.</div>"#
    )
}

fn render_explorer(catalog: &FloatCatalog, selected: usize, errors: &[String], chat_ready: bool) -> String {
    let options: String = (0..catalog.len())
        .map(|i| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                i,
                if i == selected { " selected" } else { "" },
                escape_html(&profile_label(catalog, i))
            )
        })
        .collect();

    let details = catalog
        .get(selected)
        .and_then(|e| serde_json::to_string_pretty(e.metadata).ok())
        .unwrap_or_default();

    let warnings: String = errors
        .iter()
        .map(|e| format!(r#"<div class="alert alert-warning">{}</div>"#, escape_html(e)))
        .collect();

    let chat_disabled = if chat_ready { "" } else { " disabled" };

    format!(r#"{warnings}
    <div class="grid-main">
        <section>
            <h2>Float Locations</h2>
            <div id="map" class="chart" data-fallback="/api/figures/map?style=plain"></div>

            <form method="GET" action="/" class="mt-4">
                <label for="profile" class="form-label">Select a profile to view</label>
                <select id="profile" name="profile" class="form-control" onchange="this.form.submit()">
                    {options}
                </select>
            </form>

            <div id="profile-plot" class="chart" data-profile="{selected}"></div>
        </section>

        <aside>
            <h2>Ask about the Data</h2>
            <p class="text-muted">Ask questions about the float data and get AI-powered responses. Examples:</p>
            <ul class="text-muted">
                <li>What's the typical temperature range?</li>
                <li>Show me profiles with high salinity</li>
                <li>When was this data collected?</li>
            </ul>
            <form id="chat-form" class="chat-form">
                <input type="text" id="question" name="question" class="form-control"
                    placeholder="Ask a question:" autocomplete="off"{chat_disabled}>
                <button type="submit" class="btn btn-primary"{chat_disabled}>Ask</button>
            </form>
            <div id="chat-status" class="text-muted"></div>
            <div id="chat-answer" class="chat-answer"></div>

            <h2>Selected Profile Details</h2>
            <pre class="json">{details}</pre>
        </aside>
    </div>"#,
        details = escape_html(&details),
    )
}

fn render_page(body: &str) -> String {
    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Float Data Explorer</title>
    <link rel="icon" href="data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><text y='.9em' font-size='90'>🌊</text></svg>">
    <link rel="stylesheet" href="/static/main.css">
    <script src="https://cdn.plot.ly/plotly-2.35.2.min.js" charset="utf-8"></script>
</head>
<body>
<main class="main-content">
    <div class="page-header">
        <h1 class="page-title">🌊 Ocean Float Data Explorer</h1>
        <p class="text-muted">Explore ocean profile data collected by autonomous floats. This interactive dashboard allows you to:</p>
        <ul class="text-muted">
            <li>View float locations on a map</li>
            <li>Analyze temperature and salinity profiles</li>
            <li>Ask questions about the data using AI</li>
        </ul>
    </div>
    {body}
</main>
<script src="/static/dashboard.js"></script>
</body>
</html>"#)
}

#[cfg(test)]
mod tests {
    use super::*;
    use floatscope_common::FloatMetadata;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<b>"A&B"</b>"#), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_profile_label_format() {
        let catalog = FloatCatalog::new(
            vec![FloatMetadata {
                platform_number: "2900123".to_string(),
                project_name: String::new(),
                pi_name: String::new(),
                latitude: 12.345,
                longitude: -56.789,
                date: "20000101000000".to_string(),
                extra: serde_json::Map::new(),
            }],
            vec![vec![]],
        )
        .unwrap();
        assert_eq!(profile_label(&catalog, 0), "Profile 0: 2900123 at 12.35°, -56.79°");
        assert_eq!(profile_label(&catalog, 4), "Profile 4");
    }
}
