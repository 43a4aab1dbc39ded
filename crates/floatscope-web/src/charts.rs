//! Plotly figure descriptions for the map and the depth profile plot.
//! The browser passes `data` and `layout` straight to `Plotly.newPlot`.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde_json::{json, Value};

use floatscope_common::DepthSample;
use floatscope_store::FloatCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapStyle {
    /// `scattermapbox` on the carto-positron tiles.
    #[default]
    Mapbox,
    /// Plain lon/lat scatter, for when map tiles cannot be drawn.
    Plain,
}

/// Fractional year, used as the continuous colour scale for dates.
pub fn decimal_year(ts: &NaiveDateTime) -> f64 {
    let year = ts.year();
    let days_in_year = if chrono::NaiveDate::from_ymd_opt(year, 12, 31).map(|d| d.ordinal()) == Some(366) {
        366.0
    } else {
        365.0
    };
    let day_fraction = (ts.num_seconds_from_midnight() as f64) / 86_400.0;
    year as f64 + ((ts.ordinal0() as f64) + day_fraction) / days_in_year
}

pub fn map_figure(catalog: &FloatCatalog, style: MapStyle) -> Value {
    let mut lat = Vec::with_capacity(catalog.len());
    let mut lon = Vec::with_capacity(catalog.len());
    let mut color = Vec::with_capacity(catalog.len());
    let mut custom = Vec::with_capacity(catalog.len());

    for entry in catalog.iter() {
        let m = entry.metadata;
        let ts = m.timestamp().ok();
        lat.push(m.latitude);
        lon.push(m.longitude);
        color.push(ts.as_ref().map(decimal_year));
        custom.push(json!([
            m.platform_number,
            m.project_name,
            ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_else(|| "unknown".to_string()),
            entry.position,
        ]));
    }

    let marker = json!({
        "size": 9,
        "color": color,
        "colorscale": "Plasma",
        "showscale": true,
        "colorbar": { "title": { "text": "date" } },
    });
    let hover = "platform_number=%{customdata[0]}<br>project_name=%{customdata[1]}<br>date=%{customdata[2]}<extra></extra>";

    match style {
        MapStyle::Mapbox => json!({
            "data": [{
                "type": "scattermapbox",
                "lat": lat,
                "lon": lon,
                "mode": "markers",
                "marker": marker,
                "customdata": custom,
                "hovertemplate": hover,
            }],
            "layout": {
                "title": { "text": "Float Locations" },
                "mapbox": {
                    "style": "carto-positron",
                    "zoom": 2,
                    "center": map_center(&lat, &lon),
                },
                "margin": { "l": 0, "r": 0, "t": 40, "b": 0 },
            },
        }),
        MapStyle::Plain => json!({
            "data": [{
                "type": "scatter",
                "x": lon,
                "y": lat,
                "mode": "markers",
                "marker": marker,
                "customdata": custom,
                "hovertemplate": hover,
            }],
            "layout": {
                "title": { "text": "Float Locations" },
                "xaxis": { "title": { "text": "Longitude" } },
                "yaxis": { "title": { "text": "Latitude" } },
            },
        }),
    }
}

fn map_center(lat: &[f64], lon: &[f64]) -> Value {
    if lat.is_empty() {
        return json!({ "lat": 0.0, "lon": 0.0 });
    }
    let n = lat.len() as f64;
    json!({
        "lat": lat.iter().sum::<f64>() / n,
        "lon": lon.iter().sum::<f64>() / n,
    })
}

/// Temperature on the bottom axis, salinity on a second axis at the top,
/// depth increasing downwards.
pub fn profile_figure(samples: &[DepthSample]) -> Value {
    let depth: Vec<f64> = samples.iter().map(|s| s.depth).collect();
    let temperature: Vec<f64> = samples.iter().map(|s| s.temperature).collect();
    let salinity: Vec<f64> = samples.iter().map(|s| s.salinity).collect();

    json!({
        "data": [
            {
                "type": "scatter",
                "x": temperature,
                "y": depth,
                "name": "Temperature (°C)",
                "mode": "lines+markers",
                "line": { "color": "red" },
            },
            {
                "type": "scatter",
                "x": salinity,
                "y": depth,
                "name": "Salinity (PSU)",
                "mode": "lines+markers",
                "line": { "color": "blue" },
                "xaxis": "x2",
            },
        ],
        "layout": {
            "title": { "text": "Temperature and Salinity Profiles" },
            "yaxis": { "title": { "text": "Depth (m)" }, "autorange": "reversed" },
            "xaxis": { "title": { "text": "Temperature (°C)" }, "color": "red" },
            "xaxis2": {
                "title": { "text": "Salinity (PSU)" },
                "overlaying": "x",
                "side": "top",
                "color": "blue",
            },
            "showlegend": true,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use floatscope_common::FloatMetadata;

    fn catalog() -> FloatCatalog {
        let meta = |platform: &str, lat: f64, lon: f64, date: &str| FloatMetadata {
            platform_number: platform.to_string(),
            project_name: "ARGO".to_string(),
            pi_name: "PI".to_string(),
            latitude: lat,
            longitude: lon,
            date: date.to_string(),
            extra: serde_json::Map::new(),
        };
        FloatCatalog::new(
            vec![meta("A", 10.0, 20.0, "20000701000000"), meta("B", -10.0, 40.0, "bad")],
            vec![vec![], vec![]],
        )
        .unwrap()
    }

    #[test]
    fn test_decimal_year() {
        let ts = NaiveDateTime::parse_from_str("20000101000000", "%Y%m%d%H%M%S").unwrap();
        assert_eq!(decimal_year(&ts), 2000.0);
        let mid = NaiveDateTime::parse_from_str("20010702120000", "%Y%m%d%H%M%S").unwrap();
        assert!((decimal_year(&mid) - 2001.5).abs() < 0.01);
    }

    #[test]
    fn test_map_figure_mapbox() {
        let fig = map_figure(&catalog(), MapStyle::Mapbox);
        let trace = &fig["data"][0];
        assert_eq!(trace["type"], "scattermapbox");
        assert_eq!(trace["lat"], json!([10.0, -10.0]));
        assert_eq!(trace["marker"]["color"][1], Value::Null);
        assert_eq!(trace["customdata"][1][2], "unknown");
        assert_eq!(fig["layout"]["mapbox"]["style"], "carto-positron");
        assert_eq!(fig["layout"]["mapbox"]["zoom"], 2);
        assert_eq!(fig["layout"]["mapbox"]["center"]["lon"], 30.0);
    }

    #[test]
    fn test_map_figure_plain_fallback() {
        let fig = map_figure(&catalog(), MapStyle::Plain);
        assert_eq!(fig["data"][0]["type"], "scatter");
        assert_eq!(fig["data"][0]["x"], json!([20.0, 40.0]));
        assert_eq!(fig["layout"]["xaxis"]["title"]["text"], "Longitude");
    }

    #[test]
    fn test_profile_figure_axes() {
        let samples = vec![
            DepthSample { depth: 0.0, temperature: 25.0, salinity: 35.0 },
            DepthSample { depth: 500.0, temperature: 8.0, salinity: 34.5 },
        ];
        let fig = profile_figure(&samples);
        assert_eq!(fig["data"][0]["x"], json!([25.0, 8.0]));
        assert_eq!(fig["data"][1]["xaxis"], "x2");
        assert_eq!(fig["data"][1]["y"], json!([0.0, 500.0]));
        assert_eq!(fig["layout"]["yaxis"]["autorange"], "reversed");
        assert_eq!(fig["layout"]["xaxis2"]["overlaying"], "x");
    }
}
