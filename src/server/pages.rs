//! HTML rendering for the web dashboard and error pages

use chrono::{DateTime, Utc};
use std::fmt::Write as _;

use crate::data::FetchEnvelope;
use crate::view::{highlight, provinces, Card, Dashboard, Filters, Freshness};

fn base_template(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - smnview</title>
    <style>
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #74b9ff;
            color: #2d3436;
            line-height: 1.5;
        }}
        .container {{ max-width: 1400px; margin: 0 auto; padding: 20px; }}
        header {{ color: white; text-align: center; margin-bottom: 20px; }}
        .filters {{ display: flex; gap: 12px; flex-wrap: wrap; margin-bottom: 12px; }}
        .filters select, .filters input {{ padding: 8px 12px; border-radius: 8px; border: none; }}
        .filters .clear {{ padding: 8px 12px; border-radius: 8px; background: #d63031; color: white; text-decoration: none; }}
        .filters .clear.idle {{ opacity: 0.6; }}
        .meta {{ color: white; margin-bottom: 16px; }}
        .update-fresh {{ color: #55efc4; }}
        .update-old {{ color: #ffeaa7; }}
        .province-section {{ margin-bottom: 28px; }}
        .province-header {{ display: flex; justify-content: space-between; color: white; margin-bottom: 10px; }}
        .cards-grid {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 14px; }}
        .weather-card {{ background: white; border-radius: 12px; padding: 16px; }}
        .card-header {{ display: flex; justify-content: space-between; margin-bottom: 8px; }}
        .station-name {{ font-weight: bold; }}
        .temperature {{ font-size: 1.4em; color: #e17055; }}
        .info-item {{ display: flex; justify-content: space-between; font-size: 0.9em; }}
        .info-label {{ color: #636e72; }}
        .notice {{ background: white; border-radius: 12px; padding: 24px; text-align: center; }}
        mark {{ background: #ffeb3b; color: #333; padding: 0 2px; border-radius: 3px; }}
    </style>
</head>
<body>
    <div class="container">
        {}
    </div>
</body>
</html>"#,
        escape_html(title),
        content
    )
}

/// Escapes text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn error_page(title: &str, message: &str) -> String {
    base_template(
        title,
        &format!(
            r#"<div class="notice">
            <h1>{}</h1>
            <p>{}</p>
            <a href="/">Back to start</a>
        </div>"#,
            escape_html(title),
            escape_html(message)
        ),
    )
}

pub fn not_found_page() -> String {
    error_page("404 - File not found", "The requested file does not exist.")
}

pub fn server_error_page() -> String {
    error_page("500 - Server error", "Internal server error.")
}

/// Dashboard shown when the cache file cannot be loaded
pub fn load_error_page(message: &str) -> String {
    base_template(
        "Weather",
        &format!(
            r#"<header><h1>SMN Argentina weather</h1></header>
        <div class="notice"><p>Error loading weather data: {}</p></div>"#,
            escape_html(message)
        ),
    )
}

/// Renders the grouped station cards for one filter state
pub fn dashboard_page(envelope: &FetchEnvelope, filters: &Filters, now: DateTime<Utc>) -> String {
    let readings = envelope.readings().unwrap_or_default();
    let dashboard = Dashboard::build(readings, filters);
    let mut html = String::new();

    let _ = write!(
        html,
        r#"<header><h1>SMN Argentina weather</h1><p>Source: {}</p></header>"#,
        escape_html(&envelope.source)
    );

    // Filter form; the select submits on change, typing resubmits after a short
    // pause and Escape resets both filters
    let _ = write!(
        html,
        r#"<form class="filters" method="get" action="/">
            <select name="province" onchange="this.form.submit()">
                <option value="">All provinces</option>"#
    );
    for province in provinces(readings) {
        let selected = if province == filters.province() {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            html,
            r#"<option value="{0}"{1}>{0}</option>"#,
            escape_html(&province),
            selected
        );
    }
    let clear_label = match filters.active_count() {
        0 => "Clear".to_string(),
        n => format!("Clear ({})", n),
    };
    let _ = write!(
        html,
        r#"</select>
            <input type="search" id="searchInput" name="q" value="{}" placeholder="Search city..." oninput="scheduleSearch(this.form)" autofocus>
            <a class="clear{}" href="/">{}</a>
        </form>
        <script>
            var searchTimer;
            function scheduleSearch(form) {{
                clearTimeout(searchTimer);
                searchTimer = setTimeout(function () {{ form.submit(); }}, 250);
            }}
            var searchInput = document.getElementById('searchInput');
            searchInput.focus();
            searchInput.setSelectionRange(searchInput.value.length, searchInput.value.length);
            document.addEventListener('keydown', function (e) {{
                if (e.key === 'Escape') {{ window.location.href = '/'; }}
            }});
        </script>"#,
        escape_html(filters.search()),
        if filters.is_active() { "" } else { " idle" },
        clear_label
    );

    let freshness = Freshness::since(envelope.timestamp, now);
    let _ = write!(
        html,
        r#"<p class="meta">Last update: <strong>{}</strong> &bull; <span class="{}">{}</span></p>"#,
        envelope
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S"),
        if freshness.fresh {
            "update-fresh"
        } else {
            "update-old"
        },
        freshness.label
    );

    let stats = dashboard.stats;
    let _ = write!(
        html,
        r#"<p class="meta">Stations: <span id="totalStations">{}</span> &bull; Provinces: <span id="totalProvinces">{}</span>"#,
        stats.total_stations, stats.provinces_shown
    );
    if filters.is_active() {
        let _ = write!(
            html,
            r#" &bull; Matching: <span id="searchCount">{}</span>"#,
            stats.matching_stations
        );
    }
    html.push_str("</p>");

    if let Some(message) = &dashboard.message {
        let _ = write!(
            html,
            r#"<div class="notice" id="noResults"><p>{}</p></div>"#,
            escape_html(message)
        );
    }

    for group in &dashboard.groups {
        let _ = write!(
            html,
            r#"<div class="province-section">
            <div class="province-header"><h2 class="province-title">{}</h2><span class="province-count">{} stations</span></div>
            <div class="cards-grid">"#,
            escape_html(group.province),
            group.stations.len()
        );
        for station in &group.stations {
            html.push_str(&weather_card(&Card::from_reading(station), filters.search()));
        }
        html.push_str("</div></div>");
    }

    base_template("Weather", &html)
}

fn weather_card(card: &Card, search: &str) -> String {
    let name: String = highlight(&card.name, search)
        .into_iter()
        .map(|segment| {
            if segment.matched {
                format!("<mark>{}</mark>", escape_html(&segment.text))
            } else {
                escape_html(&segment.text)
            }
        })
        .collect();

    let info = |label: &str, value: &str| {
        format!(
            r#"<div class="info-item"><span class="info-label">{}</span><span class="info-value">{}</span></div>"#,
            label,
            escape_html(value)
        )
    };

    format!(
        r#"<div class="weather-card">
                <div class="card-header"><div class="station-name">{}</div><div class="temperature">{}</div></div>
                {}{}{}{}{}
            </div>"#,
        name,
        escape_html(&card.temperature),
        info("Humidity", &card.humidity),
        info("Wind", &card.wind_speed),
        info("Direction", &card.wind_direction),
        info("Feels like", &card.feels_like),
        info("Description", &card.description),
    )
}
