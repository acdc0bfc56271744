//! HTML for the weather card, the per-strategy page around it and the index.

use chrono::SecondsFormat;
use std::time::Duration;

use super::RenderStrategy;
use crate::models::weather::WeatherSnapshot;

/// Display-ready strings for one weather card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFields {
    pub title: String,
    pub render_type: String,
    pub location: String,
    pub temperature: String,
    pub wind: String,
    pub rendered_at: String,
}

pub fn card_fields(title: &str, snapshot: &WeatherSnapshot, render_type: &str) -> CardFields {
    CardFields {
        title: title.to_string(),
        render_type: render_type.to_string(),
        location: snapshot.location.clone(),
        temperature: format!("{}°C", snapshot.temperature),
        wind: format!("{} km/h", snapshot.wind_speed),
        rendered_at: snapshot.time.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

pub fn render_card(fields: &CardFields) -> String {
    format!(
        r#"<div class="card">
  <h2>{title}</h2>
  <p class="render-type">Rendered via {render_type}</p>
  <div class="data">
    <p><strong>Location:</strong> {location}</p>
    <p><strong>Temperature:</strong> {temperature}</p>
    <p><strong>Wind Speed:</strong> {wind}</p>
    <p class="rendered-at">Rendered at: {rendered_at}</p>
  </div>
</div>"#,
        title = escape_html(&fields.title),
        render_type = escape_html(&fields.render_type),
        location = escape_html(&fields.location),
        temperature = escape_html(&fields.temperature),
        wind = escape_html(&fields.wind),
        rendered_at = escape_html(&fields.rendered_at)
    )
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{}</title>
</head>
<body>
{}
</body>
</html>
"#,
        escape_html(title),
        body
    )
}

fn render_info(strategy: &RenderStrategy, render_time: Duration) -> String {
    let info = strategy.info();
    let list = |items: &[&str]| {
        items
            .iter()
            .map(|i| format!("<li>{}</li>", escape_html(i)))
            .collect::<Vec<_>>()
            .join("")
    };
    format!(
        r#"<section class="render-info">
  <h2>{title}</h2>
  <p>{description}</p>
  <h3>Pros</h3><ul>{pros}</ul>
  <h3>Cons</h3><ul>{cons}</ul>
  <p>Server Render: {ms:.2}ms</p>
  <p>Render Type: {short}</p>
</section>
<p><a href="/">&larr; Back to Home</a></p>"#,
        title = escape_html(info.title),
        description = escape_html(info.description),
        pros = list(info.pros),
        cons = list(info.cons),
        ms = render_time.as_secs_f64() * 1000.0,
        short = strategy.short_name()
    )
}

pub fn render_page(strategy: &RenderStrategy, fields: &CardFields, render_time: Duration) -> String {
    let body = format!("{}\n{}", render_card(fields), render_info(strategy, render_time));
    layout(&fields.title, &body)
}

pub fn render_index(strategies: &[RenderStrategy]) -> String {
    let links = strategies
        .iter()
        .map(|s| {
            format!(
                r#"<a href="{}"><div class="card"><h2>{}</h2><p>{}</p></div></a>"#,
                s.path(),
                s.short_name(),
                escape_html(s.summary())
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        r#"<header>
<h1>Weather Playground</h1>
<p>Explore rendering strategies with live weather data.</p>
</header>
<nav>
{}
</nav>"#,
        links
    );
    layout("Weather Playground", &body)
}
