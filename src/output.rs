//! Output formatting for page data.
//!
//! Supports JSON serialization and plain-text tables.

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;

use crate::feedback::FeedbackEntry;
use crate::views::{ChartsView, HomeView, MapView, Page};

/// Writes `value` as pretty-printed JSON followed by a newline.
pub fn write_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Formats an average dock count to two decimals, or `n/a` when there is no data.
pub fn format_average(average: Option<f64>) -> String {
    match average {
        Some(avg) => format!("{avg:.2}"),
        None => "n/a".to_string(),
    }
}

fn heading(out: &mut String, page: Page) {
    let _ = writeln!(out, "== {} ==", page.title());
}

pub fn render_home(home: &HomeView) -> String {
    let mut out = String::new();
    heading(&mut out, Page::Home);
    let _ = writeln!(out, "{}", home.title);
    let _ = writeln!(out, "{}", home.tagline);
    let _ = writeln!(out, "[image: {}]", home.image);
    let _ = writeln!(
        out,
        "{} stations across {} districts",
        home.stations, home.districts
    );
    out
}

pub fn render_map(map: &MapView) -> String {
    let mut out = String::new();
    heading(&mut out, Page::MapVisualization);
    let _ = writeln!(out, "District: {}", map.district);
    let _ = writeln!(
        out,
        "Average number of docks: {}",
        format_average(map.average_docks)
    );
    let _ = writeln!(out, "Stations: {}", map.points.len());

    for p in &map.points {
        let _ = writeln!(
            out,
            "  {:>10.6} {:>11.6}  {} | {} | {} | {}",
            p.latitude,
            p.longitude,
            p.name,
            p.district,
            p.deployment_year
                .map_or_else(|| "-".to_string(), |y| y.to_string()),
            p.total_docks
                .map_or_else(|| "-".to_string(), |d| d.to_string()),
        );
    }
    out
}

pub fn render_charts(charts: &ChartsView) -> String {
    let mut out = String::new();
    heading(&mut out, Page::Charts);

    let _ = writeln!(out, "Deployment Year Distribution");
    for y in &charts.deployment_years {
        let _ = writeln!(out, "  {:<6} {:>5}  {:>5.1}%", y.year, y.count, y.percent);
    }

    let _ = writeln!(out, "Number of Stations per District");
    for d in &charts.stations_per_district {
        let _ = writeln!(out, "  {:<20} {:>5}", d.district, d.stations);
    }

    let _ = writeln!(out, "Average Docks per Station per District");
    for d in &charts.avg_docks_per_district {
        let _ = writeln!(out, "  {:<20} {:>8.2}", d.district, d.average_docks);
    }
    out
}

pub fn render_districts(options: &[String]) -> String {
    options.iter().fold(String::new(), |mut out, option| {
        let _ = writeln!(out, "{option}");
        out
    })
}

pub fn render_feedback(entries: &[FeedbackEntry]) -> String {
    let mut out = String::new();
    heading(&mut out, Page::Feedback);
    if entries.is_empty() {
        let _ = writeln!(out, "No feedback yet.");
    }
    for entry in entries {
        let _ = writeln!(out, "  [{}/5] {}", entry.rating, entry.text);
    }
    out
}
