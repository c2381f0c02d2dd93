//! Argument parsing shared by the record commands

use std::collections::BTreeSet;

use anyhow::{Context, Result};

use crate::domain::{parse_terms, Certification, GeoPoint, Location, TimeWindow};

/// Builds a location from a site name and optional `lat,lon`
pub fn location(name: &str, coords: Option<&str>) -> Result<Location> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Location name cannot be empty");
    }
    let mut location = Location::named(name);
    if let Some(coords) = coords {
        let point: GeoPoint = coords
            .parse()
            .with_context(|| format!("Invalid coordinates '{}'", coords))?;
        location = location.with_coordinates(point);
    }
    Ok(location)
}

pub fn terms(list: Option<&str>) -> BTreeSet<String> {
    list.map(parse_terms).unwrap_or_default()
}

/// Parses `name[@expiry]` entries separated by commas
pub fn certifications(list: Option<&str>) -> Result<Vec<Certification>> {
    terms(list)
        .iter()
        .map(|entry| {
            entry
                .parse::<Certification>()
                .with_context(|| format!("Invalid certification '{}'", entry))
        })
        .collect()
}

pub fn window(start: &str, end: &str) -> Result<TimeWindow> {
    TimeWindow::parse(start, end).with_context(|| format!("Invalid window {} .. {}", start, end))
}

/// Joins a term set for table cells
pub fn joined<'a>(terms: impl IntoIterator<Item = &'a String>) -> String {
    let list: Vec<&str> = terms.into_iter().map(String::as_str).collect();
    if list.is_empty() {
        "-".to_string()
    } else {
        list.join(", ")
    }
}
