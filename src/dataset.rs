//! CSV ingestion and result egress.
//!
//! A raw row is whatever the scrapers produced: free-text prices, review
//! counts and distances. Loading runs every row through the normalizer so
//! the pipeline core only ever sees cleaned `Listing`s.

use std::fs::File;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::models::{LinkReport, Listing};
use crate::normalize;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One unprocessed row as scraped from a booking source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawListing {
    pub title: String,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub distance_center: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub review_score: Option<String>,
    #[serde(default)]
    pub review_word: Option<String>,
    #[serde(default)]
    pub review_count: Option<String>,
    #[serde(default)]
    pub nights: Option<u32>,
    #[serde(default)]
    pub persons: Option<u32>,
    #[serde(default)]
    pub stay_start: Option<String>,
    #[serde(default)]
    pub stay_end: Option<String>,
    #[serde(default)]
    pub stay_year: Option<i32>,
}

/// Load a CSV of raw listings and normalize each row.
///
/// The `title` column is required; anything else is optional. Source ids are
/// synthesized as `"{source_label}-{row_index}"`.
pub fn load_listings(path: &Path, source_label: &str) -> Result<Vec<Listing>, DatasetError> {
    let mut reader = csv::Reader::from_path(path)?;
    if !reader.headers()?.iter().any(|header| header == "title") {
        return Err(DatasetError::MissingColumn("title"));
    }

    let mut listings = Vec::new();
    for (index, row) in reader.deserialize::<RawListing>().enumerate() {
        let raw = row?;
        listings.push(to_listing(&raw, format!("{source_label}-{index}")));
    }

    info!(
        source = source_label,
        listings = listings.len(),
        "loaded dataset"
    );
    Ok(listings)
}

/// Normalize one raw row into an immutable pipeline record.
pub fn to_listing(raw: &RawListing, source_id: String) -> Listing {
    let year = raw.stay_year.unwrap_or(0);
    Listing {
        source_id,
        title_normalized: normalize::normalize_title(&raw.title),
        title: raw.title.clone(),
        city_normalized: raw.city.as_deref().map(normalize::normalize_city),
        city: raw.city.clone(),
        zone: raw.zone.clone(),
        price: raw.price.as_deref().and_then(normalize::parse_price),
        distance_center_km: raw
            .distance_center
            .as_deref()
            .and_then(normalize::parse_distance_center),
        review_score: raw
            .review_score
            .as_deref()
            .and_then(normalize::parse_review_score),
        review_word: raw.review_word.clone(),
        review_count: raw
            .review_count
            .as_deref()
            .and_then(normalize::parse_review_count),
        nights: raw.nights,
        persons: raw.persons,
        stay_start: raw
            .stay_start
            .as_deref()
            .and_then(|d| normalize::parse_stay_date(d, year)),
        stay_end: raw
            .stay_end
            .as_deref()
            .and_then(|d| normalize::parse_stay_date(d, year)),
    }
}

/// Write the matched table as CSV, one row per linked record.
pub fn write_csv(path: &Path, report: &LinkReport) -> Result<(), DatasetError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in &report.records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the full report, summary fields included, as pretty JSON.
pub fn write_json(path: &Path, report: &LinkReport) -> Result<(), DatasetError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_normalizes_rows() {
        let file = write_temp(
            "title,city,price,review_count,distance_center,stay_start,stay_year\n\
             Hotel Roma Centro,Roma,€ 1.234,12 recensioni,A 350 m dal centro,1 luglio,2025\n",
        );

        let listings = load_listings(file.path(), "booking").unwrap();
        assert_eq!(listings.len(), 1);

        let listing = &listings[0];
        assert_eq!(listing.source_id, "booking-0");
        assert_eq!(listing.title, "Hotel Roma Centro");
        assert_eq!(listing.title_normalized, "centro hotel roma");
        assert_eq!(listing.city_normalized.as_deref(), Some("roma"));
        assert_eq!(listing.price, Some(1234));
        assert_eq!(listing.review_count, Some(12));
        assert_eq!(listing.distance_center_km, Some(0.35));
        assert_eq!(
            listing.stay_start,
            chrono::NaiveDate::from_ymd_opt(2025, 7, 1)
        );
    }

    #[test]
    fn test_missing_title_column_is_schema_error() {
        let file = write_temp("name,city\nHotel Roma,Roma\n");

        match load_listings(file.path(), "booking") {
            Err(DatasetError::MissingColumn("title")) => {}
            other => panic!("expected missing column error, got {other:?}"),
        }
    }

    #[test]
    fn test_optional_columns_default_to_none() {
        let file = write_temp("title\nHotel Roma\n");

        let listings = load_listings(file.path(), "agoda").unwrap();
        let listing = &listings[0];
        assert_eq!(listing.city, None);
        assert_eq!(listing.price, None);
        assert_eq!(listing.review_count, None);
        assert_eq!(listing.stay_start, None);
    }
}
