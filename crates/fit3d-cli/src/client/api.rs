//! Fit3D API client for authenticated requests
//!
//! This module provides a client for fetching scan records from the Fit3D
//! API using a captured session token, and the serde model for the records
//! endpoint's response shape.

use chrono::{DateTime, NaiveDateTime, Utc};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::client::token::SessionToken;
use crate::error::{Fit3dError, Result};

/// Records endpoint path on the API host
const RECORDS_PATH: &str = "/v1/records";

/// One body-measurement session's full metric payload.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    #[serde(deserialize_with = "deserialize_record_date")]
    pub record_date: DateTime<Utc>,
    pub id: i64,
    pub scan_measurement: ScanMeasurement,
    pub wellness_metrics: WellnessMetrics,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanMeasurement {
    pub waist_natural_girth: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WellnessMetrics {
    pub bmi: f64,
    pub bfp: f64,
    pub height: f64,
    pub lean_mass: f64,
    pub weight: f64,
}

/// Record dates arrive as "yyyy-MM-dd HH:mm:ss.SSS" in UTC.
fn deserialize_record_date<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_record_date(&s).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid record date: {}", s))
    })
}

/// Parse a record date string in the API's fixed format.
pub fn parse_record_date(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.3f")
        .ok()
        .map(|dt| dt.and_utc())
}

/// Fit3D API client
pub struct Fit3dClient {
    client: Client,
    base_url: String,
}

impl Fit3dClient {
    /// Create a new API client for the production host
    pub fn new() -> Self {
        Self::new_with_base_url("https://api.fit3d.com")
    }

    /// Create a new API client with a custom base URL (for testing)
    #[doc(hidden)]
    pub fn new_with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the full URL for a given path
    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build headers with authorization
    fn build_headers(&self, token: &SessionToken) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&token.authorization_header())
                .map_err(|_| Fit3dError::invalid_param("Token contains invalid characters"))?,
        );
        Ok(headers)
    }

    /// Fetch all scan records for the authenticated user.
    ///
    /// Returns the decoded records and a short availability message
    /// ("<n> available"). A 401 answer means the captured token has gone
    /// stale; an empty body or an undecodable one are reported as their own
    /// failure kinds so the caller can surface the exact reason.
    pub async fn fetch_records(&self, token: &SessionToken) -> Result<(Vec<ScanRecord>, String)> {
        let url = self.build_url(RECORDS_PATH);
        let headers = self.build_headers(token)?;

        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(Fit3dError::Http)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(Fit3dError::TokenExpired);
        }

        let body = response.text().await.map_err(Fit3dError::Http)?;
        if body.is_empty() {
            return Err(Fit3dError::ScansUnavailable);
        }

        let records: Vec<ScanRecord> =
            serde_json::from_str(&body).map_err(|_| Fit3dError::ScanFormat)?;

        let message = format!("{} available", records.len());
        Ok((records, message))
    }
}

impl Default for Fit3dClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_build_url() {
        let client = Fit3dClient::new();
        assert_eq!(
            client.build_url("/v1/records"),
            "https://api.fit3d.com/v1/records"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = Fit3dClient::new_with_base_url("http://localhost:8080/");
        assert_eq!(client.build_url("/v1/records"), "http://localhost:8080/v1/records");
    }

    #[test]
    fn test_parse_record_date() {
        let parsed = parse_record_date("2018-06-02 14:30:15.123").unwrap();
        assert_eq!(parsed.hour(), 14);
        assert_eq!(parsed.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_parse_record_date_rejects_other_formats() {
        assert!(parse_record_date("2018-06-02T14:30:15.123Z").is_none());
        assert!(parse_record_date("06/02/2018").is_none());
    }

    #[test]
    fn test_scan_record_decoding() {
        let json = r#"{
            "recordDate": "2018-06-02 14:30:15.123",
            "id": 42,
            "scanMeasurement": { "waistNaturalGirth": 34.25 },
            "wellnessMetrics": {
                "bmi": 24.1,
                "bfp": 18.5,
                "height": 70.5,
                "leanMass": 140.2,
                "weight": 172.0
            }
        }"#;

        let record: ScanRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 42);
        assert_eq!(record.scan_measurement.waist_natural_girth, 34.25);
        assert_eq!(record.wellness_metrics.weight, 172.0);
    }

    #[test]
    fn test_scan_record_rejects_missing_metrics() {
        let json = r#"{
            "recordDate": "2018-06-02 14:30:15.123",
            "id": 42,
            "scanMeasurement": { "waistNaturalGirth": 34.25 },
            "wellnessMetrics": { "bmi": 24.1 }
        }"#;

        assert!(serde_json::from_str::<ScanRecord>(json).is_err());
    }
}
