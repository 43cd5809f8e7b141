//! Health-record store capability
//!
//! The import pipeline talks to an abstract [`HealthStore`]: authorize
//! access, query existing samples, save new ones. Implementations are
//! injected: [`sqlite::SqliteHealthStore`] persists to a local database,
//! [`memory::MemoryHealthStore`] backs tests and dry runs.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::error::Result;

pub use memory::MemoryHealthStore;
pub use sqlite::SqliteHealthStore;

/// One of the six tracked body measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Height,
    BodyMass,
    LeanBodyMass,
    BodyMassIndex,
    BodyFatPercentage,
    WaistCircumference,
}

impl MetricKind {
    /// Stable identifier used for storage
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Height => "height",
            MetricKind::BodyMass => "body_mass",
            MetricKind::LeanBodyMass => "lean_body_mass",
            MetricKind::BodyMassIndex => "body_mass_index",
            MetricKind::BodyFatPercentage => "body_fat_percentage",
            MetricKind::WaistCircumference => "waist_circumference",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "height" => Some(MetricKind::Height),
            "body_mass" => Some(MetricKind::BodyMass),
            "lean_body_mass" => Some(MetricKind::LeanBodyMass),
            "body_mass_index" => Some(MetricKind::BodyMassIndex),
            "body_fat_percentage" => Some(MetricKind::BodyFatPercentage),
            "waist_circumference" => Some(MetricKind::WaistCircumference),
            _ => None,
        }
    }
}

/// Measurement unit attached to a sample value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Pound,
    Kilogram,
    Inch,
    Centimeter,
    Count,
    Percent,
}

/// What a unit measures. Conversions only exist within a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Mass,
    Length,
    Count,
    Percent,
}

impl Unit {
    pub fn dimension(&self) -> Dimension {
        match self {
            Unit::Pound | Unit::Kilogram => Dimension::Mass,
            Unit::Inch | Unit::Centimeter => Dimension::Length,
            Unit::Count => Dimension::Count,
            Unit::Percent => Dimension::Percent,
        }
    }

    /// Factor to the dimension's base unit (grams for mass, centimeters
    /// for length, 1 otherwise).
    fn base_factor(&self) -> f64 {
        match self {
            Unit::Pound => 453.59237,
            Unit::Kilogram => 1000.0,
            Unit::Inch => 2.54,
            Unit::Centimeter => 1.0,
            Unit::Count | Unit::Percent => 1.0,
        }
    }

    /// Convert a value between units of the same dimension.
    /// Identity conversions return the value bit-for-bit unchanged.
    pub fn convert(value: f64, from: Unit, to: Unit) -> Option<f64> {
        if from == to {
            return Some(value);
        }
        if from.dimension() != to.dimension() {
            return None;
        }
        Some(value * from.base_factor() / to.base_factor())
    }

    /// Stable identifier used for storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Pound => "lb",
            Unit::Kilogram => "kg",
            Unit::Inch => "in",
            Unit::Centimeter => "cm",
            Unit::Count => "count",
            Unit::Percent => "percent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "lb" => Some(Unit::Pound),
            "kg" => Some(Unit::Kilogram),
            "in" => Some(Unit::Inch),
            "cm" => Some(Unit::Centimeter),
            "count" => Some(Unit::Count),
            "percent" => Some(Unit::Percent),
            _ => None,
        }
    }
}

/// A single (kind, value, unit, timestamp) health record unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub kind: MetricKind,
    pub value: f64,
    pub unit: Unit,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Sample {
    /// A sample whose start and end coincide (a point-in-time measurement)
    pub fn point(kind: MetricKind, value: f64, unit: Unit, date: DateTime<Utc>) -> Self {
        Self {
            kind,
            value,
            unit,
            start: date,
            end: date,
        }
    }

    /// The sample's value converted into the given unit, if compatible.
    pub fn value_in(&self, unit: Unit) -> Option<f64> {
        Unit::convert(self.value, self.unit, unit)
    }
}

/// Per-kind authorization state tracked by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Denied,
    Authorized,
}

impl AuthorizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationStatus::NotDetermined => "not_determined",
            AuthorizationStatus::Denied => "denied",
            AuthorizationStatus::Authorized => "authorized",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_determined" => Some(AuthorizationStatus::NotDetermined),
            "denied" => Some(AuthorizationStatus::Denied),
            "authorized" => Some(AuthorizationStatus::Authorized),
            _ => None,
        }
    }
}

/// Why a save was refused. These terminate only the metric import that
/// produced them and surface as a status line, never as a raised fault.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SaveError {
    #[error("Permission denied")]
    PermissionDenied,

    #[error("Value already exists")]
    AlreadyExists,

    #[error("Unknown error")]
    Unknown,

    #[error("{0}")]
    Other(String),
}

/// Capability to authorize access, query existing samples, and save new ones.
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Request read and/or write authorization for the given kinds in one
    /// call. `Ok(true)` means the request resolved (whatever the user
    /// chose); `Ok(false)` means it was canceled.
    async fn request_authorization(
        &self,
        kinds: &[MetricKind],
        read: bool,
        write: bool,
    ) -> Result<bool>;

    /// Current authorization state for one kind
    fn authorization_status(&self, kind: MetricKind) -> AuthorizationStatus;

    /// Samples of `kind` with start time >= `starting_at`, most recent
    /// first, at most `limit` of them.
    async fn query(
        &self,
        kind: MetricKind,
        starting_at: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Sample>>;

    /// Persist one sample
    async fn save(&self, sample: Sample) -> std::result::Result<(), SaveError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_identity_conversion_is_exact() {
        let value = 172.4567891;
        assert_eq!(Unit::convert(value, Unit::Pound, Unit::Pound), Some(value));
    }

    #[test]
    fn test_unit_mass_conversion() {
        let grams_per_pound = Unit::convert(1.0, Unit::Pound, Unit::Kilogram).unwrap();
        assert!((grams_per_pound - 0.45359237).abs() < 1e-12);
    }

    #[test]
    fn test_unit_length_conversion() {
        assert_eq!(Unit::convert(1.0, Unit::Inch, Unit::Centimeter), Some(2.54));
    }

    #[test]
    fn test_unit_cross_dimension_rejected() {
        assert_eq!(Unit::convert(1.0, Unit::Pound, Unit::Inch), None);
        assert_eq!(Unit::convert(1.0, Unit::Percent, Unit::Count), None);
    }

    #[test]
    fn test_kind_and_unit_storage_round_trip() {
        for kind in [
            MetricKind::Height,
            MetricKind::BodyMass,
            MetricKind::LeanBodyMass,
            MetricKind::BodyMassIndex,
            MetricKind::BodyFatPercentage,
            MetricKind::WaistCircumference,
        ] {
            assert_eq!(MetricKind::parse(kind.as_str()), Some(kind));
        }
        for unit in [
            Unit::Pound,
            Unit::Kilogram,
            Unit::Inch,
            Unit::Centimeter,
            Unit::Count,
            Unit::Percent,
        ] {
            assert_eq!(Unit::parse(unit.as_str()), Some(unit));
        }
    }

    #[test]
    fn test_point_sample_start_equals_end() {
        let date = Utc::now();
        let sample = Sample::point(MetricKind::BodyMass, 172.0, Unit::Pound, date);
        assert_eq!(sample.start, sample.end);
        assert_eq!(sample.start, date);
    }

    #[test]
    fn test_save_error_messages() {
        assert_eq!(SaveError::PermissionDenied.to_string(), "Permission denied");
        assert_eq!(SaveError::AlreadyExists.to_string(), "Value already exists");
        assert_eq!(SaveError::Unknown.to_string(), "Unknown error");
        assert_eq!(
            SaveError::Other("disk full".to_string()).to_string(),
            "disk full"
        );
    }
}
