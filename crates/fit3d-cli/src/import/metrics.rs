//! Static table of importable metrics
//!
//! Each scan carries six numeric body measurements. The table fixes their
//! reporting order and maps each one to its display name, unit, and a pure
//! accessor over the scan record.

use crate::client::ScanRecord;
use crate::store::{MetricKind, Unit};

/// Static description of one importable metric
pub struct MetricSpec {
    pub kind: MetricKind,
    pub name: &'static str,
    pub unit: Unit,
    accessor: fn(&ScanRecord) -> f64,
}

impl MetricSpec {
    /// Extract this metric's value from a scan
    pub fn value(&self, scan: &ScanRecord) -> f64 {
        (self.accessor)(scan)
    }
}

fn height(scan: &ScanRecord) -> f64 {
    scan.wellness_metrics.height
}

fn weight(scan: &ScanRecord) -> f64 {
    scan.wellness_metrics.weight
}

fn lean_mass(scan: &ScanRecord) -> f64 {
    scan.wellness_metrics.lean_mass
}

fn bmi(scan: &ScanRecord) -> f64 {
    scan.wellness_metrics.bmi
}

fn body_fat(scan: &ScanRecord) -> f64 {
    scan.wellness_metrics.bfp
}

fn waist(scan: &ScanRecord) -> f64 {
    scan.scan_measurement.waist_natural_girth
}

/// The six importable metrics, in reporting order.
pub const METRICS: [MetricSpec; 6] = [
    MetricSpec {
        kind: MetricKind::Height,
        name: "Height",
        unit: Unit::Inch,
        accessor: height,
    },
    MetricSpec {
        kind: MetricKind::BodyMass,
        name: "Weight",
        unit: Unit::Pound,
        accessor: weight,
    },
    MetricSpec {
        kind: MetricKind::LeanBodyMass,
        name: "Weight (lean)",
        unit: Unit::Pound,
        accessor: lean_mass,
    },
    MetricSpec {
        kind: MetricKind::BodyMassIndex,
        name: "BMI",
        unit: Unit::Count,
        accessor: bmi,
    },
    MetricSpec {
        kind: MetricKind::BodyFatPercentage,
        name: "Body Fat",
        unit: Unit::Percent,
        accessor: body_fat,
    },
    MetricSpec {
        kind: MetricKind::WaistCircumference,
        name: "Waist",
        unit: Unit::Inch,
        accessor: waist,
    },
];

/// All metric kinds, in the same order as [`METRICS`]
pub fn metric_kinds() -> Vec<MetricKind> {
    METRICS.iter().map(|spec| spec.kind).collect()
}
