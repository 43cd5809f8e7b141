//! Import pipeline
//!
//! Orchestrates one import run: request store authorization once, then
//! import every scan strictly one at a time, each scan's six metrics
//! strictly one at a time, each metric as a read-then-maybe-write pair.
//! Sequencing is expressed as plain sequential awaits; nothing in a run
//! executes concurrently with anything else.

use log::debug;

use crate::client::ScanRecord;
use crate::import::format;
use crate::import::metrics::{metric_kinds, MetricSpec, METRICS};
use crate::import::report::ReportSink;
use crate::store::{AuthorizationStatus, HealthStore, Sample};

/// How many samples the duplicate check reads back
const DUPLICATE_QUERY_LIMIT: usize = 10;

/// How an import run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Every scan reached its terminal state
    Completed,
    /// The authorization request was canceled; no scans were processed
    Canceled,
}

/// Top-level orchestrator for one batch of scans
pub struct ImportPipeline<'a> {
    store: &'a dyn HealthStore,
}

impl<'a> ImportPipeline<'a> {
    pub fn new(store: &'a dyn HealthStore) -> Self {
        Self { store }
    }

    /// Run the full import. Returning is the completion signal; per-item
    /// failures are reported through the sink and never surface as errors.
    pub async fn run(&self, scans: &[ScanRecord], sink: &mut dyn ReportSink) -> PipelineOutcome {
        let kinds = metric_kinds();

        // A prompt appears only if some kind has no recorded decision yet
        let prompt_will_appear = kinds
            .iter()
            .any(|&kind| self.store.authorization_status(kind) == AuthorizationStatus::NotDetermined);

        if prompt_will_appear {
            sink.message("Requesting permission...");
        }

        // Write access imports new values; read access powers the duplicate check
        let resolved = self
            .store
            .request_authorization(&kinds, true, true)
            .await
            .unwrap_or(false);

        if !resolved {
            sink.result("✗ Canceled");
            return PipelineOutcome::Canceled;
        }

        // If a prompt appeared, report what the user chose
        if prompt_will_appear {
            let authorized = self.count_status(&kinds, AuthorizationStatus::Authorized);
            let denied = self.count_status(&kinds, AuthorizationStatus::Denied);

            if authorized == kinds.len() {
                sink.result("✓ Granted");
            } else if denied == kinds.len() {
                sink.result("✗ Denied");
            } else {
                sink.result(&format!("- {} of {} granted", authorized, kinds.len()));
            }
        }

        debug!("importing {} scans", scans.len());
        for scan in scans {
            self.import_scan(scan, sink).await;
        }

        PipelineOutcome::Completed
    }

    fn count_status(&self, kinds: &[crate::store::MetricKind], status: AuthorizationStatus) -> usize {
        kinds
            .iter()
            .filter(|&&kind| self.store.authorization_status(kind) == status)
            .count()
    }

    /// Import one scan: all six metrics, in table order, each to its
    /// terminal state before the next starts.
    async fn import_scan(&self, scan: &ScanRecord, sink: &mut dyn ReportSink) {
        sink.message(&format!(
            "Importing scan from {}...",
            format::scan_date(scan.record_date, format::REPORT_TIME_ZONE)
        ));

        // Each value is imported individually: a kind the user denied must
        // not keep the other five from being saved.
        for spec in &METRICS {
            self.import_sample(scan, spec, sink).await;
        }
    }

    /// Import one metric of one scan. Emits exactly one result line:
    /// skip, success, or a failure reason.
    async fn import_sample(&self, scan: &ScanRecord, spec: &MetricSpec, sink: &mut dyn ReportSink) {
        let value = spec.value(scan);
        let date = scan.record_date;

        let existing = match self.store.query(spec.kind, date, DUPLICATE_QUERY_LIMIT).await {
            Ok(samples) => samples,
            Err(error) => {
                sink.result(&format!("✗ {}: {}", spec.name, error));
                return;
            }
        };

        // Only the most recent sample is inspected. A duplicate means the
        // same instant and the exact same value in this metric's unit.
        let duplicate = existing.first().is_some_and(|candidate| {
            candidate.start == date && candidate.value_in(spec.unit) == Some(value)
        });

        if duplicate {
            sink.result(&format!("- {}: Already exists", spec.name));
            return;
        }

        let sample = Sample::point(spec.kind, value, spec.unit, date);
        match self.store.save(sample).await {
            Ok(()) => {
                sink.result(&format!(
                    "✓ {}: {}{}",
                    spec.name,
                    format::decimal(value, 2),
                    format::unit_suffix(spec.unit)
                ));
            }
            Err(error) => {
                sink.result(&format!("✗ {}: {}", spec.name, error));
            }
        }
    }
}
