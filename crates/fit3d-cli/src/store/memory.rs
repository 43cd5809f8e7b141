//! In-memory health-record store
//!
//! Backs deterministic tests and `import run --dry-run`. Authorization
//! prompts are scripted: the store answers a request the way the test (or
//! dry run) configured it to.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::store::{AuthorizationStatus, HealthStore, MetricKind, Sample, SaveError};

/// How the store answers an authorization prompt.
#[derive(Debug, Clone, Default)]
pub enum PromptResponse {
    /// Authorize every requested kind (the default)
    #[default]
    GrantAll,
    /// Deny every requested kind
    DenyAll,
    /// Authorize only the listed kinds, deny the rest
    Grant(Vec<MetricKind>),
    /// The request itself is canceled
    Cancel,
}

#[derive(Default)]
struct Inner {
    samples: Vec<Sample>,
    statuses: HashMap<MetricKind, AuthorizationStatus>,
    prompt_response: PromptResponse,
    fail_saves_with: Option<SaveError>,
}

/// Health store held entirely in memory
#[derive(Default)]
pub struct MemoryHealthStore {
    inner: Mutex<Inner>,
}

impl MemoryHealthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script how the next authorization request is answered
    pub fn respond_to_prompt_with(&self, response: PromptResponse) {
        self.inner.lock().unwrap().prompt_response = response;
    }

    /// Force a specific authorization state for one kind
    pub fn set_status(&self, kind: MetricKind, status: AuthorizationStatus) {
        self.inner.lock().unwrap().statuses.insert(kind, status);
    }

    /// Make every subsequent save fail with the given error
    pub fn fail_saves_with(&self, error: SaveError) {
        self.inner.lock().unwrap().fail_saves_with = Some(error);
    }

    /// Snapshot of everything saved so far
    pub fn samples(&self) -> Vec<Sample> {
        self.inner.lock().unwrap().samples.clone()
    }
}

#[async_trait]
impl HealthStore for MemoryHealthStore {
    async fn request_authorization(
        &self,
        kinds: &[MetricKind],
        _read: bool,
        _write: bool,
    ) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();

        let response = inner.prompt_response.clone();
        if matches!(response, PromptResponse::Cancel) {
            return Ok(false);
        }

        // Only undetermined kinds are up for decision; recorded choices stand.
        for &kind in kinds {
            let current = inner
                .statuses
                .get(&kind)
                .copied()
                .unwrap_or(AuthorizationStatus::NotDetermined);
            if current != AuthorizationStatus::NotDetermined {
                continue;
            }

            let status = match &response {
                PromptResponse::GrantAll => AuthorizationStatus::Authorized,
                PromptResponse::DenyAll => AuthorizationStatus::Denied,
                PromptResponse::Grant(granted) => {
                    if granted.contains(&kind) {
                        AuthorizationStatus::Authorized
                    } else {
                        AuthorizationStatus::Denied
                    }
                }
                PromptResponse::Cancel => unreachable!(),
            };
            inner.statuses.insert(kind, status);
        }

        Ok(true)
    }

    fn authorization_status(&self, kind: MetricKind) -> AuthorizationStatus {
        self.inner
            .lock()
            .unwrap()
            .statuses
            .get(&kind)
            .copied()
            .unwrap_or(AuthorizationStatus::NotDetermined)
    }

    async fn query(
        &self,
        kind: MetricKind,
        starting_at: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Sample>> {
        let inner = self.inner.lock().unwrap();

        let mut matching: Vec<Sample> = inner
            .samples
            .iter()
            .filter(|s| s.kind == kind && s.start >= starting_at)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.start.cmp(&a.start));
        matching.truncate(limit);

        Ok(matching)
    }

    async fn save(&self, sample: Sample) -> std::result::Result<(), SaveError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(error) = &inner.fail_saves_with {
            return Err(error.clone());
        }

        let status = inner
            .statuses
            .get(&sample.kind)
            .copied()
            .unwrap_or(AuthorizationStatus::NotDetermined);
        if status != AuthorizationStatus::Authorized {
            return Err(SaveError::PermissionDenied);
        }

        let duplicate = inner.samples.iter().any(|s| {
            s.kind == sample.kind
                && s.start == sample.start
                && s.value == sample.value
                && s.unit == sample.unit
        });
        if duplicate {
            return Err(SaveError::AlreadyExists);
        }

        inner.samples.push(sample);
        Ok(())
    }
}
