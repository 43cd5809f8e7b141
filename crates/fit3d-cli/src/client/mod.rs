pub mod api;
pub mod auth;
pub mod token;

pub use api::{Fit3dClient, ScanMeasurement, ScanRecord, WellnessMetrics};
pub use auth::{AuthSession, ProbeOutcome};
pub use token::SessionToken;
