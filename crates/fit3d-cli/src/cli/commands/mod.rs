pub mod auth;
pub mod import;
pub mod scans;

pub use auth::{login, logout, status};
pub use import::run as import_run;
pub use scans::list as list_scans;
