pub mod config;
pub mod dossier;
pub mod error;
pub mod report;
pub mod telemetry;
