pub mod config;
pub mod encoding;
pub mod run;
pub mod telemetry;
