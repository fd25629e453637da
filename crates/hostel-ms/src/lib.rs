pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod records;
pub mod relations;
pub mod reports;
pub mod sequence;
pub mod service;
pub mod store;
pub mod telemetry;
