// Library Crate Root
// lib.rs

pub mod aggregator;
pub mod config;
pub mod influx;
pub mod models;

pub use aggregator::{Aggregator, AggregatorError, RunOutcome, RunSummary};
pub use config::{AggregatorConfig, ConfigError};
pub use influx::{InfluxClient, InfluxError, InfluxSampleRepository, SampleRepository};
pub use models::{MovingAveragePoint, VolumeSample};
