/// InfluxDB 2.x integration
///
/// This module provides:
/// - A thin HTTP client for the query and write endpoints
/// - Flux query construction for the volume window
/// - Annotated-CSV response decoding into domain samples
/// - Line-protocol encoding for derived points
/// - A repository trait so the aggregator never touches the wire directly

pub mod annotated_csv;
pub mod client;
pub mod flux;
pub mod line_protocol;
pub mod repository;

pub use client::{InfluxClient, InfluxError};
pub use repository::{InfluxSampleRepository, SampleRepository};
