use async_trait::async_trait;

use crate::config::AggregatorConfig;
use crate::influx::annotated_csv::parse_volume_samples;
use crate::influx::client::{InfluxClient, InfluxError};
use crate::influx::flux::volume_window_query;
use crate::models::{MovingAveragePoint, VolumeSample};

/// Sample repository trait - the store seam the aggregator depends on
///
/// One method per store capability the job uses: reading the raw volume
/// series for the lookback window, and writing a derived point back.
#[async_trait]
pub trait SampleRepository: Send + Sync {
    /// Fetch all volume samples within the configured lookback window
    async fn fetch_volume_samples(&self) -> Result<Vec<VolumeSample>, InfluxError>;

    /// Write one derived moving-average point to the target bucket
    async fn write_moving_average(&self, point: &MovingAveragePoint) -> Result<(), InfluxError>;
}

/// Concrete implementation of SampleRepository over the InfluxDB HTTP client
pub struct InfluxSampleRepository {
    client: InfluxClient,
    source_bucket: String,
    target_bucket: String,
    lookback_days: u32,
}

impl InfluxSampleRepository {
    /// Create a repository from a client and the run configuration
    pub fn new(client: InfluxClient, config: &AggregatorConfig) -> Self {
        Self {
            client,
            source_bucket: config.source_bucket.clone(),
            target_bucket: config.bucket.clone(),
            lookback_days: config.lookback_days,
        }
    }
}

#[async_trait]
impl SampleRepository for InfluxSampleRepository {
    async fn fetch_volume_samples(&self) -> Result<Vec<VolumeSample>, InfluxError> {
        let flux = volume_window_query(&self.source_bucket, self.lookback_days);
        let body = self.client.query(&flux).await?;
        let samples = parse_volume_samples(&body)?;

        tracing::debug!(
            "Fetched {} volume samples from bucket {}",
            samples.len(),
            self.source_bucket
        );

        Ok(samples)
    }

    async fn write_moving_average(&self, point: &MovingAveragePoint) -> Result<(), InfluxError> {
        let line = point.to_point().to_line_protocol().ok_or_else(|| {
            InfluxError::Encoding(format!("unwritable point for ticker {}", point.ticker))
        })?;

        self.client.write(&self.target_bucket, &line).await
    }
}
