/// Moving-average aggregation core
///
/// One batch pass over the raw volume series: fetch, partition by ticker,
/// trailing-window mean, write one derived point per qualifying ticker.
/// Stateless across invocations and idempotent in effect.

pub mod partition;
pub mod window;

use std::sync::Arc;

use thiserror::Error;

use crate::influx::{InfluxError, SampleRepository};
use crate::models::MovingAveragePoint;

pub use partition::partition_by_ticker;
pub use window::trailing_mean;

/// Why a ticker produced no derived point in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Every value in the partition was null
    NoValidVolume,

    /// No defined trailing mean at the last position (partition shorter
    /// than the window, or a null inside the trailing window)
    InsufficientData,
}

/// One skipped ticker with its reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: SkipReason,
}

/// Summary of a completed run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Points written, in write order
    pub written: Vec<MovingAveragePoint>,

    /// Tickers that produced no point, with reasons
    pub skipped: Vec<SkippedTicker>,
}

/// Structured result of one aggregation run
///
/// The caller (not this core) decides how outcomes map to logging and
/// process exit codes.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The fetch returned no samples at all; nothing was written
    NoData,

    /// The run completed; the summary lists written points and skips
    Completed(RunSummary),
}

/// Aggregation run failures
#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("Failed to fetch volume samples: {0}")]
    Fetch(#[source] InfluxError),

    /// Writes abort on first failure: `written` points were stored before
    /// the failing ticker and the remaining tickers were not attempted
    #[error("Failed to write moving average for {ticker} after {written} successful writes: {source}")]
    Write {
        ticker: String,
        written: usize,
        #[source]
        source: InfluxError,
    },
}

/// Moving-average aggregator
pub struct Aggregator {
    repository: Arc<dyn SampleRepository>,
    window: usize,
}

impl Aggregator {
    /// Create an aggregator over a sample repository
    pub fn new(repository: Arc<dyn SampleRepository>, window: usize) -> Self {
        Self { repository, window }
    }

    /// Perform one aggregation run
    ///
    /// Per-ticker data problems (all-null partitions, too little trailing
    /// data) are warnings that skip the ticker; fetch and write failures
    /// are errors that end the run.
    pub async fn run(&self) -> Result<RunOutcome, AggregatorError> {
        tracing::info!(
            "Starting moving-average aggregation run (window: {} samples)",
            self.window
        );

        let samples = self
            .repository
            .fetch_volume_samples()
            .await
            .map_err(AggregatorError::Fetch)?;

        if samples.is_empty() {
            tracing::warn!("No data retrieved from InfluxDB");
            return Ok(RunOutcome::NoData);
        }

        let partitions = partition_by_ticker(samples);
        let mut summary = RunSummary::default();

        for (ticker, partition) in partitions {
            if partition.iter().all(|sample| sample.volume.is_none()) {
                tracing::warn!("No valid volume data for {}. Skipping this ticker", ticker);
                summary.skipped.push(SkippedTicker {
                    ticker,
                    reason: SkipReason::NoValidVolume,
                });
                continue;
            }

            let values: Vec<Option<f64>> = partition.iter().map(|sample| sample.volume).collect();
            let means = trailing_mean(&values, self.window);

            let Some(Some(average)) = means.last().copied() else {
                tracing::warn!(
                    "Insufficient data to calculate moving average for {}",
                    ticker
                );
                summary.skipped.push(SkippedTicker {
                    ticker,
                    reason: SkipReason::InsufficientData,
                });
                continue;
            };

            // Partitions are never empty here; guard anyway instead of unwrapping
            let Some(last) = partition.last() else {
                continue;
            };
            let point = MovingAveragePoint::new(ticker.clone(), average, last.time);

            self.repository
                .write_moving_average(&point)
                .await
                .map_err(|source| AggregatorError::Write {
                    ticker: ticker.clone(),
                    written: summary.written.len(),
                    source,
                })?;

            tracing::info!("Stored moving average for {}: {}", ticker, average);
            summary.written.push(point);
        }

        tracing::info!(
            "Aggregation run completed: {} written, {} skipped",
            summary.written.len(),
            summary.skipped.len()
        );

        Ok(RunOutcome::Completed(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::Mutex;

    use crate::models::VolumeSample;

    struct MockRepository {
        samples: Vec<VolumeSample>,
        written: Mutex<Vec<MovingAveragePoint>>,
        fail_write_for: Option<String>,
    }

    impl MockRepository {
        fn new(samples: Vec<VolumeSample>) -> Self {
            Self {
                samples,
                written: Mutex::new(Vec::new()),
                fail_write_for: None,
            }
        }

        fn failing_on(samples: Vec<VolumeSample>, ticker: &str) -> Self {
            Self {
                fail_write_for: Some(ticker.to_string()),
                ..Self::new(samples)
            }
        }

        fn written(&self) -> Vec<MovingAveragePoint> {
            self.written.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SampleRepository for MockRepository {
        async fn fetch_volume_samples(&self) -> Result<Vec<VolumeSample>, InfluxError> {
            Ok(self.samples.clone())
        }

        async fn write_moving_average(
            &self,
            point: &MovingAveragePoint,
        ) -> Result<(), InfluxError> {
            if self.fail_write_for.as_deref() == Some(point.ticker.as_str()) {
                return Err(InfluxError::Api {
                    status: 500,
                    message: "write failed".to_string(),
                });
            }
            self.written.lock().unwrap().push(point.clone());
            Ok(())
        }
    }

    fn t(i: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap() + Duration::minutes(5 * i)
    }

    fn series(ticker: &str, values: &[Option<f64>]) -> Vec<VolumeSample> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| VolumeSample::new(t(i as i64), ticker.to_string(), *v))
            .collect()
    }

    fn counting(n: usize) -> Vec<Option<f64>> {
        (1..=n).map(|v| Some(v as f64)).collect()
    }

    #[tokio::test]
    async fn test_full_window_produces_average_of_last_ten() {
        let repo = Arc::new(MockRepository::new(series("AAA", &counting(10))));
        let outcome = Aggregator::new(repo.clone(), 10).run().await.unwrap();

        let written = repo.written();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].ticker, "AAA");
        assert_eq!(written[0].value, 5.5);
        assert_eq!(written[0].time, t(9));

        match outcome {
            RunOutcome::Completed(summary) => {
                assert_eq!(summary.written, written);
                assert!(summary.skipped.is_empty());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_short_partition_is_skipped() {
        let repo = Arc::new(MockRepository::new(series("BBB", &counting(9))));
        let outcome = Aggregator::new(repo.clone(), 10).run().await.unwrap();

        assert!(repo.written().is_empty());
        match outcome {
            RunOutcome::Completed(summary) => {
                assert_eq!(
                    summary.skipped,
                    vec![SkippedTicker {
                        ticker: "BBB".to_string(),
                        reason: SkipReason::InsufficientData,
                    }]
                );
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_null_inside_trailing_window_skips_ticker() {
        let mut values = counting(12);
        values[10] = None;
        let repo = Arc::new(MockRepository::new(series("CCC", &values)));
        let outcome = Aggregator::new(repo.clone(), 10).run().await.unwrap();

        assert!(repo.written().is_empty());
        match outcome {
            RunOutcome::Completed(summary) => {
                assert_eq!(summary.skipped[0].reason, SkipReason::InsufficientData);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_all_null_partition_skipped_before_windowing() {
        let repo = Arc::new(MockRepository::new(series("DDD", &vec![None; 10])));
        let outcome = Aggregator::new(repo.clone(), 10).run().await.unwrap();

        assert!(repo.written().is_empty());
        match outcome {
            RunOutcome::Completed(summary) => {
                assert_eq!(
                    summary.skipped,
                    vec![SkippedTicker {
                        ticker: "DDD".to_string(),
                        reason: SkipReason::NoValidVolume,
                    }]
                );
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_fetch_is_no_data() {
        let repo = Arc::new(MockRepository::new(Vec::new()));
        let outcome = Aggregator::new(repo.clone(), 10).run().await.unwrap();

        assert_eq!(outcome, RunOutcome::NoData);
        assert!(repo.written().is_empty());
    }

    #[tokio::test]
    async fn test_only_qualifying_tickers_are_written() {
        let mut samples = series("EEE", &counting(10));
        samples.extend(series("FFF", &counting(9)));
        let repo = Arc::new(MockRepository::new(samples));
        let outcome = Aggregator::new(repo.clone(), 10).run().await.unwrap();

        let written = repo.written();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].ticker, "EEE");

        match outcome {
            RunOutcome::Completed(summary) => {
                assert_eq!(summary.written.len(), 1);
                assert_eq!(summary.skipped.len(), 1);
                assert_eq!(summary.skipped[0].ticker, "FFF");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unordered_input_is_resorted() {
        let mut samples = series("AAA", &counting(10));
        samples.reverse();
        let repo = Arc::new(MockRepository::new(samples));
        Aggregator::new(repo.clone(), 10).run().await.unwrap();

        let written = repo.written();
        assert_eq!(written[0].value, 5.5);
        assert_eq!(written[0].time, t(9));
    }

    #[tokio::test]
    async fn test_idempotent_over_unchanged_data() {
        let repo = Arc::new(MockRepository::new(series("AAA", &counting(12))));
        let aggregator = Aggregator::new(repo.clone(), 10);

        let first = aggregator.run().await.unwrap();
        let second = aggregator.run().await.unwrap();

        assert_eq!(first, second);
        let written = repo.written();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0], written[1]);
    }

    #[tokio::test]
    async fn test_write_failure_aborts_remaining_tickers() {
        let mut samples = series("AAA", &counting(10));
        samples.extend(series("BBB", &counting(10)));
        samples.extend(series("CCC", &counting(10)));
        let repo = Arc::new(MockRepository::failing_on(samples, "BBB"));

        let error = Aggregator::new(repo.clone(), 10).run().await.unwrap_err();

        match error {
            AggregatorError::Write {
                ticker, written, ..
            } => {
                assert_eq!(ticker, "BBB");
                assert_eq!(written, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // AAA was written before the abort; CCC was never attempted
        let written = repo.written();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].ticker, "AAA");
    }

    #[tokio::test]
    async fn test_configurable_window() {
        let repo = Arc::new(MockRepository::new(series("AAA", &counting(5))));
        Aggregator::new(repo.clone(), 3).run().await.unwrap();

        // Mean of the last 3 of [1..5]
        let written = repo.written();
        assert_eq!(written[0].value, 4.0);
    }
}
