use crate::models::TICKER_TAG;

/// Measurement holding the raw bars in the source bucket
pub const SOURCE_MEASUREMENT: &str = "tick";

/// Field carrying the traded volume
pub const VOLUME_FIELD: &str = "Volume";

/// Build the Flux query fetching the trailing volume window
///
/// Filters the source bucket to the volume field of the tick measurement,
/// grouped by ticker and sorted by time. The aggregator still re-sorts each
/// partition itself rather than trusting the upstream ordering.
pub fn volume_window_query(source_bucket: &str, lookback_days: u32) -> String {
    format!(
        r#"from(bucket: "{bucket}")
  |> range(start: -{lookback}d)
  |> filter(fn: (r) => r._measurement == "{measurement}" and r._field == "{field}")
  |> group(columns: ["{tag}"])
  |> sort(columns: ["_time"])"#,
        bucket = escape_string_literal(source_bucket),
        lookback = lookback_days,
        measurement = SOURCE_MEASUREMENT,
        field = VOLUME_FIELD,
        tag = TICKER_TAG,
    )
}

/// Escape a value for embedding in a double-quoted Flux string literal
fn escape_string_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
