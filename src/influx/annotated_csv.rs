use std::collections::HashMap;

use chrono::{DateTime, Utc};
use csv::StringRecord;

use crate::influx::client::InfluxError;
use crate::models::{VolumeSample, TICKER_TAG};

/// Column carrying the sample timestamp
const TIME_COLUMN: &str = "_time";

/// Column carrying the sample value
const VALUE_COLUMN: &str = "_value";

/// Decode a Flux annotated-CSV response into volume samples
///
/// The response is a sequence of header blocks separated by blank lines,
/// each preceded by `#`-annotation rows. Within a block, rows are resolved
/// by header name: `_time`, `_value` and the ticker tag column. An empty
/// `_value` cell is a null reading and decodes to `None`; an in-band error
/// table or a missing required column is a malformed response.
pub fn parse_volume_samples(body: &str) -> Result<Vec<VolumeSample>, InfluxError> {
    let mut samples = Vec::new();

    let normalized = body.replace("\r\n", "\n");
    for block in normalized.split("\n\n") {
        if block.trim().is_empty() {
            continue;
        }
        parse_block(block, &mut samples)?;
    }

    Ok(samples)
}

/// Decode one header block of the response
fn parse_block(block: &str, samples: &mut Vec<VolumeSample>) -> Result<(), InfluxError> {
    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(block.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| InfluxError::MalformedResponse(format!("unreadable CSV header: {}", e)))?
        .clone();
    let header_map = build_header_map(&headers);

    let records: Vec<StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .map_err(|e| InfluxError::MalformedResponse(format!("unreadable CSV row: {}", e)))?;

    if records.is_empty() {
        // Header-only (or annotation-only) block, nothing to decode
        return Ok(());
    }

    // Flux surfaces query failures as an in-band table with an `error` column
    if let Some(&error_idx) = header_map.get("error") {
        let message = records[0].get(error_idx).unwrap_or("").to_string();
        return Err(InfluxError::MalformedResponse(format!(
            "error table in response: {}",
            message
        )));
    }

    let time_idx = require_column(&header_map, TIME_COLUMN)?;
    let value_idx = require_column(&header_map, VALUE_COLUMN)?;
    let ticker_idx = require_column(&header_map, TICKER_TAG)?;

    for record in &records {
        let time_raw = record.get(time_idx).unwrap_or("").trim();
        let time = DateTime::parse_from_rfc3339(time_raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| {
                InfluxError::MalformedResponse(format!("invalid _time '{}': {}", time_raw, e))
            })?;

        let value_raw = record.get(value_idx).unwrap_or("").trim();
        let volume = if value_raw.is_empty() {
            None
        } else {
            Some(value_raw.parse::<f64>().map_err(|_| {
                InfluxError::MalformedResponse(format!("invalid _value '{}'", value_raw))
            })?)
        };

        let ticker = record.get(ticker_idx).unwrap_or("").trim().to_string();

        samples.push(VolumeSample::new(time, ticker, volume));
    }

    Ok(())
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().to_string(), idx))
        .collect()
}

fn require_column(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, InfluxError> {
    header_map
        .get(name)
        .copied()
        .ok_or_else(|| InfluxError::MalformedResponse(format!("missing column `{}`", name)))
}
