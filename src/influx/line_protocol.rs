use chrono::{DateTime, Utc};

/// Wire-level InfluxDB point
///
/// Builder over the line protocol structure: one measurement, a tag set, a
/// field set and an optional timestamp. Only float fields are supported;
/// the derived series carries a single float field.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    measurement: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, f64)>,
    time: Option<DateTime<Utc>>,
}

impl Point {
    /// Create a point for the given measurement
    pub fn new(measurement: &str) -> Self {
        Self {
            measurement: measurement.to_string(),
            tags: Vec::new(),
            fields: Vec::new(),
            time: None,
        }
    }

    /// Attach a tag
    pub fn tag(mut self, key: &str, value: &str) -> Self {
        self.tags.push((key.to_string(), value.to_string()));
        self
    }

    /// Attach a float field
    pub fn field(mut self, key: &str, value: f64) -> Self {
        self.fields.push((key.to_string(), value));
        self
    }

    /// Set the point's timestamp
    pub fn timestamp(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    /// Render the point as a single line-protocol line (nanosecond precision)
    ///
    /// Returns `None` for a point with no fields, or whose timestamp falls
    /// outside the range representable as nanoseconds since the epoch -
    /// both are unwritable.
    pub fn to_line_protocol(&self) -> Option<String> {
        if self.fields.is_empty() {
            return None;
        }

        let mut line = escape_measurement(&self.measurement);

        for (key, value) in &self.tags {
            line.push(',');
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&escape_key(value));
        }

        line.push(' ');
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(key, value)| format!("{}={}", escape_key(key), value))
            .collect();
        line.push_str(&fields.join(","));

        if let Some(time) = self.time {
            let nanos = time.timestamp_nanos_opt()?;
            line.push(' ');
            line.push_str(&nanos.to_string());
        }

        Some(line)
    }
}

/// Escape a measurement name (commas and spaces)
fn escape_measurement(name: &str) -> String {
    name.replace(',', "\\,").replace(' ', "\\ ")
}

/// Escape a tag key, tag value or field key (commas, equals signs, spaces)
fn escape_key(name: &str) -> String {
    name.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}
