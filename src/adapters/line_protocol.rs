//! InfluxDB line protocol encoding.
//!
//! `measurement[,tag=value...] field=value[,field=value...] [timestamp]`

use crate::domain::model::{DataPoint, FieldValue};
use crate::utils::error::{ReporterError, Result};
use std::fmt::Write;

fn escape(value: &str, specials: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if specials.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn escape_measurement(name: &str) -> String {
    escape(name, &[',', ' '])
}

fn escape_key(key: &str) -> String {
    escape(key, &[',', '=', ' '])
}

fn encode_field_value(name: &str, value: &FieldValue) -> Result<String> {
    match value {
        FieldValue::Float(v) if !v.is_finite() => Err(ReporterError::ValidationError {
            message: format!("field '{}' is not a finite number ({})", name, v),
        }),
        FieldValue::Float(v) => Ok(v.to_string()),
        FieldValue::Integer(v) => Ok(format!("{}i", v)),
        FieldValue::Boolean(v) => Ok(v.to_string()),
        FieldValue::String(v) => Ok(format!("\"{}\"", escape(v, &['"', '\\']))),
    }
}

pub fn encode_point(point: &DataPoint) -> Result<String> {
    if point.measurement.is_empty() {
        return Err(ReporterError::ValidationError {
            message: "measurement name cannot be empty".to_string(),
        });
    }
    if point.fields.is_empty() {
        return Err(ReporterError::ValidationError {
            message: format!("point for '{}' has no fields", point.measurement),
        });
    }

    let mut line = escape_measurement(&point.measurement);

    for (key, value) in &point.tags {
        if value.is_empty() {
            continue;
        }
        let _ = write!(line, ",{}={}", escape_key(key), escape_key(value));
    }

    let fields = point
        .fields
        .iter()
        .map(|(name, value)| {
            encode_field_value(name, value).map(|v| format!("{}={}", escape_key(name), v))
        })
        .collect::<Result<Vec<_>>>()?;
    line.push(' ');
    line.push_str(&fields.join(","));

    if let Some(timestamp) = point.timestamp {
        let _ = write!(line, " {}", timestamp.timestamp_millis());
    }

    Ok(line)
}

/// Newline-separated body for a `/write` request.
pub fn encode_points(points: &[DataPoint]) -> Result<String> {
    let lines = points.iter().map(encode_point).collect::<Result<Vec<_>>>()?;
    Ok(lines.join("\n"))
}
