//! Raw feed normalization.
//!
//! The upstream endpoints return the same logical data under different
//! envelope keys, field names, and value encodings. Everything in this
//! module is a pure function from `serde_json::Value` to canonical values:
//! no I/O, no state, and no errors — unresolved fields fall back to
//! defaults so a partial payload still renders as data.

use serde_json::Value;

use super::delay::ms_to_hours;
use super::metric::{HealthStatus, PosMetric, Thresholds};

/// Identifier aliases, most specific first.
const ID_ALIASES: &[&str] = &["posId", "pos_id", "pos", "id"];

/// Display-name aliases, most specific first.
const NAME_ALIASES: &[&str] = &["posName", "pos_name", "name", "label"];

/// Transaction volume aliases.
const VOLUME_ALIASES: &[&str] = &["volume", "count", "total", "tx_count"];

/// Error-rate aliases. Also matched against `metrics[].type` entries.
const ERROR_ALIASES: &[&str] = &["errorRate", "error_rate", "errors"];

/// Success-rate aliases. Also matched against `metrics[].type` entries.
const SUCCESS_ALIASES: &[&str] = &["successRate", "success_rate", "success"];

/// Delay-in-hours aliases.
const DELAY_HOURS_ALIASES: &[&str] = &["avgDelayHours", "delay_hours"];

/// Delay-in-milliseconds aliases.
const DELAY_MS_ALIASES: &[&str] = &["avgDelayMs", "delay_ms", "avg_delay_ms"];

/// Upstream status-string aliases.
const STATUS_ALIASES: &[&str] = &["status", "healthStatus", "health"];

/// The delivery channels that may carry their own sub-metrics.
pub const CHANNELS: &[&str] = &["android", "chrome", "email"];

/// Locate the record array inside a raw envelope.
///
/// The envelope key varies by endpoint, so detection is ordered from most
/// specific to least specific:
/// 1. a top-level `items` array;
/// 2. `data.pos_list` (the all-POS summary feed);
/// 3. `data.alerts` (the realtime errors feed);
/// 4. `data` itself when it is an array.
///
/// Returns an empty slice when nothing matches.
pub fn detect_records(envelope: &Value) -> &[Value] {
    if let Some(items) = envelope.get("items").and_then(Value::as_array) {
        return items;
    }
    if let Some(list) = envelope
        .get("data")
        .and_then(|d| d.get("pos_list"))
        .and_then(Value::as_array)
    {
        return list;
    }
    if let Some(alerts) = envelope
        .get("data")
        .and_then(|d| d.get("alerts"))
        .and_then(Value::as_array)
    {
        return alerts;
    }
    if let Some(data) = envelope.get("data").and_then(Value::as_array) {
        return data;
    }
    &[]
}

/// A record that carries an `alerts` field but no identifier is an envelope
/// wrapper that leaked into the array, not a metric.
pub fn is_wrapper_record(record: &Value) -> bool {
    record.get("alerts").is_some() && first_alias(record, ID_ALIASES).is_none()
}

/// Normalize one raw record into a canonical metric.
///
/// Never fails; every unresolved field takes its documented default.
pub fn normalize_record(record: &Value, thresholds: &Thresholds) -> PosMetric {
    let id = resolve_id(record);
    let name = resolve_name(record, &id);
    let (error_rate, success_rate) = resolve_rates(record);
    let volume = resolve_volume(record);
    let avg_delay_hours = resolve_delay_hours(record);

    let health = first_alias(record, STATUS_ALIASES)
        .and_then(Value::as_str)
        .and_then(HealthStatus::parse)
        .unwrap_or_else(|| HealthStatus::from_error_rate(error_rate, thresholds));

    PosMetric {
        id,
        name,
        error_rate,
        success_rate,
        volume,
        avg_delay_hours,
        health,
    }
}

/// Coerce a JSON value to a number. Accepts numbers and numeric strings;
/// everything else (null, objects, non-numeric strings) is `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The percent-or-fraction rule.
///
/// Upstream emits rates as 0..1 fractions and 0..100 percentages
/// interchangeably, so any value above 1 is reinterpreted as a percentage.
/// Non-finite input maps to 0 and the result is clamped to [0, 1].
pub fn normalize_rate(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let fraction = if value > 1.0 { value / 100.0 } else { value };
    fraction.clamp(0.0, 1.0)
}

/// First alias present on the record with a non-null value.
fn first_alias<'a>(record: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| record.get(key))
        .find(|v| !v.is_null())
}

fn resolve_id(record: &Value) -> String {
    match first_alias(record, ID_ALIASES) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn resolve_name(record: &Value, id: &str) -> String {
    first_alias(record, NAME_ALIASES)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("POS {}", id))
}

/// The channel sub-object for a delivery channel, checked under a
/// `channels` container first and then directly on the record.
fn channel_object<'a>(record: &'a Value, channel: &str) -> Option<&'a Value> {
    record
        .get("channels")
        .and_then(|c| c.get(channel))
        .or_else(|| record.get(channel))
        .filter(|v| v.is_object())
}

/// Average a rate over the channels that actually report it.
///
/// Only values that coerce to finite non-negative numbers participate, and
/// the divisor is the number of participating channels — a channel absent
/// from the payload must not dilute the average. All-zero reports do not
/// count as data; the caller falls through to the flat field.
fn channel_rate(record: &Value, aliases: &[&str]) -> Option<f64> {
    let values: Vec<f64> = CHANNELS
        .iter()
        .filter_map(|ch| channel_object(record, ch))
        .filter_map(|obj| first_alias(obj, aliases))
        .filter_map(coerce_number)
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(normalize_rate)
        .collect();

    if values.iter().any(|v| *v > 0.0) {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    } else {
        None
    }
}

/// A rate from a flat top-level field.
fn flat_rate(record: &Value, aliases: &[&str]) -> Option<f64> {
    first_alias(record, aliases)
        .and_then(coerce_number)
        .map(normalize_rate)
}

/// A value from the generic `metrics` array of `{type, value}` pairs,
/// matched against the same alias names as the dedicated fields.
fn metric_pair(record: &Value, types: &[&str]) -> Option<f64> {
    record
        .get("metrics")
        .and_then(Value::as_array)?
        .iter()
        .find(|entry| {
            entry
                .get("type")
                .and_then(Value::as_str)
                .is_some_and(|t| types.contains(&t))
        })
        .and_then(|entry| entry.get("value"))
        .and_then(coerce_number)
}

/// Resolve the error/success rate pair.
///
/// Each rate tries, in order: per-channel average, flat field, `metrics`
/// pair. When exactly one of the pair resolves the other is derived as its
/// complement; when neither does, error defaults to 0 and the complement
/// rule makes success 1.
fn resolve_rates(record: &Value) -> (f64, f64) {
    let error = channel_rate(record, ERROR_ALIASES)
        .or_else(|| flat_rate(record, ERROR_ALIASES))
        .or_else(|| metric_pair(record, ERROR_ALIASES).map(normalize_rate));

    let success = channel_rate(record, SUCCESS_ALIASES)
        .or_else(|| flat_rate(record, SUCCESS_ALIASES))
        .or_else(|| metric_pair(record, SUCCESS_ALIASES).map(normalize_rate));

    match (error, success) {
        (Some(e), Some(s)) => (e, s),
        (Some(e), None) => (e, (1.0 - e).clamp(0.0, 1.0)),
        (None, Some(s)) => ((1.0 - s).clamp(0.0, 1.0), s),
        (None, None) => (0.0, 1.0),
    }
}

fn resolve_volume(record: &Value) -> u64 {
    first_alias(record, VOLUME_ALIASES)
        .and_then(coerce_number)
        .or_else(|| metric_pair(record, VOLUME_ALIASES))
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.round() as u64)
        .unwrap_or(0)
}

/// Resolve the average delay in hours.
///
/// Preference order: average of the strictly positive per-channel delay-ms
/// values, then a flat hours field, then a flat ms field, then 0.
fn resolve_delay_hours(record: &Value) -> f64 {
    let channel_ms: Vec<f64> = CHANNELS
        .iter()
        .filter_map(|ch| channel_object(record, ch))
        .filter_map(|obj| first_alias(obj, DELAY_MS_ALIASES))
        .filter_map(coerce_number)
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();

    if !channel_ms.is_empty() {
        let avg = channel_ms.iter().sum::<f64>() / channel_ms.len() as f64;
        return ms_to_hours(avg);
    }

    let hours = first_alias(record, DELAY_HOURS_ALIASES)
        .and_then(coerce_number)
        .or_else(|| {
            first_alias(record, DELAY_MS_ALIASES)
                .and_then(coerce_number)
                .map(ms_to_hours)
        })
        .unwrap_or(0.0);

    if hours.is_finite() && hours >= 0.0 {
        hours
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(record: &Value) -> PosMetric {
        normalize_record(record, &Thresholds::default())
    }

    #[test]
    fn test_detect_records_items() {
        let envelope = json!({ "items": [{ "id": "1" }] });
        assert_eq!(detect_records(&envelope).len(), 1);
    }

    #[test]
    fn test_detect_records_pos_list() {
        let envelope = json!({ "data": { "pos_list": [{ "id": "1" }, { "id": "2" }] } });
        assert_eq!(detect_records(&envelope).len(), 2);
    }

    #[test]
    fn test_detect_records_alerts() {
        let envelope = json!({ "data": { "alerts": [{ "posId": "9" }] } });
        assert_eq!(detect_records(&envelope).len(), 1);
    }

    #[test]
    fn test_detect_records_data_array() {
        let envelope = json!({ "data": [{ "id": "1" }] });
        assert_eq!(detect_records(&envelope).len(), 1);
    }

    #[test]
    fn test_detect_records_priority_order() {
        // items wins over everything else when both are present
        let envelope = json!({
            "items": [{ "id": "a" }],
            "data": { "pos_list": [{ "id": "b" }, { "id": "c" }] }
        });
        let records = detect_records(&envelope);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], "a");
    }

    #[test]
    fn test_detect_records_no_match() {
        assert!(detect_records(&json!({ "payload": [] })).is_empty());
        assert!(detect_records(&json!(null)).is_empty());
        assert!(detect_records(&json!({ "data": { "pos_list": "oops" } })).is_empty());
    }

    #[test]
    fn test_wrapper_record_excluded() {
        let wrapper = json!({ "alerts": [{ "id": "1" }], "severity": "high" });
        assert!(is_wrapper_record(&wrapper));

        // an alert record that names a POS is a metric, not a wrapper
        let alert = json!({ "alerts": [], "posId": "7" });
        assert!(!is_wrapper_record(&alert));
    }

    #[test]
    fn test_normalize_rate_bounds() {
        for v in [-5.0, 0.0, 0.3, 1.0, 45.0, 100.0, 250.0, f64::NAN, f64::INFINITY] {
            let r = normalize_rate(v);
            assert!((0.0..=1.0).contains(&r), "normalize_rate({v}) = {r}");
        }
    }

    #[test]
    fn test_normalize_rate_percent_fraction_equivalence() {
        for v in [0.0, 0.1, 0.25, 0.5, 0.99] {
            assert!((normalize_rate(v) - normalize_rate(v * 100.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_normalize_rate_non_finite_is_zero() {
        assert_eq!(normalize_rate(f64::NAN), 0.0);
        assert_eq!(normalize_rate(f64::INFINITY), 0.0);
        assert_eq!(normalize_rate(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_coerce_number_variants() {
        assert_eq!(coerce_number(&json!(42)), Some(42.0));
        assert_eq!(coerce_number(&json!(0.5)), Some(0.5));
        assert_eq!(coerce_number(&json!("0.5")), Some(0.5));
        assert_eq!(coerce_number(&json!(" 45 ")), Some(45.0));
        assert_eq!(coerce_number(&json!("n/a")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!({ "v": 1 })), None);
    }

    #[test]
    fn test_id_alias_priority() {
        let m = normalize(&json!({ "id": "generic", "posId": "specific" }));
        assert_eq!(m.id, "specific");

        let m = normalize(&json!({ "pos": 17 }));
        assert_eq!(m.id, "17");
    }

    #[test]
    fn test_missing_id_is_empty_string() {
        let m = normalize(&json!({ "volume": 10 }));
        assert_eq!(m.id, "");
    }

    #[test]
    fn test_name_fallback() {
        let m = normalize(&json!({ "posId": "42" }));
        assert_eq!(m.name, "POS 42");

        let m = normalize(&json!({ "posId": "42", "name": "Front Desk" }));
        assert_eq!(m.name, "Front Desk");
    }

    #[test]
    fn test_channel_averaging_ignores_absent_channels() {
        // average of present channels only, not divided by 3
        let m = normalize(&json!({
            "posId": "1",
            "android": { "errorRate": 0.1 },
            "chrome": { "errorRate": 0.2 }
        }));
        assert!((m.error_rate - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_channel_averaging_under_channels_container() {
        let m = normalize(&json!({
            "posId": "1",
            "channels": {
                "android": { "errorRate": 10 },
                "email": { "errorRate": 20 }
            }
        }));
        assert!((m.error_rate - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_all_zero_channels_fall_back_to_flat_field() {
        let m = normalize(&json!({
            "posId": "1",
            "android": { "errorRate": 0 },
            "chrome": { "errorRate": 0 },
            "errorRate": 0.4
        }));
        assert!((m.error_rate - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_complement_derivation() {
        let m = normalize(&json!({ "posId": "1", "errorRate": 0.3 }));
        assert!((m.success_rate - 0.7).abs() < 1e-12);

        let m = normalize(&json!({ "posId": "1", "successRate": 0.9 }));
        assert!((m.error_rate - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_independent_success_rate_passes_through() {
        // upstream may supply a success rate that is not 1 - error
        let m = normalize(&json!({ "posId": "1", "errorRate": 0.3, "successRate": 0.65 }));
        assert!((m.error_rate - 0.3).abs() < 1e-12);
        assert!((m.success_rate - 0.65).abs() < 1e-12);
    }

    #[test]
    fn test_no_rates_defaults() {
        let m = normalize(&json!({ "posId": "1" }));
        assert_eq!(m.error_rate, 0.0);
        assert_eq!(m.success_rate, 1.0);
    }

    #[test]
    fn test_metrics_pair_fallback() {
        let m = normalize(&json!({
            "posId": "1",
            "metrics": [
                { "type": "error_rate", "value": 12 },
                { "type": "volume", "value": "300" }
            ]
        }));
        assert!((m.error_rate - 0.12).abs() < 1e-12);
        assert_eq!(m.volume, 300);
    }

    #[test]
    fn test_volume_defaults_and_strings() {
        assert_eq!(normalize(&json!({ "posId": "1" })).volume, 0);
        assert_eq!(normalize(&json!({ "posId": "1", "volume": -5 })).volume, 0);
        assert_eq!(normalize(&json!({ "posId": "1", "count": "120" })).volume, 120);
    }

    #[test]
    fn test_delay_from_channel_ms() {
        // (3_600_000 + 7_200_000) / 2 ms = 1.5h; email's zero is ignored
        let m = normalize(&json!({
            "posId": "1",
            "android": { "avgDelayMs": 3_600_000 },
            "chrome": { "avgDelayMs": 7_200_000 },
            "email": { "avgDelayMs": 0 }
        }));
        assert!((m.avg_delay_hours - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_delay_flat_fields() {
        let m = normalize(&json!({ "posId": "1", "avgDelayHours": 2.5 }));
        assert!((m.avg_delay_hours - 2.5).abs() < 1e-12);

        let m = normalize(&json!({ "posId": "1", "delay_ms": 1_800_000 }));
        assert!((m.avg_delay_hours - 0.5).abs() < 1e-9);

        let m = normalize(&json!({ "posId": "1", "avgDelayHours": -3.0 }));
        assert_eq!(m.avg_delay_hours, 0.0);

        let m = normalize(&json!({ "posId": "1" }));
        assert_eq!(m.avg_delay_hours, 0.0);
    }

    #[test]
    fn test_upstream_status_wins_over_derivation() {
        let m = normalize(&json!({ "posId": "1", "errorRate": 0.9, "status": "ok" }));
        assert_eq!(m.health, HealthStatus::Healthy);

        // unrecognized status falls back to thresholds
        let m = normalize(&json!({ "posId": "1", "errorRate": 0.9, "status": "???" }));
        assert_eq!(m.health, HealthStatus::Critical);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let record = json!({
            "posId": "5",
            "name": "Kiosk",
            "android": { "errorRate": "12", "avgDelayMs": 90_000 },
            "chrome": { "errorRate": 0.08 },
            "volume": "450",
            "metrics": [{ "type": "success_rate", "value": 88 }]
        });
        let a = normalize(&record);
        let b = normalize(&record);
        assert_eq!(a, b);
    }
}
