//! Decoding of DirectAdmin `json=yes` response bodies
//!
//! DirectAdmin's legacy `CMD_API_*` commands answer with loosely shaped
//! JSON: plain arrays for lists, objects keyed by user for forwarders, and
//! `{"error": "1", "text": ..., "details": ...}` for failures, sometimes with
//! a 200 status.

use mxroute_core::traits::DnsRecord;
use mxroute_core::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;

const PANEL: &str = "directadmin";

/// Longest body excerpt quoted in error messages
const EXCERPT_LEN: usize = 200;

/// Map a non-success HTTP status to an error
pub fn status_error(status: u16, body: &str) -> Error {
    match status {
        401 | 403 => Error::auth(format!(
            "Invalid username or login key, or the key lacks permission. Status: {}",
            status
        )),
        404 => Error::not_found(format!("Command not found. Status: {}", status)),
        500..=599 => Error::http(format!(
            "DirectAdmin server error: {} - {}",
            status,
            excerpt(body)
        )),
        _ => Error::http(format!("Request failed: {} - {}", status, excerpt(body))),
    }
}

/// Parse a response body and surface panel-reported errors
pub fn decode_body(body: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        if body.trim_start().starts_with('<') {
            Error::decode(format!(
                "Expected JSON but got an HTML page; check host, username and login key ({})",
                e
            ))
        } else {
            Error::decode(format!("Invalid JSON ({}): {}", e, excerpt(body)))
        }
    })?;

    if is_error_flag(value.get("error")) {
        let text = value.get("text").and_then(Value::as_str).unwrap_or("Unknown error");
        let message = match value.get("details").and_then(Value::as_str) {
            Some(details) if !details.is_empty() => format!("{}: {}", text, details),
            _ => text.to_string(),
        };
        return Err(Error::panel(PANEL, message));
    }

    Ok(value)
}

fn is_error_flag(flag: Option<&Value>) -> bool {
    match flag {
        Some(Value::String(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_u64() == Some(1),
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}

/// Decode a list of names (domains or mailbox users)
///
/// Accepts a JSON array of strings, an object wrapping one under `list`, or
/// an object whose values are the names.
pub fn decode_string_list(value: &Value) -> Result<Vec<String>> {
    match value {
        Value::Array(items) => items.iter().map(list_item).collect(),
        Value::Object(map) => match map.get("list") {
            Some(list) => decode_string_list(list),
            None => map.values().map(list_item).collect(),
        },
        Value::Null => Ok(Vec::new()),
        other => Err(Error::decode(format!("Expected a list, got {}", other))),
    }
}

fn list_item(item: &Value) -> Result<String> {
    item.as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::decode(format!("Expected a string in list, got {}", item)))
}

/// Decode a forwarder list: user → destinations
///
/// Destinations arrive either as an array or as one comma-joined string.
pub fn decode_forwarders(value: &Value) -> Result<BTreeMap<String, Vec<String>>> {
    let map = match value {
        Value::Object(map) => map,
        Value::Array(items) if items.is_empty() => return Ok(BTreeMap::new()),
        Value::Null => return Ok(BTreeMap::new()),
        other => {
            return Err(Error::decode(format!(
                "Expected forwarders object, got {}",
                other
            )));
        }
    };

    map.iter()
        .map(|(user, destinations)| {
            let destinations = match destinations {
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string)
                    .collect(),
                Value::String(joined) => split_destinations(joined),
                other => {
                    return Err(Error::decode(format!(
                        "Unexpected destinations for {}: {}",
                        user, other
                    )));
                }
            };
            Ok((user.clone(), destinations))
        })
        .collect()
}

/// Decode the zone records of `CMD_API_DNS_CONTROL`
pub fn decode_dns_records(value: &Value) -> Result<Vec<DnsRecord>> {
    let records = value
        .get("records")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::decode("Invalid response format: records is not an array"))?;

    Ok(records
        .iter()
        .filter_map(|record| {
            let name = record.get("name")?.as_str()?;
            let record_type = record.get("type").and_then(Value::as_str).unwrap_or_default();
            let value = record.get("value")?.as_str()?;
            Some(DnsRecord::new(name, record_type, value))
        })
        .collect())
}

fn split_destinations(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
