//! Shape checks for webhook replies.

use serde_json::Value;

use crate::error::DeliveryError;
use crate::types::DeliveryResponse;

/// Checks that `data` is `{status: number, body: {ID: non-empty string, "Auto Suggest": string}}`.
///
/// Fields are checked in that order and the first violation is reported.
///
/// # Errors
///
/// Returns a [`DeliveryError`] with status 400 whose message names the
/// offending field.
pub fn validate_response(data: &Value) -> Result<DeliveryResponse, DeliveryError> {
    let Some(record) = data.as_object() else {
        return Err(DeliveryError::invalid("not an object"));
    };

    let status = match record.get("status") {
        Some(Value::Number(n)) => number_to_i64(n),
        _ => return Err(DeliveryError::invalid("missing or invalid status")),
    };

    let Some(body) = record.get("body").and_then(Value::as_object) else {
        return Err(DeliveryError::invalid("missing or invalid body"));
    };

    let id = match body.get("ID") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => return Err(DeliveryError::invalid("missing or invalid ID")),
    };

    let Some(Value::String(auto_suggest)) = body.get("Auto Suggest") else {
        return Err(DeliveryError::invalid("missing or invalid Auto Suggest"));
    };

    Ok(DeliveryResponse {
        status,
        id,
        auto_suggest: auto_suggest.clone(),
    })
}

#[allow(clippy::cast_possible_truncation)]
fn number_to_i64(n: &serde_json::Number) -> i64 {
    n.as_i64()
        .or_else(|| n.as_f64().map(|f| f as i64))
        .unwrap_or_default()
}
