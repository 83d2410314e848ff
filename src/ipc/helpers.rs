use crate::course::EntityId;
use crate::ipc::error::err;
use crate::ipc::types::Request;
use crate::store::Applied;
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};

/// A module or lesson id: non-empty string or number.
pub fn required_id(req: &Request, key: &str) -> Result<EntityId, JsonValue> {
    match req.params.get(key) {
        Some(JsonValue::String(s)) if !s.trim().is_empty() => Ok(EntityId::Text(s.clone())),
        Some(JsonValue::Number(n)) => Ok(EntityId::Number(n.clone())),
        Some(_) => Err(err(
            &req.id,
            "bad_params",
            format!("{} must be a non-empty string or number", key),
            None,
        )),
        None => Err(err(&req.id, "bad_params", format!("missing {}", key), None)),
    }
}

pub fn required_str(req: &Request, key: &str) -> Result<String, JsonValue> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn optional_str(req: &Request, key: &str) -> Option<String> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Absent or null means `None`; anything else must deserialize as `T`.
pub fn optional_input<T: DeserializeOwned>(
    req: &Request,
    key: &str,
) -> Result<Option<T>, JsonValue> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => serde_json::from_value(v.clone()).map(Some).map_err(|e| {
            err(
                &req.id,
                "bad_params",
                format!("invalid {}: {}", key, e),
                None,
            )
        }),
    }
}

pub fn required_input<T: DeserializeOwned>(req: &Request, key: &str) -> Result<T, JsonValue> {
    optional_input(req, key)?
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn applied_json(applied: &Applied, created_key: &str) -> JsonValue {
    let mut out = json!({ "changed": applied.changed });
    if let Some(id) = &applied.created {
        out[created_key] = json!(id);
    }
    out
}
