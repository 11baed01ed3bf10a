//! Helpers for extracting typed parameters from a partial `serde_json::Value`
//! update. A missing key is `None`; a recognized key with the wrong type is an
//! error.

use crate::error::SimError;
use serde_json::Value;

/// `Ok(None)` if `name` is absent, `Ok(Some(v))` for a JSON number, otherwise
/// `SimError::ParamTypeMismatch`.
pub fn opt_f64(params: &Value, name: &str) -> Result<Option<f64>, SimError> {
    match params.get(name) {
        None => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or_else(|| SimError::ParamTypeMismatch {
            name: name.to_owned(),
            expected: "number".into(),
        }),
    }
}

/// Like [`opt_f64`] but requires a non-negative integer.
pub fn opt_usize(params: &Value, name: &str) -> Result<Option<usize>, SimError> {
    match params.get(name) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| SimError::ParamTypeMismatch {
                name: name.to_owned(),
                expected: "non-negative integer".into(),
            }),
    }
}
