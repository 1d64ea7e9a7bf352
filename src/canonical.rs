use serde::Serialize;

use crate::error::Result;

/// Serializes `value` to compact JSON in declaration order and escapes every
/// forward slash as `\/`, which is the form the gateway canonicalizes to.
pub fn to_canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(escape_slashes(&json))
}

pub fn escape_slashes(json: &str) -> String {
    json.replace('/', "\\/")
}
