//! Shallow merge of a partial JSON object onto a typed record.

use serde_json::Value;

use super::Record;
use crate::error::MergeError;

/// Wire name of the identifier field, never overwritten by a merge.
const ID_FIELD: &str = "_id";

/// Overlay the top-level fields of `patch` onto `record`.
///
/// Keys absent from `patch` keep their current value; nested objects are
/// replaced, not merged. The identifier is immutable and ignored if present.
/// Derived fields are recomputed on the result.
pub(crate) fn shallow_merge<R: Record>(record: &R, patch: &Value) -> Result<R, MergeError> {
    let fail = |message: String| MergeError {
        collection: R::COLLECTION,
        id: record.id().to_string(),
        message,
    };

    let Value::Object(fields) = patch else {
        return Err(fail("patch must be a JSON object".into()));
    };

    let mut current = serde_json::to_value(record).map_err(|e| fail(e.to_string()))?;
    let Value::Object(target) = &mut current else {
        return Err(fail("record does not serialize to an object".into()));
    };

    for (key, value) in fields {
        if key == ID_FIELD {
            continue;
        }
        target.insert(key.clone(), value.clone());
    }

    let mut merged: R = serde_json::from_value(current).map_err(|e| fail(e.to_string()))?;
    merged.refresh_derived();
    Ok(merged)
}
