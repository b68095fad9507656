//! Response bodies arrive either bare or wrapped as `{ "data": ... }`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::GatewayError;

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } | Envelope::Bare(data) => data,
        }
    }
}

/// Decode a response body, unwrapping a `data` envelope if present.
pub(crate) fn decode<T: DeserializeOwned>(body: Value) -> Result<T, GatewayError> {
    serde_json::from_value::<Envelope<T>>(body)
        .map(Envelope::into_inner)
        .map_err(|e| GatewayError::Decode(e.to_string()))
}
