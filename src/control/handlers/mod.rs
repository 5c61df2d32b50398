//! Control handlers, one module per namespace.

pub mod local;
pub mod remote;

use serde::de::DeserializeOwned;
use tracing::warn;

/// Decode handler params leniently: on failure the defaults are used.
pub(crate) fn decode_params<P>(method: &str, params: &[u8]) -> P
where
    P: DeserializeOwned + Default,
{
    serde_json::from_slice(params).unwrap_or_else(|e| {
        warn!(%method, error = %e, "Incorrect parameters, using defaults");
        P::default()
    })
}
