use thiserror::Error;

/// Per spec.md §4.1: a missing key is not an error, `Get` returns
/// `found=false` — so `NotFound` is deliberately not a variant here.
/// `Kv::get` returns `Option<String>` instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("kv backend error: {0}")]
    Backend(String),
    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("unknown resource kind: {0}")]
    UnknownKind(String),
}
