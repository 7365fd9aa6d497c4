use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {status} from {method} {path}: {body}")]
    UnexpectedStatus {
        method: &'static str,
        path: String,
        status: reqwest::StatusCode,
        body: String,
    },
}
