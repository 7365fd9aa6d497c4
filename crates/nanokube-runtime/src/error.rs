use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("container name {0} already in use")]
    DuplicateName(String),
    #[error("runtime backend error: {0}")]
    Backend(String),
    #[error("failed to spawn runtime process: {0}")]
    Spawn(#[from] std::io::Error),
}
