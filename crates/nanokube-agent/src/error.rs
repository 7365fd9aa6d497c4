use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("missing required environment variable {0}")]
    MissingEnv(String),
    #[error(transparent)]
    Client(#[from] nanokube_client::ClientError),
    #[error(transparent)]
    Runtime(#[from] nanokube_runtime::RuntimeError),
}
