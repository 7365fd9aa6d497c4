use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("api client error: {0}")]
    Client(#[from] nanokube_client::ClientError),
}
