use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("api client error: {0}")]
    Client(#[from] nanokube_client::ClientError),
}
