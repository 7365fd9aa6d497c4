use thiserror::Error;
use warp::http::StatusCode;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("store error: {0}")]
    Store(#[from] nanokube_store::StoreError),
    #[error("port allocator error: {0}")]
    PortAllocator(#[from] nanokube_store::PortAllocatorError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::PortAllocator(nanokube_store::PortAllocatorError::AlreadyAllocated(_)) => {
                StatusCode::CONFLICT
            }
            ApiError::PortAllocator(nanokube_store::PortAllocatorError::OutOfRange(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::PortAllocator(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl warp::reject::Reject for ApiError {}

/// Lifts any error convertible into `ApiError` into a `warp::Rejection`,
/// for use as `.map_err(reject)?` in handlers.
pub fn reject<E: Into<ApiError>>(err: E) -> warp::Rejection {
    warp::reject::custom(err.into())
}

/// The structured error body spec.md §7 mandates: `{"error": "<message>"}`.
#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

pub async fn handle_rejection(
    rejection: warp::Rejection,
) -> Result<impl warp::Reply, std::convert::Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if let Some(api_err) = rejection.find::<ApiError>() {
        (api_err.status(), api_err.to_string())
    } else if rejection.find::<warp::filters::body::BodyDeserializeError>().is_some() {
        (StatusCode::BAD_REQUEST, "invalid request payload".to_string())
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
    };
    let body = warp::reply::json(&ErrorBody { error: message });
    Ok(warp::reply::with_status(body, status))
}
