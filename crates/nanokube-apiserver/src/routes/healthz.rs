pub async fn healthz() -> Result<impl warp::Reply, std::convert::Infallible> {
    Ok(warp::reply::with_status("ok", warp::http::StatusCode::OK))
}
