//! The two proxy data planes, per spec.md §4.5: an HTTP reverse proxy
//! (matching `httputil.NewSingleHostReverseProxy` in
//! `original_source/server/proxy.go`) and a raw TCP passthrough for
//! everything else.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::client::HttpConnector;
use hyper::header::HeaderValue;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Client, Request, Response, Server, StatusCode, Uri};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tracing::warn;

use crate::backend::Backend;
use crate::service_proxy::ServiceProxy;

/// Serves HTTP on `addr`, forwarding every request to a backend picked by
/// round robin, until `shutdown` resolves. One hop, same as the Go
/// original: no retry against a second backend within a single request.
pub async fn serve_http(addr: SocketAddr, proxy: Arc<ServiceProxy>, shutdown: oneshot::Receiver<()>) {
    let client = Client::new();
    let make_svc = make_service_fn(move |_conn| {
        let proxy = proxy.clone();
        let client = client.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let proxy = proxy.clone();
                let client = client.clone();
                async move { Ok::<_, Infallible>(forward(&proxy, &client, req).await) }
            }))
        }
    });

    let server = match Server::try_bind(&addr) {
        Ok(builder) => builder.serve(make_svc),
        Err(err) => {
            warn!(error = %err, %addr, "failed to bind http proxy listener");
            return;
        }
    };
    let graceful = server.with_graceful_shutdown(async {
        let _ = shutdown.await;
    });
    if let Err(err) = graceful.await {
        warn!(error = %err, %addr, "http proxy listener exited with an error");
    }
}

async fn forward(proxy: &ServiceProxy, client: &Client<HttpConnector>, mut req: Request<Body>) -> Response<Body> {
    let Some(backend) = proxy.pick() else {
        return bad_gateway("no backends available");
    };

    let original_host = req
        .headers()
        .get(hyper::header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let path_and_query = req.uri().path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let upstream: Uri = match format!("http://{}:{}{}", backend.host, backend.port, path_and_query).parse() {
        Ok(uri) => uri,
        Err(_) => return bad_gateway("invalid backend address"),
    };
    *req.uri_mut() = upstream;
    if let Ok(value) = HeaderValue::from_str(&original_host) {
        req.headers_mut().insert("X-Forwarded-Host", value);
    }

    match client.request(req).await {
        Ok(resp) => resp,
        Err(err) => {
            warn!(error = %err, backend = %backend.host, port = backend.port, "upstream request failed");
            bad_gateway("upstream request failed")
        }
    }
}

fn bad_gateway(message: &'static str) -> Response<Body> {
    Response::builder()
        .status(StatusCode::BAD_GATEWAY)
        .body(Body::from(message))
        .expect("static response builds")
}

/// Raw TCP passthrough: each accepted connection is paired with one
/// backend, picked once per connection, and piped bidirectionally until
/// either side closes.
pub async fn serve_tcp(addr: SocketAddr, proxy: Arc<ServiceProxy>, mut shutdown: oneshot::Receiver<()>) {
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            warn!(error = %err, %addr, "failed to bind tcp proxy listener");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => {
                let (inbound, _) = match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        warn!(error = %err, "failed to accept tcp connection");
                        continue;
                    }
                };
                let Some(backend) = proxy.pick() else {
                    continue;
                };
                tokio::spawn(async move {
                    if let Err(err) = pipe(inbound, backend).await {
                        warn!(error = %err, "tcp proxy connection failed");
                    }
                });
            }
        }
    }
}

async fn pipe(mut inbound: TcpStream, backend: Backend) -> std::io::Result<()> {
    let mut outbound = TcpStream::connect((backend.host.as_str(), backend.port)).await?;
    tokio::io::copy_bidirectional(&mut inbound, &mut outbound).await?;
    Ok(())
}
