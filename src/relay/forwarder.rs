//! Outbound request construction and bidirectional streaming.
//!
//! # Responsibilities
//! - Rewrite the inbound request for the tenant's target
//! - Stream the request body up while waiting for the response
//! - Stream the response back with status and headers untouched
//! - Contain failures on either side
//!
//! # Failure handling
//! ```text
//! outbound fails before response headers  → 502 (nothing sent yet)
//! outbound body fails after headers sent  → inbound connection terminated
//! inbound body fails                      → outbound request dropped
//! inbound client disconnects              → handler + response body dropped,
//!                                           upload task aborted
//! ```

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, request, HeaderValue, Request, Uri};
use axum::response::Response;
use bytes::Bytes;
use hyper::body::{Body as HttpBody, Frame, Incoming, SizeHint};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::error::GatewayError;
use crate::http::request::RequestContext;
use crate::relay::upload::{spawn_upload, UploadBody, UploadTask};
use crate::relay::PROXY_PAYLOAD_HEADER;
use crate::routing::TargetOrigin;

/// Relays requests to tenant targets.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, UploadBody>,
}

impl Forwarder {
    pub fn new(connect_timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));

        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { client }
    }

    /// Forward `request` to `target` and return the streaming response.
    pub async fn forward(
        &self,
        ctx: &RequestContext,
        target: &TargetOrigin,
        request: Request<Body>,
    ) -> Result<Response, GatewayError> {
        let (parts, body) = request.into_parts();
        let mut outbound = build_outbound(ctx, target, &parts)?;

        let (upload_body, mut upload) = spawn_upload(body);
        *outbound.body_mut() = upload_body;

        let response = self.client.request(outbound);
        tokio::pin!(response);

        let response = loop {
            tokio::select! {
                result = &mut response => break result,
                outcome = upload.finished(), if upload.is_running() => {
                    if let Err(e) = outcome {
                        // Returning drops the pending outbound request.
                        return Err(GatewayError::ClientStream(e.to_string()));
                    }
                }
            }
        };

        let response = response.map_err(|e| {
            tracing::debug!(error = ?e, tenant = %ctx.tenant_id(), "Outbound request failed");
            GatewayError::UpstreamUnavailable(e.to_string())
        })?;

        tracing::debug!(
            tenant = %ctx.tenant_id(),
            status = %response.status(),
            "Upstream response received"
        );

        let (parts, incoming) = response.into_parts();
        let upload = upload.is_running().then_some(upload);
        let body = RelayBody {
            inner: incoming,
            _upload: upload,
            tenant_id: ctx.tenant_id().to_string(),
        };

        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder").finish_non_exhaustive()
    }
}

/// Build the outbound request head: same method and headers, target URI,
/// `Host` overridden and the identity payload attached.
pub fn build_outbound(
    ctx: &RequestContext,
    target: &TargetOrigin,
    parts: &request::Parts,
) -> Result<Request<UploadBody>, GatewayError> {
    let uri = Uri::builder()
        .scheme(target.scheme().clone())
        .authority(target.authority().clone())
        .path_and_query(ctx.rewritten_path())
        .build()
        .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;

    let host = HeaderValue::from_str(target.authority().as_str())
        .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
    let payload = HeaderValue::from_bytes(ctx.payload_json().as_bytes())
        .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;

    let mut outbound = Request::new(UploadBody::empty());
    *outbound.method_mut() = parts.method.clone();
    *outbound.uri_mut() = uri;
    *outbound.headers_mut() = parts.headers.clone();

    let headers = outbound.headers_mut();
    headers.insert(header::HOST, host);
    headers.insert(PROXY_PAYLOAD_HEADER, payload);

    Ok(outbound)
}

/// Response body streamed back to the client.
///
/// Holds the upload task (if still running) so a client disconnect during
/// the response also stops the upload.
struct RelayBody {
    inner: Incoming,
    _upload: Option<UploadTask>,
    tenant_id: String,
}

impl HttpBody for RelayBody {
    type Data = Bytes;
    type Error = hyper::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        if let Poll::Ready(Some(Err(e))) = &polled {
            tracing::error!(
                tenant = %this.tenant_id,
                error = %e,
                "Upstream stream failed after headers were sent, terminating connection"
            );
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Determinant;
    use serde_json::json;

    fn ctx(claims: Option<serde_json::Value>) -> RequestContext {
        RequestContext::new(
            Determinant {
                tenant_id: "codec".into(),
                rewritten_path: "/health?verbose=1".into(),
            },
            claims,
        )
    }

    fn inbound() -> request::Parts {
        let (parts, _) = Request::builder()
            .method("PATCH")
            .uri("/codec/health?verbose=1")
            .header("host", "gateway.example.com")
            .header("x-custom", "kept")
            .header("cookie", "token=abc")
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn rewrites_uri_and_host() {
        let target = TargetOrigin::parse("http://localhost:4000").unwrap();
        let outbound = build_outbound(&ctx(None), &target, &inbound()).unwrap();

        assert_eq!(outbound.method(), "PATCH");
        assert_eq!(outbound.uri().to_string(), "http://localhost:4000/health?verbose=1");
        assert_eq!(outbound.headers()["host"], "localhost:4000");
        assert_eq!(outbound.headers()["x-custom"], "kept");
        assert_eq!(outbound.headers()["cookie"], "token=abc");
    }

    #[test]
    fn payload_is_null_without_claims() {
        let target = TargetOrigin::parse("http://localhost:4000").unwrap();
        let outbound = build_outbound(&ctx(None), &target, &inbound()).unwrap();
        assert_eq!(outbound.headers()[PROXY_PAYLOAD_HEADER], "null");
    }

    #[test]
    fn payload_carries_claims_json() {
        let target = TargetOrigin::parse("http://localhost:4000").unwrap();
        let claims = json!({ "sub": "alice", "roles": ["admin"] });
        let outbound = build_outbound(&ctx(Some(claims.clone())), &target, &inbound()).unwrap();

        let raw = outbound.headers()[PROXY_PAYLOAD_HEADER].to_str().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed, claims);
    }

    #[test]
    fn inbound_payload_header_is_replaced() {
        let target = TargetOrigin::parse("http://localhost:4000").unwrap();
        let mut parts = inbound();
        parts
            .headers
            .insert(PROXY_PAYLOAD_HEADER, HeaderValue::from_static("{\"sub\":\"forged\"}"));
        let outbound = build_outbound(&ctx(None), &target, &parts).unwrap();
        assert_eq!(outbound.headers()[PROXY_PAYLOAD_HEADER], "null");
    }

    #[tokio::test]
    async fn failing_inbound_body_aborts_the_relay() {
        use futures_util::stream;
        use tokio::io::AsyncReadExt;

        // Upstream that accepts and reads but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    while matches!(socket.read(&mut buf).await, Ok(n) if n > 0) {}
                });
            }
        });

        let body = Body::from_stream(stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::other("client reset")),
        ]));
        let request = Request::builder()
            .method("POST")
            .uri("/codec/upload")
            .body(body)
            .unwrap();

        let target = TargetOrigin::parse(&format!("http://{}", addr)).unwrap();
        let forwarder = Forwarder::new(Duration::from_secs(1));
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            forwarder.forward(&ctx(None), &target, request),
        )
        .await
        .expect("relay should stop once the inbound body fails");

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::ClientStream(_) | GatewayError::UpstreamUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn unreachable_target_is_upstream_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let target = TargetOrigin::parse(&format!("http://{}", addr)).unwrap();
        let forwarder = Forwarder::new(Duration::from_secs(1));
        let request = Request::builder()
            .uri("/codec/health")
            .body(Body::empty())
            .unwrap();

        let err = forwarder.forward(&ctx(None), &target, request).await.unwrap_err();
        assert!(matches!(err, GatewayError::UpstreamUnavailable(_)));
    }
}
