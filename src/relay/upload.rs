//! Streaming upload of the inbound body to the outbound request.
//!
//! # Responsibilities
//! - Pump inbound body frames into the outbound request without buffering
//!   the whole body
//! - Surface an inbound stream failure to both the outbound request (as a
//!   body error) and the handler (as the task result)
//! - Abort the pump when its owner goes away
//!
//! # Design Decisions
//! - Bounded channel between the pump task and the outbound body
//! - A channel that closes without an explicit end marker is an error, so
//!   an aborted pump never looks like a complete body downstream

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use axum::body::Body;
use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::{Body as HttpBody, Frame, SizeHint};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Frames buffered between the inbound reader and the outbound writer.
pub const UPLOAD_BUFFER_FRAMES: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("inbound body failed: {0}")]
    Inbound(String),

    #[error("upload aborted before the body ended")]
    Aborted,
}

#[derive(Debug)]
enum UploadEvent {
    Frame(Frame<Bytes>),
    End,
    Failed(String),
}

/// Outbound request body fed by the upload task.
#[derive(Debug)]
pub struct UploadBody {
    rx: Option<mpsc::Receiver<UploadEvent>>,
    size_hint: SizeHint,
    done: bool,
}

impl UploadBody {
    /// A body with no content, for requests that carry none.
    pub fn empty() -> Self {
        Self {
            rx: None,
            size_hint: SizeHint::with_exact(0),
            done: true,
        }
    }
}

impl HttpBody for UploadBody {
    type Data = Bytes;
    type Error = UploadError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        let Some(rx) = this.rx.as_mut() else {
            this.done = true;
            return Poll::Ready(None);
        };

        let event = ready!(rx.poll_recv(cx));
        match event {
            Some(UploadEvent::Frame(frame)) => Poll::Ready(Some(Ok(frame))),
            Some(UploadEvent::End) => {
                this.done = true;
                Poll::Ready(None)
            }
            Some(UploadEvent::Failed(reason)) => {
                this.done = true;
                Poll::Ready(Some(Err(UploadError::Inbound(reason))))
            }
            None => {
                this.done = true;
                Poll::Ready(Some(Err(UploadError::Aborted)))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.done
    }

    fn size_hint(&self) -> SizeHint {
        self.size_hint.clone()
    }
}

/// Handle to the running pump. Dropping it aborts the pump.
#[derive(Debug)]
pub struct UploadTask {
    handle: Option<JoinHandle<Result<(), UploadError>>>,
}

impl UploadTask {
    fn finished_already() -> Self {
        Self { handle: None }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Wait for the pump to finish.
    ///
    /// Never resolves once the result has been taken, so it can sit in a
    /// `select!` loop guarded by `is_running`.
    pub async fn finished(&mut self) -> Result<(), UploadError> {
        let Some(handle) = self.handle.as_mut() else {
            return std::future::pending().await;
        };
        let result = handle.await;
        self.handle = None;
        match result {
            Ok(outcome) => outcome,
            Err(_) => Err(UploadError::Aborted),
        }
    }
}

impl Drop for UploadTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Start pumping `body` into a new outbound body.
///
/// Bodies that are already complete (e.g. a GET without content) are not
/// given a task.
pub fn spawn_upload(body: Body) -> (UploadBody, UploadTask) {
    if body.is_end_stream() {
        return (UploadBody::empty(), UploadTask::finished_already());
    }

    let (tx, rx) = mpsc::channel(UPLOAD_BUFFER_FRAMES);
    let outbound = UploadBody {
        rx: Some(rx),
        size_hint: body.size_hint(),
        done: false,
    };
    let handle = tokio::spawn(pump(body, tx));

    (
        outbound,
        UploadTask {
            handle: Some(handle),
        },
    )
}

async fn pump(mut body: Body, tx: mpsc::Sender<UploadEvent>) -> Result<(), UploadError> {
    loop {
        match body.frame().await {
            Some(Ok(frame)) => {
                if tx.send(UploadEvent::Frame(frame)).await.is_err() {
                    // Outbound request no longer wants the body.
                    tracing::debug!("Outbound body dropped before upload completed");
                    return Ok(());
                }
            }
            Some(Err(e)) => {
                let reason = e.to_string();
                let _ = tx.send(UploadEvent::Failed(reason.clone())).await;
                return Err(UploadError::Inbound(reason));
            }
            None => {
                let _ = tx.send(UploadEvent::End).await;
                return Ok(());
            }
        }
    }
}
