//! Camera capture session for a scanning station.
//!
//! A [`ScanSession`] owns a [`FrameSource`] (the camera) for as long as its
//! polling loop runs. The loop pulls frames at a fixed interval, hands each to
//! a [`QrDecoder`], and stops at the first successful decode. Whatever ends
//! the loop (a decode, [`ScanSession::stop`], dropping the handle, or a device
//! error) the source is released exactly once before the task finishes.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// A single greyscale camera frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub luma: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("camera device error: {0}")]
    Device(String),
}

/// A camera or other frame producer.
#[async_trait]
pub trait FrameSource: Send + 'static {
    /// Next frame, or `None` when no new frame is ready yet.
    async fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Give the device back. Called once, after the last `next_frame`.
    async fn release(&mut self);
}

/// Extracts QR content from a frame.
pub trait QrDecoder: Send + Sync + 'static {
    fn decode(&self, frame: &Frame) -> Option<String>;
}

/// Why the polling loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Decoded,
    Stopped,
    DeviceError(String),
}

/// Handle to a running capture loop.
pub struct ScanSession {
    cancel: CancellationToken,
    decoded: Option<oneshot::Receiver<String>>,
    task: Option<JoinHandle<SessionEnd>>,
}

impl ScanSession {
    /// Acquire `source` and start polling it every `poll_interval`.
    pub fn start<S, D>(source: S, decoder: D, poll_interval: Duration) -> Self
    where
        S: FrameSource,
        D: QrDecoder,
    {
        let cancel = CancellationToken::new();
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(run(source, decoder, poll_interval, cancel.clone(), tx));

        Self {
            cancel,
            decoded: Some(rx),
            task: Some(task),
        }
    }

    /// Wait for the first decoded QR string.
    ///
    /// Returns `None` if the session ended without a decode, or if the
    /// result was already taken.
    pub async fn decoded(&mut self) -> Option<String> {
        let rx = self.decoded.take()?;
        rx.await.ok()
    }

    /// Cancel polling and wait until the source has been released.
    pub async fn stop(mut self) -> SessionEnd {
        self.cancel.cancel();
        match self.task.take() {
            Some(task) => task.await.unwrap_or_else(|e| {
                tracing::error!(error = %e, "Scan session task failed");
                SessionEnd::Stopped
            }),
            None => SessionEnd::Stopped,
        }
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        // The task observes the token, releases the source, and exits.
        self.cancel.cancel();
    }
}

async fn run<S, D>(
    mut source: S,
    decoder: D,
    poll_interval: Duration,
    cancel: CancellationToken,
    tx: oneshot::Sender<String>,
) -> SessionEnd
where
    S: FrameSource,
    D: QrDecoder,
{
    let end = poll(&mut source, &decoder, poll_interval, &cancel, tx).await;
    source.release().await;
    tracing::debug!(?end, "Scan session ended, camera released");
    end
}

async fn poll<S, D>(
    source: &mut S,
    decoder: &D,
    poll_interval: Duration,
    cancel: &CancellationToken,
    tx: oneshot::Sender<String>,
) -> SessionEnd
where
    S: FrameSource,
    D: QrDecoder,
{
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            () = cancel.cancelled() => return SessionEnd::Stopped,
            _ = ticker.tick() => {}
        }

        let frame = tokio::select! {
            () = cancel.cancelled() => return SessionEnd::Stopped,
            frame = source.next_frame() => frame,
        };

        match frame {
            Ok(Some(frame)) => {
                if let Some(content) = decoder.decode(&frame) {
                    // The receiver may already be gone; the decode still ends the session.
                    let _ = tx.send(content);
                    return SessionEnd::Decoded;
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Camera frame capture failed");
                return SessionEnd::DeviceError(e.to_string());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
