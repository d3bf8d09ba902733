//! One-time artifact download.
//!
//! An artifact is opened first, so a missing or unreadable file fails before
//! any byte or header reaches the client. The bytes are then pushed through
//! a [`DownloadSink`] in fixed-size chunks. The artifact is deleted only
//! after the sink confirms the last chunk was taken by its consumer. If the
//! client goes away first the artifact stays for a retry.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::audit::{AuditEvent, log_audit_event};
use crate::error::{Error, FsStep, Result};
use super::sweep::is_backup_file_name;
use crate::security::{is_traversal_attempt, sanitize_file_name};

/// Response metadata for an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHeaders {
    pub file_name: String,
    pub content_length: u64,
}

impl ArtifactHeaders {
    pub const CONTENT_TYPE: &'static str = "application/octet-stream";
    pub const CACHE_CONTROL: &'static str = "no-cache, no-store, must-revalidate";

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }
}

/// Destination of a download.
///
/// Implementations report a vanished client as [`Error::ClientDisconnect`].
#[async_trait]
pub trait DownloadSink: Send {
    /// Called once before the first chunk.
    async fn begin(&mut self, headers: &ArtifactHeaders) -> Result<()>;

    async fn write_chunk(&mut self, chunk: Bytes) -> Result<()>;

    /// Pushes buffered bytes toward the client.
    async fn flush(&mut self) -> Result<()>;

    /// Waits until every written byte has left the sink.
    ///
    /// Called once after the last chunk, before the artifact is removed.
    async fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    /// Tells the consumer the download failed part way.
    async fn abort(&mut self, _reason: &Error) {}
}

/// How a delivery ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Every byte was handed to the sink and the artifact is gone.
    Completed { bytes: u64 },
    /// The client disconnected; the artifact is still on disk.
    Aborted { bytes_sent: u64 },
}

/// An artifact opened for delivery.
#[derive(Debug)]
pub struct OpenArtifact {
    file: File,
    path: PathBuf,
    headers: ArtifactHeaders,
}

impl OpenArtifact {
    pub fn headers(&self) -> &ArtifactHeaders {
        &self.headers
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Resolves `requested` inside `dir` and opens it.
///
/// The requested name is reduced to a safe basename first; traversal
/// attempts are audited and resolved against `dir` like any other name.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the name is unusable or not a backup
/// archive, or if the file is missing, not a regular file, or unreadable.
pub async fn open_artifact(dir: &Path, requested: &str) -> Result<OpenArtifact> {
    let name = match sanitize_file_name(requested) {
        Ok(name) => name,
        Err(e) => {
            debug!(requested = %requested, error = %e, "Rejected download name");
            return Err(Error::NotFound(requested.to_string()));
        },
    };
    if is_traversal_attempt(requested) {
        log_audit_event(AuditEvent::PathTraversalBlocked {
            requested: requested.to_string(),
            sanitized: name.clone(),
        });
    }

    if !is_backup_file_name(&name) || !name.ends_with(".zip") {
        debug!(file = %name, "Refused download of non-archive file");
        return Err(Error::NotFound(name));
    }

    let path = dir.join(&name);
    let file = File::open(&path)
        .await
        .map_err(|_| Error::NotFound(name.clone()))?;
    let meta = file
        .metadata()
        .await
        .map_err(|_| Error::NotFound(name.clone()))?;
    if !meta.is_file() {
        return Err(Error::NotFound(name));
    }

    Ok(OpenArtifact {
        file,
        path,
        headers: ArtifactHeaders {
            file_name: name,
            content_length: meta.len(),
        },
    })
}

/// Streams `artifact` into `sink` and deletes it once fully handed over.
///
/// # Errors
///
/// Returns [`Error::FileSystem`] if the artifact cannot be read or removed,
/// or any non-disconnect error raised by the sink.
pub async fn deliver<S>(
    artifact: OpenArtifact,
    sink: &mut S,
    chunk_size: usize,
) -> Result<DeliveryOutcome>
where
    S: DownloadSink + ?Sized,
{
    let OpenArtifact {
        mut file,
        path,
        headers,
    } = artifact;
    let file_name = headers.file_name.clone();
    let mut sent: u64 = 0;

    let aborted = |sent: u64| -> Result<DeliveryOutcome> {
        log_audit_event(AuditEvent::DownloadAborted {
            file: file_name.clone(),
            bytes_sent: sent,
        });
        Ok(DeliveryOutcome::Aborted { bytes_sent: sent })
    };

    match sink.begin(&headers).await {
        Ok(()) => {},
        Err(Error::ClientDisconnect) => return aborted(sent),
        Err(e) => return Err(e),
    }

    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let n = match file.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                let err = Error::fs(FsStep::ReadArtifact, e);
                sink.abort(&err).await;
                return Err(err);
            },
        };
        if n == 0 {
            break;
        }

        let step = async {
            sink.write_chunk(Bytes::copy_from_slice(&buf[..n])).await?;
            sink.flush().await
        };
        match step.await {
            Ok(()) => sent += n as u64,
            Err(Error::ClientDisconnect) => return aborted(sent),
            Err(e) => return Err(e),
        }
    }

    match sink.finish().await {
        Ok(()) => {},
        Err(Error::ClientDisconnect) => return aborted(sent),
        Err(e) => return Err(e),
    }

    drop(file);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        error!(file = %file_name, error = %e, "Delivered backup could not be removed");
        return Err(Error::fs(FsStep::RemoveFile, e));
    }

    log_audit_event(AuditEvent::DownloadCompleted {
        file: file_name,
        bytes: sent,
    });
    Ok(DeliveryOutcome::Completed { bytes: sent })
}

/// Body stream paired with a [`ChannelSink`].
pub type BodyStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Feeds an HTTP response body through a bounded channel.
///
/// A closed receiver means the client is gone. [`DownloadSink::finish`]
/// resolves only once the body stream has yielded the final byte, so an
/// unread or dropped body never counts as delivered.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Option<mpsc::Sender<std::io::Result<Bytes>>>,
    delivered: Option<oneshot::Receiver<()>>,
}

struct BodyState {
    rx: mpsc::Receiver<std::io::Result<Bytes>>,
    remaining: u64,
    delivered: Option<oneshot::Sender<()>>,
}

impl BodyState {
    fn mark_delivered(&mut self) {
        if let Some(done) = self.delivered.take() {
            let _ = done.send(());
        }
    }
}

impl ChannelSink {
    /// Creates a sink and the body stream that drains it.
    ///
    /// `content_length` is the number of bytes the body must yield before
    /// the download counts as delivered.
    pub fn channel(capacity: usize, content_length: u64) -> (Self, BodyStream) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (done_tx, done_rx) = oneshot::channel();
        let state = BodyState {
            rx,
            remaining: content_length,
            delivered: Some(done_tx),
        };

        let body = stream::unfold(state, |mut state| async move {
            match state.rx.recv().await {
                Some(item) => {
                    if let Ok(chunk) = &item {
                        state.remaining = state.remaining.saturating_sub(chunk.len() as u64);
                        if state.remaining == 0 {
                            state.mark_delivered();
                        }
                    }
                    Some((item, state))
                },
                None => {
                    if state.remaining == 0 {
                        state.mark_delivered();
                    }
                    None
                },
            }
        })
        .boxed();

        let sink = Self {
            tx: Some(tx),
            delivered: Some(done_rx),
        };
        (sink, body)
    }

    fn sender(&self) -> Result<&mpsc::Sender<std::io::Result<Bytes>>> {
        self.tx.as_ref().ok_or(Error::ClientDisconnect)
    }
}

#[async_trait]
impl DownloadSink for ChannelSink {
    async fn begin(&mut self, _headers: &ArtifactHeaders) -> Result<()> {
        if self.sender()?.is_closed() {
            return Err(Error::ClientDisconnect);
        }
        Ok(())
    }

    async fn write_chunk(&mut self, chunk: Bytes) -> Result<()> {
        self.sender()?
            .send(Ok(chunk))
            .await
            .map_err(|_| Error::ClientDisconnect)
    }

    async fn flush(&mut self) -> Result<()> {
        // A chunk accepted by the channel is already on its way to the body.
        if self.sender()?.is_closed() {
            return Err(Error::ClientDisconnect);
        }
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        // Closing the sender lets the body see the end of an empty artifact.
        self.tx = None;
        match self.delivered.take() {
            Some(delivered) => delivered.await.map_err(|_| Error::ClientDisconnect),
            None => Err(Error::ClientDisconnect),
        }
    }

    async fn abort(&mut self, reason: &Error) {
        if let Some(tx) = self.tx.take() {
            let _ = tx
                .send(Err(std::io::Error::other(reason.user_message())))
                .await;
        }
    }
}

/// Writes a download to a local file.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Option<File>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or_else(|| {
            Error::fs(
                FsStep::WriteOutput,
                std::io::Error::other("output not opened"),
            )
        })
    }
}

#[async_trait]
impl DownloadSink for FileSink {
    async fn begin(&mut self, _headers: &ArtifactHeaders) -> Result<()> {
        let file = File::create(&self.path)
            .await
            .map_err(|e| Error::fs(FsStep::WriteOutput, e))?;
        self.file = Some(file);
        Ok(())
    }

    async fn write_chunk(&mut self, chunk: Bytes) -> Result<()> {
        self.file()?
            .write_all(&chunk)
            .await
            .map_err(|e| Error::fs(FsStep::WriteOutput, e))
    }

    async fn flush(&mut self) -> Result<()> {
        self.file()?
            .flush()
            .await
            .map_err(|e| Error::fs(FsStep::WriteOutput, e))
    }
}
