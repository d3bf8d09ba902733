//! Backup artifacts: creation, one-time download, and retention.
//!
//! An artifact moves through `absent -> created -> streaming`, ending
//! either deleted (stream completed) or back at `created` when the client
//! disconnects, so the download can be retried.

mod archive;
mod generator;
mod retrieval;
mod sweep;

pub use archive::{ArchiveWriter, ZipArchiveWriter};
pub use generator::{
    BackupArtifact, BackupDocument, BackupGenerator, BackupOutcome, ensure_backup_dir,
};
pub use retrieval::{
    ArtifactHeaders, BodyStream, ChannelSink, DeliveryOutcome, DownloadSink, FileSink,
    OpenArtifact, deliver, open_artifact,
};
pub use sweep::{SweepReport, is_backup_file_name, sweep_expired};
