//! `commentctl download`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::app::App;
use crate::backup::{DeliveryOutcome, FileSink, deliver, open_artifact};
use crate::utils::format_bytes;

/// Copy an archive to `output` (default: current directory) and delete it.
pub async fn execute(app: &App, file: &str, output: Option<&Path>) -> Result<PathBuf> {
    let artifact = open_artifact(app.backup_dir(), file)
        .await
        .with_context(|| format!("Backup '{file}' not found or not readable"))?;

    let target = match output {
        Some(path) if path.is_dir() => path.join(&artifact.headers().file_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(&artifact.headers().file_name),
    };
    if is_same_file(&target, artifact.path()).await {
        anyhow::bail!(
            "Output {} is the backup itself; choose another location",
            target.display()
        );
    }

    let mut sink = FileSink::new(&target);
    match deliver(artifact, &mut sink, app.chunk_size()).await? {
        DeliveryOutcome::Completed { bytes } => {
            println!(
                "Downloaded {} to {}",
                format_bytes(bytes),
                target.display()
            );
            Ok(target)
        },
        DeliveryOutcome::Aborted { bytes_sent } => anyhow::bail!(
            "Download interrupted after {}; backup kept",
            format_bytes(bytes_sent)
        ),
    }
}

async fn is_same_file(target: &Path, artifact: &Path) -> bool {
    match (
        tokio::fs::canonicalize(target).await,
        tokio::fs::canonicalize(artifact).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
