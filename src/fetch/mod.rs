// src/fetch/mod.rs
use anyhow::{Context, Result};
use reqwest::Client;
use std::{fs, path::Path};
use tracing::{info, instrument};

use crate::{progress::Progress, snapshot::Snapshot};

pub mod catalog;
pub mod download;
pub mod unpack;

/// What `ensure_snapshot` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Extracted folder already present; nothing touched.
    AlreadyPresent,
    /// Archive was on disk, only extraction ran.
    Extracted,
    /// Archive downloaded then extracted.
    Downloaded,
}

/// Make sure `snapshot` is extracted under `data_dir`.
///
/// The download is skipped when either the extracted folder or the archive
/// already exists; extraction is skipped when the folder exists. The archive
/// is removed once extracted.
#[instrument(level = "info", skip_all, fields(snapshot = %snapshot.filename))]
pub async fn ensure_snapshot(
    client: &Client,
    snapshot: &Snapshot,
    data_dir: &Path,
    progress: &dyn Progress,
) -> Result<FetchOutcome> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;
    let extracted = data_dir.join(snapshot.stem());
    let archive = data_dir.join(&snapshot.filename);

    if extracted.exists() {
        info!(dir = %extracted.display(), "snapshot already extracted");
        progress.finish(format!("{} déjà présent", snapshot.stem()));
        return Ok(FetchOutcome::AlreadyPresent);
    }

    let mut outcome = FetchOutcome::Extracted;
    if !archive.exists() {
        info!(url = %snapshot.url, "downloading");
        download::download_archive(client, &snapshot.url, &archive, progress).await?;
        outcome = FetchOutcome::Downloaded;
    } else {
        info!(archive = %archive.display(), "archive already downloaded");
        progress.finish(format!("{} déjà téléchargé", snapshot.filename));
    }

    let (zip_path, dest) = (archive.clone(), extracted.clone());
    tokio::task::spawn_blocking(move || unpack::extract_archive(&zip_path, &dest))
        .await
        .context("extraction task panicked")??;

    fs::remove_file(&archive).with_context(|| format!("removing {}", archive.display()))?;
    info!("deleted zip {}", archive.display());
    Ok(outcome)
}
