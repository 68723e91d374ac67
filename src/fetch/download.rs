use anyhow::{Context, Result};
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, instrument, warn};

use crate::{error::RnaError, progress::Progress};

/// Stream `url` into `dest`, reporting bytes through `progress`.
///
/// The body goes to `<dest>.part` first and is renamed once complete, so a
/// partial download never sits under the final name. Returns bytes written.
#[instrument(level = "info", skip(client, dest, progress), fields(dest = %dest.display()))]
pub async fn download_archive(
    client: &Client,
    url: &str,
    dest: &Path,
    progress: &dyn Progress,
) -> Result<u64> {
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to send request to {}", url))?;
    if resp.status() != StatusCode::OK {
        return Err(RnaError::RemoteFetch {
            url: url.to_string(),
            status: resp.status().as_u16(),
        }
        .into());
    }

    match resp.content_length() {
        Some(total) => progress.set_total(total),
        None => debug!("no content-length, size unknown"),
    }

    let part = part_path(dest);
    match stream_to_file(resp, &part, progress).await {
        Ok(written) => {
            fs::rename(&part, dest)
                .await
                .with_context(|| format!("renaming {} to {}", part.display(), dest.display()))?;
            progress.finish(format!("{:.1} Mo", written as f64 / 1_000_000.0));
            debug!("Download complete: {} bytes", written);
            Ok(written)
        }
        Err(e) => {
            if let Err(rm) = fs::remove_file(&part).await {
                warn!(error = %rm, path = %part.display(), "could not remove partial download");
            }
            Err(e)
        }
    }
}

async fn stream_to_file(
    resp: reqwest::Response,
    path: &Path,
    progress: &dyn Progress,
) -> Result<u64> {
    let mut file = fs::File::create(path)
        .await
        .with_context(|| format!("creating {}", path.display()))?;
    let mut stream = resp.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Failed to read chunk from response")?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        written += chunk.len() as u64;
        progress.inc(chunk.len() as u64);
    }
    file.flush().await?;
    Ok(written)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        progress::NullProgress,
        test_support::{ok, serve, status, RecordingProgress},
    };
    use tempfile::tempdir;

    #[tokio::test]
    async fn downloads_to_final_name() -> Result<()> {
        let server = serve(vec![("/rna/a.zip", ok(vec![7u8; 4096]))]).await;
        let tmp = tempdir()?;
        let dest = tmp.path().join("a.zip");

        let n = download_archive(&Client::new(), &server.url("/rna/a.zip"), &dest, &NullProgress)
            .await?;
        assert_eq!(n, 4096);
        assert_eq!(std::fs::read(&dest)?.len(), 4096);
        assert!(!part_path(&dest).exists());
        Ok(())
    }

    #[tokio::test]
    async fn content_length_sets_the_progress_total() -> Result<()> {
        let server = serve(vec![("/rna/a.zip", ok(vec![1u8; 2_500_000]))]).await;
        let tmp = tempdir()?;
        let progress = RecordingProgress::default();

        download_archive(
            &Client::new(),
            &server.url("/rna/a.zip"),
            &tmp.path().join("a.zip"),
            &progress,
        )
        .await?;

        assert_eq!(progress.total(), Some(2_500_000));
        assert_eq!(progress.position(), 2_500_000);
        assert_eq!(progress.finished().as_deref(), Some("2.5 Mo"));
        Ok(())
    }

    #[tokio::test]
    async fn non_200_leaves_nothing_behind() {
        let server = serve(vec![("/rna/a.zip", status(500))]).await;
        let tmp = tempdir().unwrap();
        let dest = tmp.path().join("a.zip");

        let err = download_archive(&Client::new(), &server.url("/rna/a.zip"), &dest, &NullProgress)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RnaError>(),
            Some(RnaError::RemoteFetch { status: 500, .. })
        ));
        assert!(!dest.exists());
        assert!(!part_path(&dest).exists());
    }
}
