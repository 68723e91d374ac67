use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io,
    path::{Component, Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};
use zip::ZipArchive;

/// Extract `zip_path` into `dest_dir`.
///
/// Archives either hold the region files flat or wrapped in one folder named
/// like `dest_dir`; that wrapper is stripped so both layouts end up the same.
/// Extraction happens in a hidden sibling folder that is renamed into place at
/// the end. Returns the number of files written.
#[instrument(level = "info", skip(zip_path, dest_dir), fields(zip = %zip_path.display()))]
pub fn extract_archive(zip_path: &Path, dest_dir: &Path) -> Result<usize> {
    let file = File::open(zip_path)
        .with_context(|| format!("Failed to open ZIP file: {:?}", zip_path))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {:?}", zip_path))?;

    let wrapper = dest_dir
        .file_name()
        .map(PathBuf::from)
        .filter(|w| all_entries_under(&mut archive, w));
    if let Some(w) = &wrapper {
        debug!(wrapper = %w.display(), "stripping archive folder");
    }

    let staging = staging_dir(dest_dir)?;
    if staging.exists() {
        fs::remove_dir_all(&staging)
            .with_context(|| format!("clearing stale {}", staging.display()))?;
    }
    fs::create_dir_all(&staging).with_context(|| format!("creating {}", staging.display()))?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to access ZIP entry #{} in {:?}", i, zip_path))?;
        let Some(name) = entry.enclosed_name() else {
            warn!(entry = entry.name(), "skipping unsafe archive path");
            continue;
        };
        let relative = match &wrapper {
            Some(w) => name.strip_prefix(w).unwrap_or(&name).to_path_buf(),
            None => name,
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let out = staging.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut target =
            File::create(&out).with_context(|| format!("creating {}", out.display()))?;
        io::copy(&mut entry, &mut target)
            .with_context(|| format!("extracting {} to {}", entry.name(), out.display()))?;
        written += 1;
    }

    fs::rename(&staging, dest_dir)
        .with_context(|| format!("moving {} to {}", staging.display(), dest_dir.display()))?;
    info!(files = written, dest = %dest_dir.display(), "extracted");
    Ok(written)
}

fn all_entries_under(archive: &mut ZipArchive<File>, wrapper: &Path) -> bool {
    let mut any = false;
    for i in 0..archive.len() {
        let Ok(entry) = archive.by_index(i) else {
            return false;
        };
        match entry.enclosed_name() {
            Some(name) if name.components().next() == Some(Component::Normal(wrapper.as_os_str())) => {
                any = true;
            }
            _ => return false,
        }
    }
    any
}

fn staging_dir(dest_dir: &Path) -> Result<PathBuf> {
    let name = dest_dir
        .file_name()
        .with_context(|| format!("{} has no folder name", dest_dir.display()))?;
    let mut staging = std::ffi::OsString::from(".");
    staging.push(name);
    staging.push(".partial");
    Ok(dest_dir.with_file_name(staging))
}
