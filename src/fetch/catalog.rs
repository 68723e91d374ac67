// src/fetch/catalog.rs
use anyhow::{Context, Result};
use chrono::{Datelike, Months, NaiveDate};
use regex::Regex;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument};

use crate::{
    config::Settings,
    error::RnaError,
    snapshot::{month_stamp, Snapshot, SNAPSHOT_PREFIX},
};

/// GET the catalog page and return its body. Anything but 200 is fatal.
pub async fn fetch_catalog(client: &Client, url: &str) -> Result<String> {
    debug!("Fetching catalog from {}", url);
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?;
    if resp.status() != StatusCode::OK {
        return Err(RnaError::RemoteFetch {
            url: url.to_string(),
            status: resp.status().as_u16(),
        }
        .into());
    }
    resp.text()
        .await
        .with_context(|| format!("Reading text from {}", url))
}

/// First download URL for `year`/`month` embedded anywhere in `text`.
pub fn find_snapshot_url(
    text: &str,
    download_base: &str,
    year: i32,
    month: u32,
) -> Result<Option<String>> {
    let pattern = format!(
        r"{}{}{}[0-9A-Za-z_]*\.zip",
        regex::escape(download_base),
        SNAPSHOT_PREFIX,
        month_stamp(year, month)
    );
    let re = Regex::new(&pattern).with_context(|| format!("bad snapshot pattern {}", pattern))?;
    Ok(re.find(text).map(|m| m.as_str().to_string()))
}

/// Walk back month by month from `today` until the catalog text mentions a
/// snapshot, probing at most `max_lookback` months.
pub fn locate_in_catalog(
    text: &str,
    download_base: &str,
    today: NaiveDate,
    max_lookback: u32,
) -> Result<Snapshot> {
    let start = today.with_day(1).unwrap_or(today);
    for back in 0..max_lookback {
        let Some(month) = start.checked_sub_months(Months::new(back)) else {
            break;
        };
        if let Some(url) = find_snapshot_url(text, download_base, month.year(), month.month())? {
            info!(%url, months_back = back, "found snapshot");
            return Snapshot::new(month, &url);
        }
        debug!(month = %month_stamp(month.year(), month.month()), "no snapshot listed");
    }
    Err(RnaError::MissingData(format!(
        "no {} snapshot listed within {} months of {}",
        SNAPSHOT_PREFIX, max_lookback, today
    ))
    .into())
}

/// Resolve the newest snapshot listed on the configured catalog page.
#[instrument(level = "info", skip(client, settings), fields(catalog = %settings.catalog_url))]
pub async fn locate_snapshot(
    client: &Client,
    settings: &Settings,
    today: NaiveDate,
) -> Result<Snapshot> {
    let text = fetch_catalog(client, &settings.catalog_url).await?;
    locate_in_catalog(
        &text,
        &settings.download_base,
        today,
        settings.max_lookback_months,
    )
}
