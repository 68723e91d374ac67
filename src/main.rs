use anyhow::Result;
use chrono::Local;
use reqwest::Client;
use rnascan::{
    config::{Lookup, Settings, SETTINGS_FILE},
    pipeline,
    progress::{self, IndicatifProgress},
};
use std::time::Duration;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ─── 1) init logging, routed around the progress bars ───────────
    let multi = progress::init_logging();
    info!("startup");

    // ─── 2) settings + lookup tables ─────────────────────────────────
    let settings = Settings::load_or_default(SETTINGS_FILE)?;
    let lookup = Lookup::load(&settings)?;
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .user_agent(concat!("rnascan/", env!("CARGO_PKG_VERSION")))
        .build()?;

    // ─── 3) run ──────────────────────────────────────────────────────
    let download_bar = IndicatifProgress::download(&multi, "téléchargement");
    let scan_bar = IndicatifProgress::files(&multi, 0);
    let today = Local::now().date_naive();
    let out = pipeline::run(
        &client,
        &settings,
        &lookup,
        today,
        &download_bar,
        &scan_bar,
    )
    .await?;

    // ─── 4) final report ─────────────────────────────────────────────
    println!();
    print!("{}", out.written.summary_text);
    if out.written.workbook_written {
        println!(
            "\nLe fichier Excel '{}' a bien été créé.",
            out.written.paths.workbook.display()
        );
    }
    info!(snapshot = %out.snapshot.filename, fetch = ?out.fetch, "all done");
    Ok(())
}
