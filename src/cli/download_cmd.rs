//! `apkscout download`: resolve and fetch the APK in one step.

use crate::catalog;
use crate::cli::output;
use crate::cli::resolve_cmd::{assemble_query, build_resolver};
use crate::download::Downloader;
use crate::events::{EventBus, EventReceiver, ResolveEvent};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;

const BAR_TEMPLATE: &str = "  {bytes}/{total_bytes} [{bar:30}] ({bytes_per_sec}, {eta})";

#[allow(clippy::too_many_arguments)]
pub async fn run(
    app: &str,
    platform: &str,
    version: Option<&str>,
    arch: Option<&str>,
    dpi: Option<&str>,
    build_type: Option<&str>,
    fuzzy: bool,
    output_path: Option<&str>,
) -> Result<()> {
    let root = catalog::catalog_root();
    let descriptor = catalog::load(&root, platform, app)?;

    let bus = EventBus::new(256);
    let events = Some(bus.sender());
    let query = assemble_query(&descriptor, version, arch, dpi, build_type, &events);

    let resolution = {
        let resolver = build_resolver(fuzzy, Some(bus.sender()));
        resolver.resolve_download(&query).await?
    };

    if !output::is_quiet() && !output::is_json() {
        println!(
            "  {} {} ({})",
            query.app, resolution.resolved_version, query.arch
        );
    }

    let dest = match output_path {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(format!(
            "{}-{}-{}.apk",
            query.app, resolution.resolved_version, query.arch
        )),
    };

    let progress = if output::is_quiet() || output::is_json() {
        None
    } else {
        Some(tokio::spawn(drive_progress(bus.subscribe())))
    };

    let outcome = {
        let downloader = Downloader::new()?.with_events(bus.sender());
        downloader
            .download(&resolution.final_download_url, &dest)
            .await
    };

    // Drop every sender so the progress task drains and exits.
    drop(events);
    drop(bus);
    if let Some(task) = progress {
        let _ = task.await;
    }

    let report = outcome?;
    if output::is_json() {
        output::print_json(&serde_json::json!({
            "app": query.app,
            "version": resolution.resolved_version,
            "url": report.url,
            "path": report.path,
            "bytes": report.bytes_written,
            "sha256": report.sha256,
        }));
        return Ok(());
    }

    if !output::is_quiet() {
        println!("  sha256 {}", report.sha256);
    }
    println!("{}", report.path.display());
    Ok(())
}

/// Render download events as a terminal progress bar until the transfer
/// completes or every sender is gone.
async fn drive_progress(mut rx: EventReceiver) {
    let mut bar: Option<ProgressBar> = None;
    loop {
        match rx.recv().await {
            Ok(ResolveEvent::DownloadStarted { total_bytes, .. }) => {
                bar = Some(make_bar(total_bytes));
            }
            Ok(ResolveEvent::DownloadProgress { bytes_written, .. }) => {
                if let Some(b) = &bar {
                    b.set_position(bytes_written);
                }
            }
            Ok(ResolveEvent::DownloadComplete { .. }) => {
                if let Some(b) = &bar {
                    b.finish_and_clear();
                }
                break;
            }
            Ok(_) => {}
            Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => {
                if let Some(b) = &bar {
                    b.abandon();
                }
                break;
            }
        }
    }
}

fn make_bar(total_bytes: Option<u64>) -> ProgressBar {
    let bar = match total_bytes {
        Some(total) => ProgressBar::new(total),
        None => ProgressBar::new_spinner(),
    };
    if !output::no_color() {
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
    }
    bar
}
