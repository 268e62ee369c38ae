//! tohap
//!
//! フォルダ内の動画をFFmpegでHAP / HAP Qに一括変換する
//!
//! # ライセンス
//! GPL-3.0 (GPLビルドのFFmpegを使用するため)

mod app;
mod cli;
mod config;
mod error;
mod ffmpeg;
mod transcoder;
mod ui;

use anyhow::Result;
use clap::Parser;
use log::{debug, info, warn};
use std::io::{self, IsTerminal};
use std::time::Duration;

use crate::app::{RunOutcome, Workflow};
use crate::cli::Cli;
use crate::config::{RunConfig, Settings};
use crate::ffmpeg::FfmpegDownloader;
use crate::transcoder::{format_elapsed, FfmpegCommand};
use crate::ui::Console;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ロガー初期化
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    info!("tohap v{} starting...", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load().unwrap_or_else(|e| {
        warn!("Failed to load settings, using defaults: {:#}", e);
        Settings::default()
    });
    let config = RunConfig::resolve(&cli, settings)?;
    info!("Working directory: {:?}", config.work_dir);
    info!("FFmpeg directory: {:?}", config.ffmpeg_dir);

    let stdin = io::stdin();
    let pause = config.pause_on_exit && stdin.is_terminal();
    let mut console = Console::new(stdin.lock(), io::stdout().lock());
    console.say(&ui::banner())?;

    let downloader = FfmpegDownloader::new(config.manifest_url.clone())
        .with_progress(ui::download_progress_printer());
    let workflow = Workflow::new(config, downloader, FfmpegCommand);

    let outcome = workflow.run(&mut console);
    info!("Finished in state {:?}", workflow.state());

    if let RunOutcome::Completed(results) = outcome? {
        for result in &results {
            debug!(
                "{} -> {:?} ({}, success: {})",
                result.job.input.name,
                result.job.output_path,
                format_elapsed(result.elapsed),
                result.success
            );
        }
        let total: Duration = results.iter().map(|r| r.elapsed).sum();
        info!(
            "Converted {} file(s) in {}",
            results.len(),
            format_elapsed(total)
        );
    }

    if pause {
        console.pause()?;
    }

    Ok(())
}
