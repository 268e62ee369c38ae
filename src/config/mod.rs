//! 設定モジュール

mod settings;

pub use settings::Settings;

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::cli::Cli;
use crate::transcoder::CodecVariant;

/// 実行時に確定した設定
///
/// 起動時に一度だけ解決し、以降は各コンポーネントへ明示的に渡す。
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// 入力を探すディレクトリ（絶対パス）
    pub work_dir: PathBuf,
    /// FFmpegを置くディレクトリ
    pub ffmpeg_dir: PathBuf,
    /// 出力ファイル名サフィックス
    pub output_suffix: String,
    /// FFmpegリリース情報のURL
    pub manifest_url: String,
    /// 引数で指定されたコーデック
    pub codec: Option<CodecVariant>,
    /// 引数で指定された音声の扱い
    pub include_audio: Option<bool>,
    /// 終了前にキー入力を待つ
    pub pause_on_exit: bool,
}

impl RunConfig {
    /// 引数 > 環境変数（clap経由） > 設定ファイル > デフォルト の順で解決
    pub fn resolve(cli: &Cli, settings: Settings) -> Result<Self> {
        let work_dir = match &cli.dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        let work_dir = std::path::absolute(&work_dir)
            .with_context(|| format!("Failed to resolve {:?}", work_dir))?;

        let ffmpeg_dir = match cli
            .ffmpeg_dir
            .clone()
            .or_else(|| settings.ffmpeg_custom_dir.clone())
        {
            Some(dir) => dir,
            None => Settings::default_ffmpeg_dir()?,
        };

        Ok(Self {
            work_dir,
            ffmpeg_dir,
            output_suffix: settings.output_suffix,
            manifest_url: settings.manifest_url,
            codec: cli.codec,
            include_audio: cli.audio_override(),
            pause_on_exit: settings.pause_on_exit && !cli.no_pause,
        })
    }
}
