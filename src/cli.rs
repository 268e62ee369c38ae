//! コマンドライン引数

use clap::Parser;
use std::path::PathBuf;

use crate::transcoder::CodecVariant;

/// Convert every .mp4/.mov/.avi file in a folder to HAP or HAP Q with FFmpeg.
#[derive(Parser, Debug, Default)]
#[command(name = "tohap")]
#[command(version)]
#[command(about = "Batch converter to HAP / HAP Q using a locally provisioned FFmpeg")]
pub struct Cli {
    /// Folder to scan for input videos (default: current directory)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Folder holding the FFmpeg binaries (downloaded there when empty)
    #[arg(long, env = "FFMPEG_DIR")]
    pub ffmpeg_dir: Option<PathBuf>,

    /// Codec to use instead of asking
    #[arg(short, long, value_enum)]
    pub codec: Option<CodecVariant>,

    /// Keep the audio track instead of asking
    #[arg(long, conflicts_with = "drop_audio")]
    pub keep_audio: bool,

    /// Remove the audio track instead of asking
    #[arg(long)]
    pub drop_audio: bool,

    /// Exit without waiting for Enter
    #[arg(long)]
    pub no_pause: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// 音声の扱いが引数で指定されていればその値
    pub fn audio_override(&self) -> Option<bool> {
        match (self.keep_audio, self.drop_audio) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// ログのデフォルトフィルター
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
