//! ツールチェーンディレクトリ内のFFmpeg実行ファイル解決

use log::debug;
use std::path::{Path, PathBuf};

/// FFmpeg実行ファイル名
#[cfg(target_os = "windows")]
pub const FFMPEG_NAME: &str = "ffmpeg.exe";
#[cfg(not(target_os = "windows"))]
pub const FFMPEG_NAME: &str = "ffmpeg";

/// FFmpegの配置場所
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolchainLocation {
    /// ツールチェーンディレクトリ
    pub dir: PathBuf,
    /// 実行に使うFFmpegのパス
    pub executable: PathBuf,
}

impl ToolchainLocation {
    /// ディレクトリ内の実行ファイルを解決
    ///
    /// 直下を優先し、無ければ bin サブディレクトリを見る。どちらも無い場合は
    /// 直下のパスを返す（存在確認はしない。起動時に失敗する）。
    pub fn resolve(dir: &Path) -> Self {
        let direct = dir.join(FFMPEG_NAME);
        let in_bin = dir.join("bin").join(FFMPEG_NAME);

        let executable = if !direct.exists() && in_bin.exists() {
            in_bin
        } else {
            direct
        };
        debug!("FFmpeg executable: {:?}", executable);

        Self {
            dir: dir.to_path_buf(),
            executable,
        }
    }
}
