//! FFmpegモジュール

mod downloader;
mod locator;
mod provisioner;

pub use downloader::{DownloadProgress, DownloadStatus, FfmpegDownloader, ProgressCallback};
pub use locator::{ToolchainLocation, FFMPEG_NAME};
pub use provisioner::ToolchainProvisioner;

use std::path::Path;

/// FFmpegバイナリの取得元
pub trait ToolchainSource {
    /// `dir` にFFmpegを配置する
    fn fetch_into(&self, dir: &Path) -> anyhow::Result<()>;
}

impl<T: ToolchainSource + ?Sized> ToolchainSource for &T {
    fn fetch_into(&self, dir: &Path) -> anyhow::Result<()> {
        (**self).fetch_into(dir)
    }
}
