//! FFmpegの準備（無ければダウンロード）

use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{ToolchainLocation, ToolchainSource};
use crate::error::ConvertError;

/// ツールチェーンディレクトリを用意する
pub struct ToolchainProvisioner<S> {
    dir: PathBuf,
    source: S,
}

impl<S: ToolchainSource> ToolchainProvisioner<S> {
    pub fn new(dir: PathBuf, source: S) -> Self {
        Self { dir, source }
    }

    /// ディレクトリを作成し、ファイルが1つも無ければダウンロードする
    ///
    /// 既存ファイルの中身（バージョンや完全性）は検証しない。
    pub fn ensure_toolchain<W: Write>(
        &self,
        out: &mut W,
    ) -> Result<ToolchainLocation, ConvertError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| ConvertError::io("failed to create", &self.dir, e))?;

        if Self::contains_file(&self.dir)? {
            writeln!(out, "FFmpeg is already downloaded.")
                .map_err(|e| ConvertError::io("failed to write", "<stdout>", e))?;
            debug!("Using existing toolchain in {:?}", self.dir);
        } else {
            writeln!(out, "Downloading the latest version of FFmpeg...")
                .map_err(|e| ConvertError::io("failed to write", "<stdout>", e))?;
            self.source
                .fetch_into(&self.dir)
                .map_err(ConvertError::ToolchainDownload)?;
            info!("FFmpeg downloaded into {:?}", self.dir);
        }

        Ok(ToolchainLocation::resolve(&self.dir))
    }

    /// 直下に通常ファイルがあるか（サブディレクトリは数えない）
    fn contains_file(dir: &Path) -> Result<bool, ConvertError> {
        let entries = fs::read_dir(dir).map_err(|e| ConvertError::io("failed to read", dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| ConvertError::io("failed to read", dir, e))?;
            if entry.path().is_file() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
