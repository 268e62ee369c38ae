//! アプリケーション設定（JSON保存）

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// アプリケーション設定
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// FFmpegのカスタムディレクトリ
    pub ffmpeg_custom_dir: Option<PathBuf>,
    /// 出力ファイル名サフィックス（拡張子を含む）
    pub output_suffix: String,
    /// 終了前にキー入力を待つ
    pub pause_on_exit: bool,
    /// FFmpegリリース情報のURL
    pub manifest_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ffmpeg_custom_dir: None,
            output_suffix: "_converted.mov".to_string(),
            pause_on_exit: true,
            manifest_url: "https://ffbinaries.com/api/v1/version/latest".to_string(),
        }
    }
}

impl Settings {
    /// 設定ファイルのパスを取得
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("tohap");

        Ok(config_dir.join("settings.json"))
    }

    /// FFmpegのデフォルトディレクトリを取得
    ///
    /// Windowsでは %APPDATA%\tohap\ffmpeg、それ以外では ~/.tohap/ffmpeg
    pub fn default_ffmpeg_dir() -> Result<PathBuf> {
        #[cfg(target_os = "windows")]
        let base = dirs::data_dir()
            .context("Failed to get application data directory")?
            .join("tohap");
        #[cfg(not(target_os = "windows"))]
        let base = dirs::home_dir()
            .context("Failed to get home directory")?
            .join(".tohap");

        Ok(base.join("ffmpeg"))
    }

    /// 設定をファイルからロード
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            let settings: Settings = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {:?}", path))?;
            Ok(settings)
        } else {
            Ok(Self::default())
        }
    }
}
