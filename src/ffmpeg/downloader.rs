//! FFmpeg自動ダウンロード

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use super::{ToolchainSource, FFMPEG_NAME};

/// ダウンロードするバイナリ（ffprobeは無ければ省略）
const BINARIES: &[(&str, bool)] = &[("ffmpeg", true), ("ffprobe", false)];

/// マニフェスト取得段階の進捗名
const MANIFEST_STEP: &str = "manifest";

/// ダウンロード進捗コールバック
pub type ProgressCallback = Box<dyn Fn(DownloadProgress) + Send + Sync>;

/// ダウンロード進捗
#[derive(Clone, Debug)]
pub struct DownloadProgress {
    /// 対象バイナリ名
    pub binary: String,
    /// ダウンロード済みバイト数
    pub downloaded: u64,
    /// 総バイト数（不明な場合はNone）
    pub total: Option<u64>,
    /// 進捗率（0.0 - 1.0）
    pub progress: f32,
    /// 現在のステータス
    pub status: DownloadStatus,
}

/// ダウンロードステータス
#[derive(Clone, Debug, PartialEq)]
pub enum DownloadStatus {
    /// 準備中
    Preparing,
    /// ダウンロード中
    Downloading,
    /// 展開中
    Extracting,
    /// 完了
    Completed,
    /// エラー
    Error(String),
}

/// ffbinaries のリリース情報
#[derive(Debug, Deserialize)]
pub struct ReleaseManifest {
    pub version: String,
    /// プラットフォーム名 -> (バイナリ名 -> zip URL)
    pub bin: HashMap<String, HashMap<String, String>>,
}

impl ReleaseManifest {
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid FFmpeg release manifest")
    }

    /// 指定プラットフォームのダウンロード対象 (名前, URL)
    pub fn archives_for(&self, platform: &str) -> Result<Vec<(&'static str, &str)>> {
        let urls = self
            .bin
            .get(platform)
            .ok_or_else(|| anyhow!("No FFmpeg {} build for platform {}", self.version, platform))?;

        let mut archives = Vec::new();
        for &(name, required) in BINARIES {
            match urls.get(name) {
                Some(url) => archives.push((name, url.as_str())),
                None if required => bail!("Manifest has no {} for {}", name, platform),
                None => warn!("Manifest has no {} for {}, skipping", name, platform),
            }
        }
        Ok(archives)
    }
}

/// OSとアーキテクチャからffbinariesのプラットフォーム名を決定
pub fn platform_key(os: &str, arch: &str) -> Option<&'static str> {
    match (os, arch) {
        ("windows", "x86_64") => Some("windows-64"),
        ("windows", "x86") => Some("windows-32"),
        ("linux", "x86_64") => Some("linux-64"),
        ("linux", "x86") => Some("linux-32"),
        ("linux", "aarch64") => Some("linux-arm64"),
        ("linux", "arm") => Some("linux-armhf"),
        ("macos", _) => Some("osx-64"),
        _ => None,
    }
}

/// FFmpegダウンローダー
pub struct FfmpegDownloader {
    manifest_url: String,
    progress_callback: Option<ProgressCallback>,
}

impl FfmpegDownloader {
    pub fn new(manifest_url: impl Into<String>) -> Self {
        Self {
            manifest_url: manifest_url.into(),
            progress_callback: None,
        }
    }

    /// 進捗コールバックを設定
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn notify(&self, progress: DownloadProgress) {
        if let Some(ref cb) = self.progress_callback {
            cb(progress);
        }
    }

    /// 最新版をダウンロードして展開
    ///
    /// `step` には処理中の対象（"manifest" またはバイナリ名）を記録する
    fn download_latest(&self, dest_dir: &Path, step: &mut &'static str) -> Result<()> {
        let platform = platform_key(std::env::consts::OS, std::env::consts::ARCH)
            .ok_or_else(|| {
                anyhow!(
                    "No prebuilt FFmpeg for {}/{}",
                    std::env::consts::OS,
                    std::env::consts::ARCH
                )
            })?;

        // ダウンロード時間はファイルサイズ次第なのでタイムアウトは設けない
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<std::time::Duration>)
            .user_agent(concat!("tohap/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!("Fetching FFmpeg release manifest from {}", self.manifest_url);
        let response = client
            .get(&self.manifest_url)
            .send()
            .context("Failed to fetch release manifest")?;
        if !response.status().is_success() {
            bail!("Release manifest request failed with status: {}", response.status());
        }
        let manifest = ReleaseManifest::parse(&response.text()?)?;
        info!("Latest FFmpeg release: {} ({})", manifest.version, platform);

        for (name, url) in manifest.archives_for(platform)? {
            *step = name;
            let archive_path = dest_dir.join(format!("{}-download.zip", name));
            let downloaded = self.download_archive(&client, name, url, &archive_path)?;

            self.notify(DownloadProgress {
                binary: name.to_string(),
                downloaded,
                total: Some(downloaded),
                progress: 1.0,
                status: DownloadStatus::Extracting,
            });
            let extracted = extract_archive(&archive_path, dest_dir)?;
            debug!("Extracted {:?}", extracted);
            if name == "ffmpeg" && !dest_dir.join(FFMPEG_NAME).exists() {
                bail!("Downloaded archive did not contain {}", FFMPEG_NAME);
            }

            // アーカイブを削除（残っていても次回は既存ディレクトリとして扱われる）
            if let Err(e) = fs::remove_file(&archive_path) {
                warn!("Failed to remove {:?}: {}", archive_path, e);
            }

            self.notify(DownloadProgress {
                binary: name.to_string(),
                downloaded,
                total: Some(downloaded),
                progress: 1.0,
                status: DownloadStatus::Completed,
            });
        }

        Ok(())
    }

    /// アーカイブをファイルに保存
    fn download_archive(
        &self,
        client: &reqwest::blocking::Client,
        name: &str,
        url: &str,
        archive_path: &Path,
    ) -> Result<u64> {
        self.notify(DownloadProgress {
            binary: name.to_string(),
            downloaded: 0,
            total: None,
            progress: 0.0,
            status: DownloadStatus::Preparing,
        });

        info!("Downloading {} from {}", name, url);

        let response = client
            .get(url)
            .send()
            .context("Failed to start download")?;

        if !response.status().is_success() {
            bail!("Download failed with status: {}", response.status());
        }

        let total_size = response.content_length();
        let mut downloaded: u64 = 0;

        let mut file = File::create(archive_path)
            .with_context(|| format!("Failed to create {:?}", archive_path))?;
        let mut reader = BufReader::new(response);
        let mut buffer = [0; 8192];

        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }

            file.write_all(&buffer[..bytes_read])?;
            downloaded += bytes_read as u64;

            let progress = total_size
                .map(|t| downloaded as f32 / t as f32)
                .unwrap_or(0.0);
            self.notify(DownloadProgress {
                binary: name.to_string(),
                downloaded,
                total: total_size,
                progress,
                status: DownloadStatus::Downloading,
            });
        }

        info!("Download complete: {} bytes", downloaded);
        Ok(downloaded)
    }
}

impl ToolchainSource for FfmpegDownloader {
    fn fetch_into(&self, dir: &Path) -> Result<()> {
        let mut step = MANIFEST_STEP;
        let result = self.download_latest(dir, &mut step);
        if let Err(ref e) = result {
            self.notify(DownloadProgress {
                binary: step.to_string(),
                downloaded: 0,
                total: None,
                progress: 0.0,
                status: DownloadStatus::Error(format!("{:#}", e)),
            });
        }
        result
    }
}

/// zipアーカイブを展開
///
/// ffbinariesのアーカイブはバイナリがルートに1つ入っているだけなので、
/// そのままディレクトリ直下に展開する。
pub fn extract_archive(archive_path: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open {:?}", archive_path))?;
    let mut archive = zip::ZipArchive::new(file).context("Invalid zip archive")?;

    info!("Extracting {} files...", archive.len());

    let mut extracted = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            warn!("Skipping unsafe archive entry: {}", entry.name());
            continue;
        };
        // macOSのメタデータ
        if relative.starts_with("__MACOSX") {
            continue;
        }

        let outpath = dest_dir.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut outfile = File::create(&outpath)
            .with_context(|| format!("Failed to create {:?}", outpath))?;
        io::copy(&mut entry, &mut outfile)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&outpath, fs::Permissions::from_mode(0o755))?;
        }

        extracted.push(outpath);
    }

    Ok(extracted)
}
