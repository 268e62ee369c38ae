//! 入力ファイル検出

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::ConvertError;

/// 対象とする拡張子（大文字小文字を区別する）
pub const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".avi"];

/// 検出された入力ファイル
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFile {
    /// 絶対パス
    pub path: PathBuf,
    /// 表示用ファイル名
    pub name: String,
    /// 拡張子（ドット無し）
    pub extension: String,
}

impl VideoFile {
    fn from_path(path: PathBuf) -> Option<Self> {
        // 照合は表示用の名前ではなく実際のファイル名で行う
        let file_name = path.file_name()?;
        let matched = VIDEO_EXTENSIONS
            .iter()
            .find(|ext| file_name.as_encoded_bytes().ends_with(ext.as_bytes()))?;
        let extension = matched.trim_start_matches('.').to_string();
        let name = file_name.to_string_lossy().into_owned();

        Some(Self {
            path,
            name,
            extension,
        })
    }

    /// 拡張子を除いたファイル名
    ///
    /// ".mp4" のように拡張子だけの名前は空になる
    pub fn stem(&self) -> &OsStr {
        match self.path.extension() {
            Some(_) => self.path.file_stem().unwrap_or_default(),
            None => OsStr::new(""),
        }
    }
}

/// ディレクトリ直下の動画ファイルを列挙
///
/// サブディレクトリは辿らない。順序はファイルシステムの列挙順のまま。
pub fn discover(directory: &Path) -> Result<Vec<VideoFile>, ConvertError> {
    let directory = std::path::absolute(directory)
        .map_err(|e| ConvertError::io("failed to resolve", directory, e))?;
    let entries =
        fs::read_dir(&directory).map_err(|e| ConvertError::io("failed to read", &directory, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConvertError::io("failed to read", &directory, e))?;
        // シンボリックリンク先がファイルなら対象に含める
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        if let Some(file) = VideoFile::from_path(path) {
            debug!("Discovered input: {:?}", file.path);
            files.push(file);
        }
    }

    Ok(files)
}
