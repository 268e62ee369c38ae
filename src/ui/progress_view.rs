//! ダウンロード進捗表示

use std::sync::atomic::{AtomicU8, Ordering};

use crate::ffmpeg::{DownloadProgress, DownloadStatus, ProgressCallback};

/// 進捗を10%刻みで1行にまとめる
///
/// 同じ刻みの間は `None`。
pub fn progress_line(progress: &DownloadProgress, last_decile: &AtomicU8) -> Option<String> {
    match &progress.status {
        DownloadStatus::Preparing => {
            last_decile.store(0, Ordering::SeqCst);
            None
        }
        DownloadStatus::Downloading => {
            let total = progress.total?;
            let decile = ((progress.progress.clamp(0.0, 1.0) * 10.0) as u8).min(10);
            if decile > last_decile.load(Ordering::SeqCst) {
                last_decile.store(decile, Ordering::SeqCst);
                Some(format!(
                    "  {}: {}% ({} / {})",
                    progress.binary,
                    decile as u32 * 10,
                    format_size(progress.downloaded),
                    format_size(total)
                ))
            } else {
                None
            }
        }
        DownloadStatus::Extracting => Some(format!("  {}: extracting...", progress.binary)),
        DownloadStatus::Completed => Some(format!("  {}: done", progress.binary)),
        DownloadStatus::Error(message) => Some(format!("  {}: failed ({})", progress.binary, message)),
    }
}

/// 標準出力に進捗を表示するコールバック
pub fn download_progress_printer() -> ProgressCallback {
    let last_decile = AtomicU8::new(0);
    Box::new(move |progress| {
        if let Some(line) = progress_line(&progress, &last_decile) {
            println!("{}", line);
        }
    })
}

/// ファイルサイズを人間が読める形式にフォーマット
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downloading(downloaded: u64, total: u64) -> DownloadProgress {
        DownloadProgress {
            binary: "ffmpeg".to_string(),
            downloaded,
            total: Some(total),
            progress: downloaded as f32 / total as f32,
            status: DownloadStatus::Downloading,
        }
    }

    #[test]
    fn test_progress_line_once_per_decile() {
        let last = AtomicU8::new(0);
        assert_eq!(progress_line(&downloading(5, 100), &last), None);
        assert_eq!(
            progress_line(&downloading(12, 100), &last).as_deref(),
            Some("  ffmpeg: 10% (12 B / 100 B)")
        );
        assert_eq!(progress_line(&downloading(15, 100), &last), None);
        assert!(progress_line(&downloading(100, 100), &last)
            .unwrap()
            .contains("100%"));
    }

    #[test]
    fn test_progress_line_unknown_total_is_silent() {
        let last = AtomicU8::new(0);
        let progress = DownloadProgress {
            total: None,
            ..downloading(50, 100)
        };
        assert_eq!(progress_line(&progress, &last), None);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(80 * 1024 * 1024), "80.00 MB");
    }
}
