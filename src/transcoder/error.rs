//! FFmpegエラー解析

/// FFmpegエラーの種類
#[derive(Debug, Clone, PartialEq)]
pub enum FfmpegErrorKind {
    /// エンコーダーがサポートされていない
    EncoderNotSupported(String),
    /// デコーダーがサポートされていない
    DecoderNotSupported(String),
    /// 入力ファイルが見つからない
    InputNotFound,
    /// 入力ファイルが破損している
    InputCorrupted,
    /// 出力先に書き込めない
    OutputWriteError,
    /// ディスク容量不足
    DiskFull,
    /// メモリ不足
    OutOfMemory,
    /// 権限エラー
    PermissionDenied,
    /// オプションが無効
    InvalidOption(String),
    /// 不明なエラー
    Unknown(String),
}

/// FFmpegエラー解析結果
#[derive(Debug, Clone)]
pub struct FfmpegError {
    /// エラーの種類
    pub kind: FfmpegErrorKind,
    /// ユーザー向けメッセージ
    pub user_message: String,
    /// 解決策の提案
    pub suggestion: Option<String>,
    /// 元のエラーメッセージ
    pub raw_message: String,
}

impl FfmpegError {
    /// FFmpegのstderrからエラーを解析
    pub fn parse(stderr: &str) -> Self {
        let stderr_lower = stderr.to_lowercase();

        // エンコーダーがサポートされていない
        if stderr_lower.contains("unknown encoder")
            || stderr_lower.contains("encoder") && stderr_lower.contains("not found")
            || stderr_lower.contains("no such encoder")
        {
            let encoder = Self::extract_quoted_after(stderr, "encoder");
            return Self::encoder_not_supported(&encoder, stderr);
        }

        // デコーダーがサポートされていない
        if stderr_lower.contains("decoder") && stderr_lower.contains("not found")
            || stderr_lower.contains("unknown decoder")
        {
            let decoder = Self::extract_quoted_after(stderr, "decoder");
            return Self::decoder_not_supported(&decoder, stderr);
        }

        // 入力ファイル関連
        if stderr_lower.contains("no such file")
            || stderr_lower.contains("does not exist")
            || stderr_lower.contains("file not found")
        {
            return Self::input_not_found(stderr);
        }

        if stderr_lower.contains("invalid data found")
            || stderr_lower.contains("corrupt")
            || stderr_lower.contains("moov atom not found")
        {
            return Self::input_corrupted(stderr);
        }

        // 出力関連
        if stderr_lower.contains("permission denied") || stderr_lower.contains("access denied") {
            return Self::permission_denied(stderr);
        }

        if stderr_lower.contains("no space left")
            || stderr_lower.contains("disk full")
            || stderr_lower.contains("not enough space")
        {
            return Self::disk_full(stderr);
        }

        if stderr_lower.contains("cannot open")
            && (stderr_lower.contains("output") || stderr_lower.contains("writing"))
        {
            return Self::output_write_error(stderr);
        }

        // メモリ関連
        if stderr_lower.contains("out of memory")
            || stderr_lower.contains("memory allocation failed")
            || stderr_lower.contains("cannot allocate")
        {
            return Self::out_of_memory(stderr);
        }

        // オプション関連
        if stderr_lower.contains("option") && stderr_lower.contains("not found")
            || stderr_lower.contains("unrecognized option")
            || stderr_lower.contains("invalid option")
        {
            let option = Self::extract_quoted_after(stderr, "option");
            return Self::invalid_option(&option, stderr);
        }

        Self::unknown(stderr)
    }

    fn encoder_not_supported(encoder: &str, raw: &str) -> Self {
        Self {
            kind: FfmpegErrorKind::EncoderNotSupported(encoder.to_string()),
            user_message: format!(
                "encoder \"{}\" is not available in this FFmpeg build",
                Self::encoder_display_name(encoder)
            ),
            suggestion: Some(
                "HAP needs an FFmpeg built with Snappy. Empty the FFmpeg folder \
                 to download a fresh official build"
                    .to_string(),
            ),
            raw_message: raw.to_string(),
        }
    }

    fn decoder_not_supported(decoder: &str, raw: &str) -> Self {
        Self {
            kind: FfmpegErrorKind::DecoderNotSupported(decoder.to_string()),
            user_message: format!("input codec \"{}\" is not supported", decoder),
            suggestion: Some("Re-export the source file with a common codec such as H.264".to_string()),
            raw_message: raw.to_string(),
        }
    }

    fn input_not_found(raw: &str) -> Self {
        Self {
            kind: FfmpegErrorKind::InputNotFound,
            user_message: "input file not found".to_string(),
            suggestion: Some("Check that the file was not moved or deleted".to_string()),
            raw_message: raw.to_string(),
        }
    }

    fn input_corrupted(raw: &str) -> Self {
        Self {
            kind: FfmpegErrorKind::InputCorrupted,
            user_message: "input file is corrupted or has an invalid format".to_string(),
            suggestion: Some(
                "Check that the file plays correctly. It may be an interrupted download"
                    .to_string(),
            ),
            raw_message: raw.to_string(),
        }
    }

    fn permission_denied(raw: &str) -> Self {
        Self {
            kind: FfmpegErrorKind::PermissionDenied,
            user_message: "permission denied".to_string(),
            suggestion: Some("Check write permissions of the output folder".to_string()),
            raw_message: raw.to_string(),
        }
    }

    fn disk_full(raw: &str) -> Self {
        Self {
            kind: FfmpegErrorKind::DiskFull,
            user_message: "not enough disk space".to_string(),
            suggestion: Some(
                "HAP files are large. Free up space on the output drive".to_string(),
            ),
            raw_message: raw.to_string(),
        }
    }

    fn output_write_error(raw: &str) -> Self {
        Self {
            kind: FfmpegErrorKind::OutputWriteError,
            user_message: "cannot create the output file".to_string(),
            suggestion: Some("Check that the output folder exists and is writable".to_string()),
            raw_message: raw.to_string(),
        }
    }

    fn out_of_memory(raw: &str) -> Self {
        Self {
            kind: FfmpegErrorKind::OutOfMemory,
            user_message: "out of memory".to_string(),
            suggestion: Some("Close other applications and try again".to_string()),
            raw_message: raw.to_string(),
        }
    }

    fn invalid_option(option: &str, raw: &str) -> Self {
        Self {
            kind: FfmpegErrorKind::InvalidOption(option.to_string()),
            user_message: format!("option \"{}\" was rejected by FFmpeg", option),
            suggestion: None,
            raw_message: raw.to_string(),
        }
    }

    fn unknown(raw: &str) -> Self {
        // 最後の有意なエラー行を抽出
        let error_line = raw
            .lines()
            .filter(|line| {
                let lower = line.to_lowercase();
                lower.contains("error")
                    || lower.contains("failed")
                    || lower.contains("cannot")
                    || lower.contains("unable")
            })
            .last()
            .unwrap_or("an error occurred during conversion");

        Self {
            kind: FfmpegErrorKind::Unknown(error_line.to_string()),
            user_message: Self::truncate_message(error_line.trim(), 100),
            suggestion: None,
            raw_message: raw.to_string(),
        }
    }

    /// キーワードを含む行からシングルクォートで囲まれた名前を抽出
    fn extract_quoted_after(stderr: &str, keyword: &str) -> String {
        for line in stderr.lines() {
            if !line.to_lowercase().contains(keyword) {
                continue;
            }
            if let Some(start) = line.find('\'') {
                if let Some(end) = line[start + 1..].find('\'') {
                    return line[start + 1..start + 1 + end].to_string();
                }
            }
            // "Encoder xxx not found" 形式
            let words: Vec<&str> = line.split_whitespace().collect();
            for (i, word) in words.iter().enumerate() {
                if word.to_lowercase() == keyword && i + 1 < words.len() {
                    let name = words[i + 1].trim_matches(|c| c == '\'' || c == '"');
                    if !name.is_empty() && name != "not" {
                        return name.to_string();
                    }
                }
            }
        }
        "unknown".to_string()
    }

    fn encoder_display_name(encoder: &str) -> &str {
        match encoder {
            "hap" => "HAP",
            "hap_q" => "HAP Q",
            other => other,
        }
    }

    /// メッセージを切り詰める
    fn truncate_message(msg: &str, max_chars: usize) -> String {
        if msg.chars().count() <= max_chars {
            msg.to_string()
        } else {
            let truncated: String = msg.chars().take(max_chars).collect();
            format!("{}...", truncated)
        }
    }

    /// ユーザー向けの完全なエラーメッセージを生成
    pub fn format_user_message(&self) -> String {
        let mut msg = self.user_message.clone();
        if let Some(ref suggestion) = self.suggestion {
            msg.push_str("\nHint: ");
            msg.push_str(suggestion);
        }
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encoder_not_found() {
        let error = FfmpegError::parse("Unknown encoder 'hap_q'");
        assert_eq!(
            error.kind,
            FfmpegErrorKind::EncoderNotSupported("hap_q".to_string())
        );
        assert!(error.user_message.contains("HAP Q"));
    }

    #[test]
    fn test_parse_input_not_found() {
        let error = FfmpegError::parse("clip.mp4: No such file or directory");
        assert!(matches!(error.kind, FfmpegErrorKind::InputNotFound));
    }

    #[test]
    fn test_parse_corrupted_input() {
        let error = FfmpegError::parse("[mov,mp4] moov atom not found\nclip.mp4: Invalid data found when processing input");
        assert!(matches!(error.kind, FfmpegErrorKind::InputCorrupted));
    }

    #[test]
    fn test_parse_permission_denied() {
        let error = FfmpegError::parse("HAP/clip_converted.mov: Permission denied");
        assert!(matches!(error.kind, FfmpegErrorKind::PermissionDenied));
    }

    #[test]
    fn test_parse_unknown_uses_last_error_line() {
        let stderr = "frame=  10\nError while filtering\nConversion failed!";
        let error = FfmpegError::parse(stderr);
        assert_eq!(
            error.kind,
            FfmpegErrorKind::Unknown("Conversion failed!".to_string())
        );
    }

    #[test]
    fn test_format_user_message_appends_hint() {
        let error = FfmpegError::parse("No space left on device");
        let msg = error.format_user_message();
        assert!(msg.starts_with("not enough disk space"));
        assert!(msg.contains("\nHint: "));
    }
}
