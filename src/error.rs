//! ワークフロー全体のエラー型

use std::path::PathBuf;

use thiserror::Error;

use crate::transcoder::FfmpegError;

/// 変換ワークフローのエラー
#[derive(Debug, Error)]
pub enum ConvertError {
    /// FFmpegのダウンロードに失敗
    #[error("failed to download FFmpeg: {0:#}")]
    ToolchainDownload(anyhow::Error),

    /// コーデック選択が不正（プロンプト内で再入力により回復）
    #[error("invalid codec selection: {0:?}")]
    InvalidSelection(String),

    /// FFmpegの実行に失敗（実行全体を中断）
    #[error("conversion of {} failed: {reason}", input.display())]
    Invocation {
        input: PathBuf,
        reason: InvocationFailure,
    },

    /// プロンプト中に標準入力が閉じられた
    #[error("standard input closed while waiting for an answer")]
    InputClosed,

    /// ファイルシステムエラー
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// 外部ツール実行失敗の詳細
#[derive(Debug, Error)]
pub enum InvocationFailure {
    /// プロセスを起動できなかった
    #[error("could not launch {}: {source}", program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 非ゼロ終了
    #[error("ffmpeg exited with {}: {}", exit_code_label(*code), diagnosis.format_user_message())]
    ExitStatus {
        code: Option<i32>,
        diagnosis: FfmpegError,
    },
}

fn exit_code_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}
