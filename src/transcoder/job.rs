//! 変換ジョブ

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::{UserChoices, VideoFile};

/// 変換ジョブ（入力ファイル1つに対して1つ）
#[derive(Clone, Debug)]
pub struct ConversionJob {
    /// 入力ファイル
    pub input: VideoFile,
    /// 出力ファイルパス
    pub output_path: PathBuf,
    /// FFmpegコマンド引数（パスはOS上の表現のまま保持）
    pub parameters: Vec<OsString>,
}

impl ConversionJob {
    /// 新しいジョブを作成
    pub fn new(input: VideoFile, output_dir: &Path, suffix: &str, choices: &UserChoices) -> Self {
        let output_path = Self::generate_output_path(&input, output_dir, suffix);
        let parameters = build_parameters(choices, &input.path, &output_path);

        Self {
            input,
            output_path,
            parameters,
        }
    }

    /// 出力パスを生成
    ///
    /// 拡張子だけが異なる入力（clip.mp4 と clip.mov）は同じ出力パスになり、
    /// 後に処理した方が上書きする。
    pub fn generate_output_path(input: &VideoFile, output_dir: &Path, suffix: &str) -> PathBuf {
        let mut file_name = input.stem().to_os_string();
        file_name.push(suffix);
        output_dir.join(file_name)
    }
}

/// FFmpegコマンド引数を生成
///
/// 順序: 上書き許可, 入力, コーデック, (音声無効), 出力
pub fn build_parameters(choices: &UserChoices, input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();

    // 上書き確認なし
    args.push("-y".into());

    // 入力ファイル
    args.push("-i".into());
    args.push(input.as_os_str().to_os_string());

    // コーデックと音声
    args.extend(choices.codec_args().into_iter().map(OsString::from));

    // 出力ファイル
    args.push(output.as_os_str().to_os_string());

    args
}
