//! コーデック選択とユーザー設定

use std::fmt;
use std::str::FromStr;

use crate::error::ConvertError;

/// 出力コーデック
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum CodecVariant {
    /// HAP（標準）
    #[value(name = "hap")]
    Hap,
    /// HAP Q（高画質）
    #[value(name = "hap-q")]
    HapQ,
}

impl CodecVariant {
    /// FFmpegのエンコーダー名
    pub fn encoder_name(&self) -> &'static str {
        match self {
            CodecVariant::Hap => "hap",
            CodecVariant::HapQ => "hap_q",
        }
    }

    /// 出力サブフォルダ名
    pub fn output_subfolder(&self) -> &'static str {
        match self {
            CodecVariant::Hap => "HAP",
            CodecVariant::HapQ => "HAPQ",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CodecVariant::Hap => "HAP",
            CodecVariant::HapQ => "HAP-Q",
        }
    }

    /// プロンプトでの選択番号
    pub fn selection_number(&self) -> u32 {
        match self {
            CodecVariant::Hap => 1,
            CodecVariant::HapQ => 2,
        }
    }

    pub fn all() -> &'static [CodecVariant] {
        &[CodecVariant::Hap, CodecVariant::HapQ]
    }
}

impl fmt::Display for CodecVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// プロンプト入力（"1" / "2"、前後の空白は無視）を解釈
impl FromStr for CodecVariant {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let selection: u32 = s
            .trim()
            .parse()
            .map_err(|_| ConvertError::InvalidSelection(s.to_string()))?;

        Self::all()
            .iter()
            .copied()
            .find(|variant| variant.selection_number() == selection)
            .ok_or_else(|| ConvertError::InvalidSelection(s.to_string()))
    }
}

/// ユーザーの選択（処理開始前に一度だけ確定）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserChoices {
    /// コーデック
    pub codec_variant: CodecVariant,
    /// 音声を含めるか
    pub include_audio: bool,
}

impl UserChoices {
    pub fn new(codec_variant: CodecVariant, include_audio: bool) -> Self {
        Self {
            codec_variant,
            include_audio,
        }
    }

    /// 入出力パスを除いたコーデック部分の引数
    pub fn codec_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            self.codec_variant.encoder_name().to_string(),
        ];
        if !self.include_audio {
            args.push("-an".to_string());
        }
        args
    }

    pub fn output_subfolder(&self) -> &'static str {
        self.codec_variant.output_subfolder()
    }
}
