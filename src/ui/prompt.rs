//! 対話プロンプト

use std::io::{BufRead, Write};

use log::debug;

use crate::error::ConvertError;
use crate::transcoder::CodecVariant;

/// 標準入出力（テストでは任意のバッファ）をまとめたコンソール
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// 1行出力
    pub fn say(&mut self, line: &str) -> Result<(), ConvertError> {
        writeln!(self.output, "{}", line)
            .and_then(|_| self.output.flush())
            .map_err(|e| ConvertError::io("failed to write", "<stdout>", e))
    }

    /// 1行読み込み（改行は除去）。EOFはエラー
    fn read_line(&mut self) -> Result<String, ConvertError> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| ConvertError::io("failed to read", "<stdin>", e))?;
        if read == 0 {
            return Err(ConvertError::InputClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// コーデックを選択させる（1か2が入力されるまで繰り返す）
    pub fn ask_codec(&mut self) -> Result<CodecVariant, ConvertError> {
        loop {
            self.say("Choose the codec for conversion:\n")?;
            for variant in CodecVariant::all() {
                self.say(&format!("{} - {}", variant.selection_number(), variant))?;
            }

            match self.read_line()?.parse::<CodecVariant>() {
                Ok(variant) => return Ok(variant),
                Err(e) => debug!("Re-prompting: {}", e),
            }
        }
    }

    /// 音声を含めるか確認する（"Y" のみ肯定、大文字小文字は区別しない）
    pub fn ask_include_audio(&mut self) -> Result<bool, ConvertError> {
        self.say("Do you want to include audio? (Y/N):")?;
        Ok(self.read_line()?.eq_ignore_ascii_case("y"))
    }

    /// Enterが押されるまで待つ
    pub fn pause(&mut self) -> Result<(), ConvertError> {
        self.say("Press Enter to exit...")?;
        match self.read_line() {
            Ok(_) | Err(ConvertError::InputClosed) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
