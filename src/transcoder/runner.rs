//! 変換の逐次実行

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use super::{format_elapsed, ConversionJob, FfmpegError};
use crate::error::{ConvertError, InvocationFailure};

/// 外部ツールの同期実行
///
/// 失敗の扱いを差し替えられるよう、実行はこのトレイトの背後に置く。
pub trait ToolInvoker {
    /// プロセスを完了まで実行し、終了状態を返す
    fn invoke(&self, program: &Path, args: &[OsString]) -> Result<(), InvocationFailure>;
}

impl<T: ToolInvoker + ?Sized> ToolInvoker for &T {
    fn invoke(&self, program: &Path, args: &[OsString]) -> Result<(), InvocationFailure> {
        (**self).invoke(program, args)
    }
}

/// `std::process::Command` によるFFmpeg実行
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegCommand;

impl ToolInvoker for FfmpegCommand {
    fn invoke(&self, program: &Path, args: &[OsString]) -> Result<(), InvocationFailure> {
        debug!("Running {:?} {:?}", program, args);

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| InvocationFailure::Launch {
                program: program.to_path_buf(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let diagnosis = FfmpegError::parse(&stderr);
            warn!("FFmpeg failed: {:?}", diagnosis.kind);
            debug!("FFmpeg stderr:\n{}", diagnosis.raw_message);
            Err(InvocationFailure::ExitStatus {
                code: output.status.code(),
                diagnosis,
            })
        }
    }
}

/// ジョブ1件の結果
///
/// 失敗した時点で実行全体が中断されるため、返される結果の `success` は常に真
#[derive(Clone, Debug)]
pub struct ConversionResult {
    pub job: ConversionJob,
    pub elapsed: Duration,
    pub success: bool,
}

/// ジョブを発見順に1件ずつ実行する
pub struct ConversionRunner<I> {
    invoker: I,
    executable: PathBuf,
}

impl<I: ToolInvoker> ConversionRunner<I> {
    pub fn new(invoker: I, executable: PathBuf) -> Self {
        Self {
            invoker,
            executable,
        }
    }

    /// 全ジョブを実行
    ///
    /// 最初の失敗で中断し、残りのジョブは実行しない。
    /// `on_start` はジョブ開始直前に番号付きで呼ばれる
    pub fn run<W, F>(
        &self,
        jobs: Vec<ConversionJob>,
        out: &mut W,
        mut on_start: F,
    ) -> Result<Vec<ConversionResult>, ConvertError>
    where
        W: Write,
        F: FnMut(usize, &ConversionJob),
    {
        let total = jobs.len();
        let mut results = Vec::with_capacity(total);

        for (index, job) in jobs.into_iter().enumerate() {
            info!("Job {}/{}: {:?}", index + 1, total, job.input.path);
            on_start(index, &job);
            results.push(self.run_job(job, out)?);
        }

        Ok(results)
    }

    fn run_job<W: Write>(
        &self,
        job: ConversionJob,
        out: &mut W,
    ) -> Result<ConversionResult, ConvertError> {
        report(out, format_args!("Processing: {}", job.input.name))?;

        let started = Instant::now();
        let outcome = self.invoker.invoke(&self.executable, &job.parameters);
        let elapsed = started.elapsed();

        if let Err(reason) = outcome {
            return Err(ConvertError::Invocation {
                input: job.input.path,
                reason,
            });
        }

        report(
            out,
            format_args!(
                "Finished processing {} -> {}",
                job.input.name,
                job.output_path.display()
            ),
        )?;
        report(out, format_args!("Conversion time: {}", format_elapsed(elapsed)))?;

        Ok(ConversionResult {
            job,
            elapsed,
            success: true,
        })
    }
}

fn report<W: Write>(out: &mut W, line: std::fmt::Arguments<'_>) -> Result<(), ConvertError> {
    writeln!(out, "{}", line).map_err(|e| ConvertError::io("failed to write", "<stdout>", e))
}
