//! 変換ワークフロー

use log::{debug, info};
use std::cell::Cell;
use std::fs;
use std::io::{BufRead, Write};

use crate::config::RunConfig;
use crate::error::ConvertError;
use crate::ffmpeg::{ToolchainProvisioner, ToolchainSource};
use crate::transcoder::{
    discover, ConversionJob, ConversionResult, ConversionRunner, ToolInvoker, UserChoices,
};
use crate::ui::Console;

/// 実行状態
///
/// 一度離れた状態には戻らない。`Failed` は準備中か変換中からのみ到達する。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Provisioning,
    AwaitingUserInput,
    Discovering,
    Processing(usize),
    Done,
    Failed,
}

/// 実行結果
#[derive(Debug)]
pub enum RunOutcome {
    /// 対象ファイルが無かった
    NoInputFiles,
    /// 全ファイルの変換が完了
    Completed(Vec<ConversionResult>),
}

/// 準備・入力・検出・変換を順に実行する
pub struct Workflow<S, I> {
    config: RunConfig,
    provisioner: ToolchainProvisioner<S>,
    invoker: I,
    state: Cell<RunState>,
}

impl<S: ToolchainSource, I: ToolInvoker> Workflow<S, I> {
    pub fn new(config: RunConfig, source: S, invoker: I) -> Self {
        let provisioner = ToolchainProvisioner::new(config.ffmpeg_dir.clone(), source);
        Self {
            config,
            provisioner,
            invoker,
            state: Cell::new(RunState::Idle),
        }
    }

    /// 現在の状態
    pub fn state(&self) -> RunState {
        self.state.get()
    }

    fn transition(&self, next: RunState) {
        debug!("State: {:?} -> {:?}", self.state.get(), next);
        self.state.set(next);
    }

    /// ワークフローを最後まで実行
    pub fn run<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
    ) -> Result<RunOutcome, ConvertError> {
        let result = self.run_steps(console);
        if result.is_err()
            && matches!(
                self.state(),
                RunState::Provisioning | RunState::Processing(_)
            )
        {
            self.transition(RunState::Failed);
        }
        result
    }

    fn run_steps<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
    ) -> Result<RunOutcome, ConvertError> {
        self.transition(RunState::Provisioning);
        let toolchain = self.provisioner.ensure_toolchain(console.out())?;
        info!("Using FFmpeg from {:?}", toolchain.dir);

        self.transition(RunState::AwaitingUserInput);
        let choices = self.collect_choices(console)?;
        info!("Choices: {:?}", choices);

        self.transition(RunState::Discovering);
        let files = discover(&self.config.work_dir)?;
        if files.is_empty() {
            console.say("No video files found in the current directory.")?;
            self.transition(RunState::Done);
            return Ok(RunOutcome::NoInputFiles);
        }

        // 出力フォルダはループ前に一度だけ作成
        let output_dir = self.config.work_dir.join(choices.output_subfolder());
        fs::create_dir_all(&output_dir)
            .map_err(|e| ConvertError::io("failed to create", &output_dir, e))?;

        let jobs: Vec<ConversionJob> = files
            .into_iter()
            .map(|file| ConversionJob::new(file, &output_dir, &self.config.output_suffix, &choices))
            .collect();

        let runner = ConversionRunner::new(&self.invoker, toolchain.executable);
        let results = runner.run(jobs, console.out(), |index, _| {
            self.transition(RunState::Processing(index))
        })?;

        console.say("All conversions finished.")?;
        self.transition(RunState::Done);
        Ok(RunOutcome::Completed(results))
    }

    /// 引数で指定されていない項目だけ尋ねる
    fn collect_choices<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
    ) -> Result<UserChoices, ConvertError> {
        let codec_variant = match self.config.codec {
            Some(codec) => codec,
            None => console.ask_codec()?,
        };
        let include_audio = match self.config.include_audio {
            Some(include) => include,
            None => console.ask_include_audio()?,
        };
        Ok(UserChoices::new(codec_variant, include_audio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvocationFailure;
    use crate::ffmpeg::FFMPEG_NAME;
    use crate::transcoder::{CodecVariant, FfmpegError};
    use std::cell::RefCell;
    use std::ffi::OsString;
    use std::fs::File;
    use std::io::Cursor;
    use std::path::{Path, PathBuf};

    /// ダウンロード回数と順序を記録するフェイク
    #[derive(Default)]
    struct FakeSource {
        events: RefCell<Vec<String>>,
    }

    impl ToolchainSource for FakeSource {
        fn fetch_into(&self, dir: &Path) -> anyhow::Result<()> {
            self.events.borrow_mut().push("download".to_string());
            File::create(dir.join(FFMPEG_NAME))?;
            Ok(())
        }
    }

    /// 出力パスに入力名を書き込むフェイクFFmpeg
    struct FakeFfmpeg<'a> {
        events: &'a RefCell<Vec<String>>,
        fail_on: Option<&'a str>,
    }

    impl ToolInvoker for FakeFfmpeg<'_> {
        fn invoke(&self, _program: &Path, args: &[OsString]) -> Result<(), InvocationFailure> {
            let input = Path::new(&args[2]);
            self.events
                .borrow_mut()
                .push(format!("convert {}", input.to_string_lossy()));
            if !input.exists() || self.fail_on.is_some_and(|name| input.ends_with(name)) {
                return Err(InvocationFailure::ExitStatus {
                    code: Some(1),
                    diagnosis: FfmpegError::parse("Conversion failed!"),
                });
            }
            let output = args.last().unwrap();
            fs::write(output, input.as_os_str().as_encoded_bytes()).unwrap();
            Ok(())
        }
    }

    /// 常に失敗するダウンロード元
    struct OfflineSource;

    impl ToolchainSource for OfflineSource {
        fn fetch_into(&self, _dir: &Path) -> anyhow::Result<()> {
            anyhow::bail!("offline")
        }
    }

    struct Fixture {
        _root: tempfile::TempDir,
        work_dir: PathBuf,
        ffmpeg_dir: PathBuf,
    }

    impl Fixture {
        fn new(inputs: &[&str]) -> Self {
            let root = tempfile::tempdir().unwrap();
            let work_dir = root.path().join("work");
            let ffmpeg_dir = root.path().join("toolchain");
            fs::create_dir(&work_dir).unwrap();
            for name in inputs {
                File::create(work_dir.join(name)).unwrap();
            }
            Self {
                _root: root,
                work_dir,
                ffmpeg_dir,
            }
        }

        fn config(&self) -> RunConfig {
            RunConfig {
                work_dir: self.work_dir.clone(),
                ffmpeg_dir: self.ffmpeg_dir.clone(),
                output_suffix: "_converted.mov".to_string(),
                manifest_url: String::new(),
                codec: None,
                include_audio: None,
                pause_on_exit: false,
            }
        }
    }

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_no_input_files_has_no_side_effects() {
        let fixture = Fixture::new(&["readme.txt", "upper.MP4"]);
        let source = FakeSource::default();
        let ffmpeg = FakeFfmpeg {
            events: &source.events,
            fail_on: None,
        };
        let workflow = Workflow::new(fixture.config(), &source, ffmpeg);
        let mut console = console("1\nN\n");

        let outcome = workflow.run(&mut console).unwrap();

        assert!(matches!(outcome, RunOutcome::NoInputFiles));
        assert_eq!(workflow.state(), RunState::Done);
        assert!(!fixture.work_dir.join("HAP").exists());
        assert_eq!(*source.events.borrow(), vec!["download"]);
        let text = String::from_utf8(console.into_output()).unwrap();
        assert!(text.ends_with("No video files found in the current directory.\n"));
    }

    #[test]
    fn test_each_file_converted_once_after_download() {
        let fixture = Fixture::new(&["a.mp4", "b.mov", "c.avi", "d.mkv"]);
        let source = FakeSource::default();
        let ffmpeg = FakeFfmpeg {
            events: &source.events,
            fail_on: None,
        };
        let workflow = Workflow::new(fixture.config(), &source, ffmpeg);
        let mut console = console("2\ny\n");

        let outcome = workflow.run(&mut console).unwrap();

        let RunOutcome::Completed(results) = outcome else {
            panic!("expected conversions");
        };
        assert_eq!(results.len(), 3);
        assert_eq!(workflow.state(), RunState::Done);

        let events = source.events.borrow();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], "download");
        // 変換順は検出順と一致する
        let converted: Vec<&String> = events[1..].iter().collect();
        let expected: Vec<String> = results
            .iter()
            .map(|r| format!("convert {}", r.job.input.path.to_string_lossy()))
            .collect();
        assert_eq!(converted, expected.iter().collect::<Vec<_>>());

        for result in &results {
            assert!(result.job.output_path.starts_with(fixture.work_dir.join("HAPQ")));
            assert!(!result.job.parameters.iter().any(|p| p == "-an"));
            assert!(result.job.parameters.iter().any(|p| p == "hap_q"));
        }
        let text = String::from_utf8(console.into_output()).unwrap();
        assert!(text.ends_with("All conversions finished.\n"));
    }

    #[test]
    fn test_existing_toolchain_is_trusted() {
        let fixture = Fixture::new(&["a.mp4"]);
        fs::create_dir(&fixture.ffmpeg_dir).unwrap();
        File::create(fixture.ffmpeg_dir.join("stale.txt")).unwrap();
        let source = FakeSource::default();
        let ffmpeg = FakeFfmpeg {
            events: &source.events,
            fail_on: None,
        };
        let mut config = fixture.config();
        config.codec = Some(CodecVariant::Hap);
        config.include_audio = Some(false);
        let workflow = Workflow::new(config, &source, ffmpeg);
        // プロンプトは出ないので入力は不要
        let mut console = console("");

        let outcome = workflow.run(&mut console).unwrap();

        assert!(matches!(outcome, RunOutcome::Completed(ref r) if r.len() == 1));
        let events = source.events.borrow();
        assert_eq!(events.len(), 1);
        assert!(events[0].starts_with("convert "));
    }

    #[test]
    fn test_same_stem_inputs_overwrite_each_other() {
        let fixture = Fixture::new(&["clip.mp4", "clip.mov"]);
        let source = FakeSource::default();
        let ffmpeg = FakeFfmpeg {
            events: &source.events,
            fail_on: None,
        };
        let workflow = Workflow::new(fixture.config(), &source, ffmpeg);
        let mut console = console("1\nn\n");

        let RunOutcome::Completed(results) = workflow.run(&mut console).unwrap() else {
            panic!("expected conversions");
        };

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].job.output_path, results[1].job.output_path);
        let output = fixture.work_dir.join("HAP").join("clip_converted.mov");
        let survivor = fs::read_to_string(&output).unwrap();
        assert_eq!(survivor, results[1].job.input.path.to_string_lossy());
        assert_eq!(fs::read_dir(fixture.work_dir.join("HAP")).unwrap().count(), 1);
    }

    #[test]
    fn test_failure_aborts_remaining_files() {
        let fixture = Fixture::new(&["a.mp4", "b.mp4", "c.mp4"]);
        let source = FakeSource::default();
        let mut config = fixture.config();
        config.codec = Some(CodecVariant::Hap);
        config.include_audio = Some(true);

        // 2番目に処理されるファイルで失敗させる
        let order: Vec<String> = crate::transcoder::discover(&fixture.work_dir)
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        let ffmpeg = FakeFfmpeg {
            events: &source.events,
            fail_on: Some(order[1].as_str()),
        };
        let workflow = Workflow::new(config, &source, ffmpeg);
        let mut console = console("");

        let err = workflow.run(&mut console).unwrap_err();

        assert!(matches!(err, ConvertError::Invocation { .. }));
        assert_eq!(workflow.state(), RunState::Failed);
        // download + 2 conversions
        assert_eq!(source.events.borrow().len(), 3);
        let text = String::from_utf8(console.into_output()).unwrap();
        assert!(!text.contains("All conversions finished."));
    }

    #[test]
    fn test_prompt_eof_does_not_mark_failed() {
        let fixture = Fixture::new(&["a.mp4"]);
        let source = FakeSource::default();
        let ffmpeg = FakeFfmpeg {
            events: &source.events,
            fail_on: None,
        };
        let workflow = Workflow::new(fixture.config(), &source, ffmpeg);
        let mut console = console("");

        let err = workflow.run(&mut console).unwrap_err();

        assert!(matches!(err, ConvertError::InputClosed));
        assert_eq!(workflow.state(), RunState::AwaitingUserInput);
        assert!(!fixture.work_dir.join("HAP").exists());
    }

    #[test]
    fn test_download_failure_fails_before_prompts() {
        let fixture = Fixture::new(&["a.mp4"]);
        let events = RefCell::new(Vec::new());
        let ffmpeg = FakeFfmpeg {
            events: &events,
            fail_on: None,
        };
        let workflow = Workflow::new(fixture.config(), OfflineSource, ffmpeg);
        let mut console = console("1\ny\n");

        let err = workflow.run(&mut console).unwrap_err();

        assert!(matches!(err, ConvertError::ToolchainDownload(_)));
        assert_eq!(workflow.state(), RunState::Failed);
        assert!(events.borrow().is_empty());
        assert!(!fixture.work_dir.join("HAP").exists());
        let text = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(text, "Downloading the latest version of FFmpeg...\n");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_file_name_is_converted() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let fixture = Fixture::new(&[]);
        let input = fixture.work_dir.join(OsStr::from_bytes(b"caf\xe9.mp4"));
        File::create(&input).unwrap();
        let source = FakeSource::default();
        let ffmpeg = FakeFfmpeg {
            events: &source.events,
            fail_on: None,
        };
        let workflow = Workflow::new(fixture.config(), &source, ffmpeg);
        let mut console = console("1\nn\n");

        let RunOutcome::Completed(results) = workflow.run(&mut console).unwrap() else {
            panic!("expected conversions");
        };

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].job.input.path, input);
        let output = fixture
            .work_dir
            .join("HAP")
            .join(OsStr::from_bytes(b"caf\xe9_converted.mov"));
        assert_eq!(results[0].job.output_path, output);
        assert_eq!(fs::read(&output).unwrap(), input.as_os_str().as_bytes());
    }
}
