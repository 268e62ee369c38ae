//! トランスコーダーモジュール

mod discover;
mod error;
mod job;
mod preset;
mod progress;
mod runner;

pub use discover::{discover, VideoFile};
pub use error::FfmpegError;
pub use job::ConversionJob;
pub use preset::{CodecVariant, UserChoices};
pub use progress::format_elapsed;
pub use runner::{ConversionResult, ConversionRunner, FfmpegCommand, ToolInvoker};
