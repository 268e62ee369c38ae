//! コンソールUIモジュール

mod banner;
mod progress_view;
mod prompt;

pub use banner::banner;
pub use progress_view::download_progress_printer;
pub use prompt::Console;
