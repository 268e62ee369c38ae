//! 経過時間の表示

use std::time::Duration;

/// 経過時間を `HH:MM:SS.CC` 形式にフォーマット
///
/// 時間は24で折り返さない。センチ秒はミリ秒を10で切り捨て。
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let centis = elapsed.subsec_millis() / 10;

    format!("{:02}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
}
