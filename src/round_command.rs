use anyhow::{ensure, Result};
use log::info;

use crate::rounding::{round_minutes, MAXIMUM_MINUTES};

/// 経過時間を請求用の分数に丸めて表示するサブコマンド。
#[derive(Debug, clap::Args)]
pub struct RoundArgs {
    #[clap(help = "Elapsed minutes to round")]
    minutes: i64,
}

/// `round`サブコマンドの処理を行う。
///
/// # Arguments
///
/// * `round` - `round`サブコマンドの引数
pub fn round_command(round: RoundArgs) -> Result<()> {
    let line = describe(round.minutes)?;
    info!("Rounded {} minutes.", round.minutes);
    println!("{}", line);

    Ok(())
}

/// 丸めた結果を`元の分数 -> 丸めた分数 (HH:MM)`の形式で返す。
fn describe(minutes: i64) -> Result<String> {
    ensure!(minutes >= 0, "Minutes must not be negative: {}", minutes);
    ensure!(
        minutes <= MAXIMUM_MINUTES,
        "Minutes must not exceed {}: {}",
        MAXIMUM_MINUTES,
        minutes
    );

    let rounded = round_minutes(minutes);
    Ok(format!(
        "{} -> {} ({:02}:{:02})",
        minutes,
        rounded,
        rounded / 60,
        rounded % 60
    ))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::describe;

    #[rstest]
    #[case::sub_minimum(7, "7 -> 15 (00:15)")]
    #[case::half_rounds_up(22, "22 -> 30 (00:30)")]
    #[case::hours(96, "96 -> 90 (01:30)")]
    #[case::full_day(1440, "1440 -> 1440 (24:00)")]
    fn test_describe(#[case] minutes: i64, #[case] expected: &str) {
        assert_eq!(describe(minutes).unwrap(), expected);
    }

    #[rstest]
    #[case::negative(-1)]
    #[case::over_a_day(1441)]
    #[case::max(i64::MAX)]
    fn test_describe_out_of_range(#[case] minutes: i64) {
        assert!(describe(minutes).is_err());
    }
}
