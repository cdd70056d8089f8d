use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::Deserialize;

/// 請求単位となる分数。
pub const INCREMENT_MINUTES: i64 = 15;

/// 請求できる最短の分数。
pub const MINIMUM_MINUTES: i64 = 15;

/// 1つのエントリーで扱える最長の分数。日付をまたぐ補正は1日分のみ。
pub const MAXIMUM_MINUTES: i64 = 24 * 60;

/// 切り上げとなる端数の分数。
///
/// 経過時間は分未満を切り捨てているため、7.5分ちょうどの端数は7分として届く。
const HALF_INCREMENT_MINUTES: i64 = INCREMENT_MINUTES / 2;

/// 新規作成時と編集時で丸めを適用するかどうかの方針。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingPolicy {
    /// 新規作成時も編集時も15分単位に丸める。
    #[default]
    AlwaysRound,
    /// 新規作成時のみ丸める。編集時は入力された時刻を保ち、最短時間だけを保証する。
    RoundOnCreateOnly,
}

impl FromStr for RoundingPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always-round" => Ok(Self::AlwaysRound),
            "round-on-create-only" => Ok(Self::RoundOnCreateOnly),
            _ => bail!("Unknown rounding policy: {}", s),
        }
    }
}

impl fmt::Display for RoundingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlwaysRound => write!(f, "always-round"),
            Self::RoundOnCreateOnly => write!(f, "round-on-create-only"),
        }
    }
}

/// 経過時間(分)を請求用の分数に丸める。
///
/// - 15分未満は15分にする。
/// - それ以外は15分単位にし、切り捨て後の端数が7分以上なら切り上げる。
///   7.5分ちょうどの半端は切り捨てにより7分として届くため、切り上げに含まれる。
pub fn round_minutes(minutes: i64) -> i64 {
    if minutes < MINIMUM_MINUTES {
        return MINIMUM_MINUTES;
    }

    let remainder = minutes % INCREMENT_MINUTES;
    if remainder >= HALF_INCREMENT_MINUTES {
        minutes - remainder + INCREMENT_MINUTES
    } else {
        minutes - remainder
    }
}

/// 経過時間(分)に最短時間だけを適用する。
pub fn floor_minutes(minutes: i64) -> i64 {
    minutes.max(MINIMUM_MINUTES)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{floor_minutes, round_minutes, RoundingPolicy};

    #[rstest]
    #[case::zero(0, 15)]
    #[case::one(1, 15)]
    #[case::seven(7, 15)]
    #[case::fourteen(14, 15)]
    #[case::exact_fifteen(15, 15)]
    #[case::round_down(21, 15)]
    #[case::half_rounds_up(22, 30)]
    #[case::round_up(23, 30)]
    #[case::exact_thirty(30, 30)]
    #[case::round_down_after_hour(66, 60)]
    #[case::half_after_hour(67, 75)]
    #[case::exact_ninety(90, 90)]
    fn test_round_minutes(#[case] minutes: i64, #[case] expected: i64) {
        assert_eq!(round_minutes(minutes), expected);
    }

    /// 15分未満はすべて15分になる。
    #[test]
    fn test_round_minutes_below_minimum() {
        for minutes in 0..15 {
            assert_eq!(round_minutes(minutes), 15, "minutes: {}", minutes);
        }
    }

    /// 15分単位の値は丸めても変わらない。
    #[test]
    fn test_round_minutes_idempotent_on_increments() {
        for minutes in (15..=24 * 60).step_by(15) {
            assert_eq!(round_minutes(minutes), minutes);
            assert_eq!(round_minutes(round_minutes(minutes)), minutes);
        }
    }

    /// 切り捨て後の端数が7分以上なら切り上げ、6分以下なら切り捨てる。
    ///
    ///  - 端数7分は最も近い単位より上に丸まる(37分は30分ではなく45分)。
    #[rstest]
    #[case::thirty_seven(37, 45)]
    #[case::fifty_two(52, 60)]
    #[case::thirty_six(36, 30)]
    #[case::fifty_one(51, 45)]
    fn test_round_minutes_rounds_up_from_seven(#[case] minutes: i64, #[case] expected: i64) {
        assert_eq!(round_minutes(minutes), expected);
    }

    /// 丸めた結果は常に15分単位で、端数に応じて切り上げか切り捨てになる。
    #[test]
    fn test_round_minutes_direction_by_remainder() {
        for minutes in 15..=24 * 60 {
            let rounded = round_minutes(minutes);
            let remainder = minutes % 15;
            assert_eq!(rounded % 15, 0, "minutes: {}", minutes);
            if remainder >= 7 {
                assert_eq!(rounded, minutes - remainder + 15, "minutes: {}", minutes);
            } else {
                assert_eq!(rounded, minutes - remainder, "minutes: {}", minutes);
            }
        }
    }

    #[rstest]
    #[case::below(7, 15)]
    #[case::exact(15, 15)]
    #[case::above(22, 22)]
    fn test_floor_minutes(#[case] minutes: i64, #[case] expected: i64) {
        assert_eq!(floor_minutes(minutes), expected);
    }

    #[rstest]
    #[case::always("always-round", RoundingPolicy::AlwaysRound)]
    #[case::create_only("round-on-create-only", RoundingPolicy::RoundOnCreateOnly)]
    fn test_rounding_policy_from_str(#[case] input: &str, #[case] expected: RoundingPolicy) {
        assert_eq!(input.parse::<RoundingPolicy>().unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[test]
    fn test_rounding_policy_default() {
        assert_eq!(RoundingPolicy::default(), RoundingPolicy::AlwaysRound);
        assert!("never".parse::<RoundingPolicy>().is_err());
    }
}
