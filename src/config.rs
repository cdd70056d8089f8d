use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, LevelFilter};
use serde::Deserialize;

use crate::rounding::RoundingPolicy;

/// 設定ファイルのパスを上書きする環境変数。
const CONFIG_ENV: &str = "TIMEROUND_CONFIG";

/// 設定ファイルの内容を表す構造体。
///
/// すべての項目は省略でき、省略した場合は既定値を利用する。
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub policy: RoundingPolicy,
    pub log_level: LogLevel,
    pub retry: RetryConfig,
}

/// ログの出力レベル。
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// レコードの書き込みを再試行する設定。
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl Config {
    /// 設定ファイルを読み込む。
    ///
    /// `path`が指定されていない場合は、環境変数`TIMEROUND_CONFIG`、
    /// ユーザーの設定ディレクトリの`timeround/config.toml`の順に探す。
    /// 既定の場所にファイルがない場合は既定値を返す。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => match default_path() {
                Some(path) => match Self::read(&path) {
                    Err(e) if is_not_found(&e) => {
                        debug!("No config file at {}, using defaults", path.display());
                        Ok(Self::default())
                    }
                    result => result,
                },
                None => Ok(Self::default()),
            },
        }
    }

    /// 指定したファイルから設定を読み込む。
    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!("Loaded config from {}", path.display());

        Ok(config)
    }
}

/// 既定の設定ファイルのパスを返す。
fn default_path() -> Option<PathBuf> {
    env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|dir| dir.join("timeround").join("config.toml")))
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|e| e.kind() == ErrorKind::NotFound)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use log::LevelFilter;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    use super::{Config, LogLevel, RetryConfig};
    use crate::rounding::RoundingPolicy;

    /// テスト用に設定ファイルを作成する。
    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full() {
        let file = config_file(
            r#"
policy = "round-on-create-only"
log_level = "debug"

[retry]
max_attempts = 5
base_delay_ms = 10
max_delay_ms = 50
"#,
        );

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(
            config,
            Config {
                policy: RoundingPolicy::RoundOnCreateOnly,
                log_level: LogLevel::Debug,
                retry: RetryConfig {
                    max_attempts: 5,
                    base_delay_ms: 10,
                    max_delay_ms: 50,
                },
            }
        );
    }

    /// 省略した項目は既定値になる。
    #[rstest]
    #[case::empty("")]
    #[case::partial_retry("[retry]\nmax_attempts = 3\n")]
    fn test_load_defaults(#[case] content: &str) {
        let file = config_file(content);

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[rstest]
    #[case::unknown_key("rounding = true\n")]
    #[case::unknown_policy("policy = \"never\"\n")]
    #[case::invalid_toml("policy = \n")]
    fn test_load_invalid(#[case] content: &str) {
        let file = config_file(content);

        assert!(Config::load(Some(file.path())).is_err());
    }

    /// 明示的に指定したファイルが存在しない場合はエラーとする。
    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();

        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[rstest]
    #[case::error(LogLevel::Error, LevelFilter::Error)]
    #[case::info(LogLevel::Info, LevelFilter::Info)]
    #[case::trace(LogLevel::Trace, LevelFilter::Trace)]
    fn test_log_level_filter(#[case] level: LogLevel, #[case] expected: LevelFilter) {
        assert_eq!(LevelFilter::from(level), expected);
    }
}
