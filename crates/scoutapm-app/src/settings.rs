//! 설정 로드.
//!
//! 우선순위 (뒤가 이김):
//! 1. 기본값 (`AppConfig`의 serde 기본값)
//! 2. JSON 설정 파일 (`--config` 경로, 없으면 플랫폼 설정 디렉토리의 `config.json`)
//! 3. 환경변수 (`SCOUTAPM_SCOUT__API_KEY` 형식 + `SCOUT_API_KEY`/`SCOUT_BASE_URL`)
//! 4. CLI 인자 (`--api-key`, `--base-url`)

use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use scoutapm_core::config::AppConfig;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// 환경변수 접두사
pub const ENV_PREFIX: &str = "SCOUTAPM";

/// 접두사 없이 받는 환경변수 → 설정 키
const BARE_ENV_VARS: &[(&str, &str)] = &[
    ("SCOUT_API_KEY", "SCOUTAPM_SCOUT__API_KEY"),
    ("SCOUT_BASE_URL", "SCOUTAPM_SCOUT__BASE_URL"),
];

/// CLI에서 받은 설정 오버라이드
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// 명시한 설정 파일 (없으면 에러)
    pub config_path: Option<PathBuf>,
}

/// 플랫폼별 기본 설정 파일 경로
///
/// - macOS: `~/Library/Application Support/com.scoutapm.scout-mcp/config.json`
/// - Linux: `~/.config/scout-mcp/config.json`
/// - Windows: `%APPDATA%\scoutapm\scout-mcp\config\config.json`
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "scoutapm", "scout-mcp")
        .map(|dirs| dirs.config_dir().join("config.json"))
}

/// 프로세스 환경변수로 설정 로드
pub fn load(overrides: &CliOverrides) -> Result<AppConfig, ConfigError> {
    load_with_env(overrides, std::env::vars().collect())
}

/// 주어진 환경변수 맵으로 설정 로드
pub fn load_with_env(
    overrides: &CliOverrides,
    env: HashMap<String, String>,
) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    let file = match &overrides.config_path {
        Some(path) => Some((path.clone(), true)),
        None => default_config_path().map(|path| (path, false)),
    };
    if let Some((path, required)) = file {
        debug!(path = %path.display(), required, "설정 파일 소스 추가");
        builder = builder.add_source(
            File::from(path)
                .format(FileFormat::Json)
                .required(required),
        );
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(Some(with_bare_vars(env))),
    );

    builder = builder
        .set_override_option("scout.api_key", overrides.api_key.clone())?
        .set_override_option("scout.base_url", overrides.base_url.clone())?;

    let config: AppConfig = builder.build()?.try_deserialize()?;
    debug!(scout = ?config.scout, tools = ?config.tools, "설정 로드 완료");
    Ok(config)
}

/// 접두사 없는 변수를 접두사 키로 옮긴다. 접두사 변수가 이미 있으면 그쪽이 이김.
fn with_bare_vars(mut env: HashMap<String, String>) -> HashMap<String, String> {
    for (bare, prefixed) in BARE_ENV_VARS {
        if let Some(value) = env.get(*bare).cloned() {
            env.entry((*prefixed).to_string()).or_insert(value);
        }
    }
    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// 기본 경로의 실제 파일이 섞이지 않도록 빈 설정 파일을 명시
    fn isolated(dir: &tempfile::TempDir) -> CliOverrides {
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();
        CliOverrides {
            config_path: Some(path),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_without_any_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_with_env(&isolated(&dir), HashMap::new()).unwrap();

        assert!(config.scout.api_key.is_empty());
        assert_eq!(config.scout.base_url, "https://scoutapm.com/api");
        assert_eq!(config.scout.request_timeout_ms, 30_000);
        assert_eq!(config.tools.active_window_days, 30);
    }

    #[test]
    fn file_values_apply() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"scout": {{"api_key": "from-file", "request_timeout_ms": 5000}}, "tools": {{"active_window_days": 7}}}}"#
        )
        .unwrap();

        let overrides = CliOverrides {
            config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let config = load_with_env(&overrides, HashMap::new()).unwrap();

        assert_eq!(config.scout.api_key, "from-file");
        assert_eq!(config.scout.request_timeout_ms, 5000);
        assert_eq!(config.scout.base_url, "https://scoutapm.com/api");
        assert_eq!(config.tools.active_window_days, 7);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = CliOverrides {
            config_path: Some(dir.path().join("nope.json")),
            ..Default::default()
        };
        assert!(load_with_env(&overrides, HashMap::new()).is_err());
    }

    #[test]
    fn bare_env_key_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_with_env(
            &isolated(&dir),
            env(&[("SCOUT_API_KEY", "env-key"), ("SCOUT_BASE_URL", "http://localhost:9/api")]),
        )
        .unwrap();

        assert_eq!(config.scout.api_key, "env-key");
        assert_eq!(config.scout.base_url, "http://localhost:9/api");
    }

    #[test]
    fn prefixed_env_wins_over_bare_and_parses_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_with_env(
            &isolated(&dir),
            env(&[
                ("SCOUT_API_KEY", "bare"),
                ("SCOUTAPM_SCOUT__API_KEY", "prefixed"),
                ("SCOUTAPM_SCOUT__REQUEST_TIMEOUT_MS", "1500"),
                ("UNRELATED", "ignored"),
            ]),
        )
        .unwrap();

        assert_eq!(config.scout.api_key, "prefixed");
        assert_eq!(config.scout.request_timeout_ms, 1500);
    }

    #[test]
    fn cli_wins_over_env_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"scout": {"api_key": "file", "base_url": "http://file/api"}}"#)
            .unwrap();

        let overrides = CliOverrides {
            api_key: Some("cli".to_string()),
            base_url: None,
            config_path: Some(path),
        };
        let config = load_with_env(&overrides, env(&[("SCOUT_API_KEY", "env")])).unwrap();

        assert_eq!(config.scout.api_key, "cli");
        assert_eq!(config.scout.base_url, "http://file/api");
    }

    #[test]
    fn debug_output_masks_key() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = CliOverrides {
            api_key: Some("supersecretkey".to_string()),
            ..isolated(&dir)
        };
        let config = load_with_env(&overrides, HashMap::new()).unwrap();

        let printed = format!("{:?}", config.scout);
        assert!(printed.contains("supe..."));
        assert!(!printed.contains("supersecretkey"));
    }
}
