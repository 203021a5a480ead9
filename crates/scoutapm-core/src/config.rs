//! 애플리케이션 설정 구조체.
//!
//! Scout API 접속 정보와 도구 레이어 기본값을 정의한다.
//! 실제 로드(파일/환경변수/CLI 병합)는 `scoutapm-app`이 `config` crate로 수행한다.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Scout API 접속 설정
    #[serde(default)]
    pub scout: ScoutConfig,
    /// 도구 레이어 설정
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

// ============================================================
// Scout API 접속 설정
// ============================================================

/// Scout API 접속 설정
#[derive(Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// API 키 (`X-SCOUT-API` 헤더로 전송)
    #[serde(default)]
    pub api_key: String,
    /// API 기본 URL (버전 세그먼트 `v0` 제외)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 요청 타임아웃 (밀리초)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ScoutConfig {
    /// API 키와 기본 URL로 생성 (타임아웃은 기본값)
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    /// 요청 타임아웃을 Duration으로 반환
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// 로그 출력용 마스킹된 API 키 (앞 4자만 노출)
    pub fn masked_api_key(&self) -> String {
        if self.api_key.is_empty() {
            return "<unset>".to_string();
        }
        let prefix: String = self.api_key.chars().take(4).collect();
        format!("{prefix}...")
    }
}

// API 키가 로그에 그대로 찍히지 않도록 Debug를 직접 구현
impl std::fmt::Debug for ScoutConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoutConfig")
            .field("api_key", &self.masked_api_key())
            .field("base_url", &self.base_url)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

// ============================================================
// 도구 레이어 설정
// ============================================================

/// 도구 레이어 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// `list_apps` 기본 활동 기준 (최근 N일 내 보고한 앱만)
    #[serde(default = "default_active_window_days")]
    pub active_window_days: u32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            active_window_days: default_active_window_days(),
        }
    }
}

// ============================================================
// AppConfig impl
// ============================================================

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            scout: ScoutConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

// ============================================================
// 기본값 함수
// ============================================================

/// Scout API 기본 URL
pub const DEFAULT_BASE_URL: &str = "https://scoutapm.com/api";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_request_timeout_ms() -> u64 {
    30_000
}
fn default_active_window_days() -> u32 {
    30 // 메트릭 보존 기간
}
