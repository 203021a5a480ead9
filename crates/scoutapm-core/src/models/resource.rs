//! 리소스 레코드 헬퍼.
//!
//! API가 돌려준 앱/엔드포인트 레코드에서 파생 값을 계산한다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::interval::parse_timestamp;

/// 앱 요약: 앱 상세 + 사용 가능한 메트릭 목록
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSummary {
    pub app: Map<String, Value>,
    pub available_metrics: Vec<Value>,
}

/// 엔드포인트 식별자
///
/// API는 별도 ID 없이 `link` 필드(슬래시 구분 경로)만 주므로 마지막 세그먼트를 쓴다.
/// `link`가 없거나 비어 있으면 빈 문자열.
pub fn endpoint_id(endpoint: &Value) -> String {
    endpoint
        .get("link")
        .and_then(Value::as_str)
        .filter(|link| !link.is_empty())
        .and_then(|link| link.rsplit('/').next())
        .unwrap_or_default()
        .to_string()
}

/// 앱의 마지막 보고 시각 (`last_reported_at`)
///
/// 없거나 비었거나 파싱할 수 없으면 `None`.
pub fn last_reported_at(app: &Value) -> Option<DateTime<Utc>> {
    let raw = app.get("last_reported_at")?.as_str()?;
    if raw.is_empty() {
        return None;
    }
    parse_timestamp("last_reported_at", raw).ok()
}

/// `cutoff` 이후 보고한 앱만 남긴다
pub fn filter_active_apps(apps: Vec<Value>, cutoff: DateTime<Utc>) -> Vec<Value> {
    apps.into_iter()
        .filter(|app| last_reported_at(app).is_some_and(|reported| reported >= cutoff))
        .collect()
}
