//! 요청 전 파라미터 검증.
//!
//! 모두 부수효과 없는 순수 함수이며, 네트워크 호출 전에 실행된다.
//! 실패는 항상 `CoreError::InvalidArgument`.

use chrono::{DateTime, Duration, Utc};

use crate::error::CoreError;
use crate::models::interval::TimeInterval;
use crate::models::metric::{InsightType, MetricName};

/// API 최대 조회 구간 (일)
pub const MAX_INTERVAL_DAYS: i64 = 14;

/// 트레이스 조회 가능한 과거 한도 (일)
pub const TRACE_LOOKBACK_DAYS: i64 = 7;

/// 구간 규칙: start < end, 길이 ≤ 14일
pub fn validate_interval(interval: &TimeInterval) -> Result<(), CoreError> {
    if interval.start() >= interval.end() {
        return Err(CoreError::InvalidArgument(
            "from_time must be before to_time".to_string(),
        ));
    }
    if interval.length() > Duration::days(MAX_INTERVAL_DAYS) {
        return Err(CoreError::InvalidArgument(
            "Time range cannot exceed 2 weeks".to_string(),
        ));
    }
    Ok(())
}

/// 메트릭 이름 검증 후 구간 검증
///
/// 메트릭 이름이 틀리면 구간 유효성과 무관하게 먼저 실패한다.
pub fn validate_metric_params(
    metric: &str,
    interval: &TimeInterval,
) -> Result<MetricName, CoreError> {
    let metric = metric.parse::<MetricName>()?;
    validate_interval(interval)?;
    Ok(metric)
}

/// 인사이트 종류 검증
pub fn validate_insight_type(insight_type: &str) -> Result<InsightType, CoreError> {
    insight_type.parse()
}

/// 트레이스 조회 구간: 일반 구간 규칙 + start가 `now - 7일` 이후
pub fn validate_trace_window(
    interval: &TimeInterval,
    now: DateTime<Utc>,
) -> Result<(), CoreError> {
    validate_interval(interval)?;
    let oldest = now - Duration::days(TRACE_LOOKBACK_DAYS);
    if interval.start() < oldest {
        return Err(CoreError::InvalidArgument(
            "from_time cannot be older than 7 days".to_string(),
        ));
    }
    Ok(())
}
