//! 조회 시간 구간.
//!
//! ISO 8601 문자열을 UTC 시각 쌍으로 파싱하고, 요청용 와이어 포맷
//! (`YYYY-MM-DDTHH:MM:SSZ`)으로 되돌린다. 초 미만 정밀도는 와이어로 나가지 않는다.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::error::CoreError;

/// 요청 파라미터 시각 포맷
pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// 오프셋이 붙은 입력에 허용하는 포맷 (`+09:00`, `+0900` 둘 다)
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%:z",
    "%Y%m%dT%H%M%S%:z",
    "%Y%m%dT%H%M%S%z",
    "%Y%m%dT%H%M%:z",
    "%Y%m%dT%H%M%z",
];

/// 오프셋 없는 입력에 허용하는 포맷 (UTC로 간주)
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S",
    "%Y%m%dT%H%M",
];

/// 날짜만 있는 입력 (자정 UTC)
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// 조회 시간 구간 (start, end): 둘 다 UTC
///
/// 생성 자체는 검증하지 않는다. 구간 규칙은
/// [`crate::validation::validate_interval`]이 요청 직전에 확인한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// 구간 길이 (start > end면 음수)
    pub fn length(&self) -> Duration {
        self.end - self.start
    }

    /// `from`/`to` 쿼리 파라미터
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("from", format_timestamp(self.start)),
            ("to", format_timestamp(self.end)),
        ]
    }
}

/// 두 ISO 8601 문자열로 구간 생성
pub fn parse_interval(from: &str, to: &str) -> Result<TimeInterval, CoreError> {
    let start = parse_timestamp("from_time", from)?;
    let end = parse_timestamp("to_time", to)?;
    Ok(TimeInterval::new(start, end))
}

/// ISO 8601 문자열 → UTC 시각
///
/// 끝의 `Z`, `+09:00`, `+0900` 같은 오프셋을 받는다. 오프셋이 없으면 UTC로 간주한다.
/// 확장 포맷(`2024-01-01T10:00Z`)과 기본 포맷(`20240101T100000Z`) 모두 허용.
pub fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, CoreError> {
    let trimmed = value.trim();
    // 끝의 `Z`는 `+00:00`으로 바꿔 오프셋 포맷으로 처리
    let raw = match trimmed.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{rest}+00:00"),
        None => trimmed.to_string(),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(&raw, format) {
            return Ok(parsed.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&raw, format) {
            return Ok(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Some(midnight) = NaiveDate::parse_from_str(&raw, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return Ok(midnight.and_utc());
        }
    }

    Err(CoreError::Validation {
        field: field.to_string(),
        message: format!("Invalid ISO 8601 datetime for {field}: '{value}'"),
    })
}

/// UTC 시각 → 와이어 포맷 (`2024-01-01T00:00:00Z`)
pub fn format_timestamp(t: DateTime<Utc>) -> String {
    t.format(WIRE_FORMAT).to_string()
}
