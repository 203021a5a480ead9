//! 메트릭/인사이트 종류.
//!
//! 둘 다 닫힌 집합이며, 집합 밖의 값은 요청 전에 `InvalidArgument`로 거부한다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// 시계열 메트릭 이름
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    Apdex,
    Errors,
    QueueTime,
    ResponseTime,
    #[serde(rename = "response_time_95th")]
    ResponseTime95th,
    Throughput,
}

impl MetricName {
    /// 전체 메트릭 (이름순)
    pub const ALL: [MetricName; 6] = [
        MetricName::Apdex,
        MetricName::Errors,
        MetricName::QueueTime,
        MetricName::ResponseTime,
        MetricName::ResponseTime95th,
        MetricName::Throughput,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::Apdex => "apdex",
            MetricName::Errors => "errors",
            MetricName::QueueTime => "queue_time",
            MetricName::ResponseTime => "response_time",
            MetricName::ResponseTime95th => "response_time_95th",
            MetricName::Throughput => "throughput",
        }
    }

    /// 쉼표로 구분한 허용 목록
    pub fn valid_list() -> String {
        Self::ALL.map(|m| m.as_str()).join(", ")
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                CoreError::InvalidArgument(format!(
                    "Invalid metric_type. Must be one of: {}",
                    Self::valid_list()
                ))
            })
    }
}

/// 인사이트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    /// N+1 쿼리
    NPlusOne,
    /// 메모리 팽창
    MemoryBloat,
    /// 느린 쿼리
    SlowQuery,
}

impl InsightType {
    pub const ALL: [InsightType; 3] = [
        InsightType::NPlusOne,
        InsightType::MemoryBloat,
        InsightType::SlowQuery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::NPlusOne => "n_plus_one",
            InsightType::MemoryBloat => "memory_bloat",
            InsightType::SlowQuery => "slow_query",
        }
    }

    pub fn valid_list() -> String {
        Self::ALL.map(|t| t.as_str()).join(", ")
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsightType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                CoreError::InvalidArgument(format!(
                    "Invalid insight_type. Must be one of: {}",
                    Self::valid_list()
                ))
            })
    }
}
