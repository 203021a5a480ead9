//! 도구 라우터.
//!
//! 도구 이름 + JSON 인자 객체를 받아 `ScoutApi` 연산을 호출하고 JSON 값을 돌려준다.
//! 어떤 에러든 `{"error": "<message>"}`로 변환하므로 호출자에게 에러가 전파되지 않는다.

use chrono::Duration;
use scoutapm_core::clock::{Clock, SystemClock};
use scoutapm_core::config::ToolsConfig;
use scoutapm_core::error::CoreError;
use scoutapm_core::models::interval::{parse_interval, parse_timestamp, TimeInterval};
use scoutapm_core::models::metric::MetricName;
use scoutapm_core::models::resource::{endpoint_id, filter_active_apps};
use scoutapm_core::ports::api_client::{ApiScope, ScoutApi};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 노출하는 도구 이름 (고정)
pub const TOOL_NAMES: &[&str] = &[
    "list_apps",
    "get_app_metrics",
    "get_app_endpoints",
    "get_endpoint_metrics",
    "get_app_endpoint_traces",
    "get_app_trace",
    "get_app_error_groups",
    "get_error_group_errors",
    "get_app_insights",
    "get_app_summary",
    "list_available_metrics",
];

type Api<'a> = ApiScope<'a, dyn ScoutApi>;

/// 도구 라우터
pub struct ToolRouter {
    api: Arc<dyn ScoutApi>,
    clock: Arc<dyn Clock>,
    active_window_days: u32,
}

impl ToolRouter {
    pub fn new(api: Arc<dyn ScoutApi>, config: &ToolsConfig) -> Self {
        Self {
            api,
            clock: Arc::new(SystemClock),
            active_window_days: config.active_window_days,
        }
    }

    /// 시계 교체 (`list_apps` 기본 기준 시각 계산용)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 도구 실행. 실패는 `{"error": ...}` 값으로 돌려준다.
    pub async fn call(&self, tool: &str, arguments: Value) -> Value {
        debug!(tool, "도구 호출");
        match self.dispatch(tool, &arguments).await {
            Ok(value) => value,
            Err(e) => {
                // 요청 전에 걸러진 입력 에러는 경고 대상이 아님
                if e.is_local() {
                    info!(tool, kind = %e.kind(), "도구 인자 거부: {e}");
                } else {
                    warn!(tool, kind = %e.kind(), "도구 실패: {e}");
                }
                error_value(e.to_string())
            }
        }
    }

    async fn dispatch(&self, tool: &str, arguments: &Value) -> Result<Value, CoreError> {
        let args = ToolArgs::from_value(arguments)?;
        // 호출마다 연결을 잡고 끝나면 해제
        let api: Api<'_> = ApiScope::new(&*self.api);

        match tool {
            "list_apps" => self.list_apps(&api, &args).await,
            "get_app_metrics" => get_app_metrics(&api, &args).await,
            "get_app_endpoints" => get_app_endpoints(&api, &args).await,
            "get_endpoint_metrics" => get_endpoint_metrics(&api, &args).await,
            "get_app_endpoint_traces" => {
                let app_id = args.id("app_id")?;
                let endpoint = args.string("endpoint_id")?;
                let interval = args.interval()?.interval;
                let traces = api.get_endpoint_traces(app_id, &endpoint, &interval).await?;
                Ok(Value::Array(traces))
            }
            "get_app_trace" => {
                let trace = api
                    .get_trace(args.id("app_id")?, args.id("trace_id")?)
                    .await?;
                Ok(Value::Object(trace))
            }
            "get_app_error_groups" => get_app_error_groups(&api, &args).await,
            "get_error_group_errors" => {
                let errors = api
                    .list_error_group_errors(args.id("app_id")?, args.id("error_group_id")?)
                    .await?;
                Ok(Value::Array(errors))
            }
            "get_app_insights" => {
                let app_id = args.id("app_id")?;
                let limit = args.opt_u32("limit")?;
                let insights = match args.opt_string("insight_type")? {
                    Some(insight_type) => {
                        api.get_insight_by_type(app_id, &insight_type, limit).await?
                    }
                    None => api.get_insights(app_id, limit).await?,
                };
                Ok(Value::Object(insights))
            }
            "get_app_summary" => {
                let summary = api.get_app_summary(args.id("app_id")?).await?;
                Ok(json!({
                    "app": summary.app,
                    "available_metrics": summary.available_metrics,
                }))
            }
            "list_available_metrics" => Ok(Value::Array(
                MetricName::ALL
                    .iter()
                    .map(|m| Value::from(m.as_str()))
                    .collect(),
            )),
            other => Err(CoreError::InvalidArgument(format!(
                "Unknown tool: {other}. Available tools: {}",
                TOOL_NAMES.join(", ")
            ))),
        }
    }

    /// 최근 활동한 앱만 (`last_reported_at` ≥ 기준 시각)
    async fn list_apps(&self, api: &Api<'_>, args: &ToolArgs<'_>) -> Result<Value, CoreError> {
        let cutoff = match args.opt_string("active_since")? {
            Some(raw) => parse_timestamp("active_since", &raw)?,
            None => self.clock.now() - Duration::days(i64::from(self.active_window_days)),
        };
        let apps = api.list_apps().await?;
        Ok(Value::Array(filter_active_apps(apps, cutoff)))
    }
}

fn error_value(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

/// 시계열 결과 요약. 데이터가 없으면 `None`.
fn series_summary(series: Option<&Value>) -> Option<(usize, Value)> {
    match series {
        Some(Value::Array(points)) if !points.is_empty() => {
            Some((points.len(), Value::Array(points.clone())))
        }
        _ => None,
    }
}

async fn get_app_metrics(api: &Api<'_>, args: &ToolArgs<'_>) -> Result<Value, CoreError> {
    let app_id = args.id("app_id")?;
    // 메트릭 이름은 시간 인자보다 먼저 검사
    let metric: MetricName = args.string("metric")?.parse()?;
    let bounds = args.interval()?;

    let data = api
        .get_metric_data(app_id, metric.as_str(), &bounds.interval)
        .await?;
    let Some((data_points, series)) = series_summary(data.get(metric.as_str())) else {
        return Ok(error_value(format!("No data available for metric {metric}")));
    };

    Ok(json!({
        "app_id": app_id,
        "metric": metric.as_str(),
        "duration": bounds.duration(),
        "data_points": data_points,
        "series": series,
    }))
}

async fn get_app_endpoints(api: &Api<'_>, args: &ToolArgs<'_>) -> Result<Value, CoreError> {
    let app_id = args.id("app_id")?;
    let interval = args.interval()?.interval;

    let mut endpoints = api.list_endpoints(app_id, &interval).await?;
    for endpoint in &mut endpoints {
        let id = endpoint_id(endpoint);
        if let Value::Object(fields) = endpoint {
            fields.insert("endpoint_id".to_string(), Value::String(id));
        }
    }
    Ok(Value::Array(endpoints))
}

async fn get_endpoint_metrics(api: &Api<'_>, args: &ToolArgs<'_>) -> Result<Value, CoreError> {
    let app_id = args.id("app_id")?;
    let endpoint = args.string("endpoint")?;
    let metric = args.string("metric")?;
    let bounds = args.interval()?;

    let series = api
        .get_endpoint_metric(app_id, &endpoint, &metric, &bounds.interval)
        .await?;
    let series = Value::Array(series);
    let Some((data_points, series)) = series_summary(Some(&series)) else {
        return Ok(error_value(format!(
            "No data available for endpoint {endpoint} and metric {metric}"
        )));
    };

    Ok(json!({
        "app_id": app_id,
        "endpoint": endpoint,
        "metric": metric,
        "duration": bounds.duration(),
        "data_points": data_points,
        "series": series,
    }))
}

async fn get_app_error_groups(api: &Api<'_>, args: &ToolArgs<'_>) -> Result<Value, CoreError> {
    let app_id = args.id("app_id")?;
    let interval = args.interval()?.interval;

    if let Some(group_id) = args.opt_id("error_group_id")? {
        let group = api.get_error_group(app_id, group_id).await?;
        let groups = if group.is_empty() {
            vec![]
        } else {
            vec![Value::Object(group)]
        };
        return Ok(Value::Array(groups));
    }

    let endpoint = args.opt_string("endpoint_id")?;
    let groups = api
        .list_error_groups(app_id, &interval, endpoint.as_deref())
        .await?;
    Ok(Value::Array(groups))
}

/// 파싱된 시간 인자 + 원문 (`duration` 표시용)
struct Bounds {
    from: String,
    to: String,
    interval: TimeInterval,
}

impl Bounds {
    fn duration(&self) -> String {
        format!("{} to {}", self.from, self.to)
    }
}

/// 도구 인자 객체 접근자
struct ToolArgs<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> ToolArgs<'a> {
    /// 인자는 객체 또는 `null`(인자 없음)
    fn from_value(value: &'a Value) -> Result<Self, CoreError> {
        match value {
            Value::Null => Ok(Self { fields: None }),
            Value::Object(fields) => Ok(Self {
                fields: Some(fields),
            }),
            _ => Err(CoreError::InvalidArgument(
                "Tool arguments must be a JSON object".to_string(),
            )),
        }
    }

    /// 값 조회. `null`은 없는 것으로 취급.
    fn get(&self, name: &str) -> Option<&'a Value> {
        self.fields
            .and_then(|fields| fields.get(name))
            .filter(|value| !value.is_null())
    }

    fn missing(name: &str) -> CoreError {
        CoreError::InvalidArgument(format!("Missing required argument: {name}"))
    }

    /// 필수 정수 ID (JSON 정수 또는 10진 문자열)
    fn id(&self, name: &str) -> Result<u64, CoreError> {
        self.opt_id(name)?.ok_or_else(|| Self::missing(name))
    }

    /// 선택 정수 ID. 빈 문자열은 없는 것으로 취급.
    fn opt_id(&self, name: &str) -> Result<Option<u64>, CoreError> {
        let invalid =
            || CoreError::InvalidArgument(format!("Invalid {name}: expected a non-negative integer"));
        match self.get(name) {
            None => Ok(None),
            Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(invalid),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid()),
            Some(_) => Err(invalid()),
        }
    }

    fn string(&self, name: &str) -> Result<String, CoreError> {
        self.opt_string(name)?.ok_or_else(|| Self::missing(name))
    }

    /// 선택 문자열. 빈 문자열은 없는 것으로 취급.
    fn opt_string(&self, name: &str) -> Result<Option<String>, CoreError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(CoreError::InvalidArgument(format!(
                "Invalid {name}: expected a string"
            ))),
        }
    }

    fn opt_u32(&self, name: &str) -> Result<Option<u32>, CoreError> {
        match self.opt_id(name)? {
            None => Ok(None),
            Some(n) => u32::try_from(n).map(Some).map_err(|_| {
                CoreError::InvalidArgument(format!("Invalid {name}: value too large"))
            }),
        }
    }

    /// `from_` / `to` 시간 구간
    fn interval(&self) -> Result<Bounds, CoreError> {
        let from = self.string("from_")?;
        let to = self.string("to")?;
        let interval = parse_interval(&from, &to)?;
        Ok(Bounds { from, to, interval })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_accept_integers_and_decimal_strings() {
        let value = json!({"a": 12, "b": "34", "c": " 56 ", "d": -1, "e": "x", "f": 1.5, "g": ""});
        let args = ToolArgs::from_value(&value).unwrap();

        assert_eq!(args.id("a").unwrap(), 12);
        assert_eq!(args.id("b").unwrap(), 34);
        assert_eq!(args.id("c").unwrap(), 56);
        assert!(args.id("d").is_err());
        assert!(args.id("e").is_err());
        assert!(args.id("f").is_err());
        assert_eq!(args.opt_id("g").unwrap(), None);
        assert_eq!(
            args.id("missing").unwrap_err().to_string(),
            "Missing required argument: missing"
        );
    }

    #[test]
    fn null_arguments_mean_no_arguments() {
        let args = ToolArgs::from_value(&Value::Null).unwrap();
        assert_eq!(args.opt_string("anything").unwrap(), None);

        let value = json!({"x": null});
        let args = ToolArgs::from_value(&value).unwrap();
        assert_eq!(args.opt_id("x").unwrap(), None);
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        assert!(ToolArgs::from_value(&json!([1, 2])).is_err());
        assert!(ToolArgs::from_value(&json!("app_id=1")).is_err());
    }

    #[test]
    fn strings_must_be_strings() {
        let value = json!({"from_": 20240101, "limit": 4294967296u64});
        let args = ToolArgs::from_value(&value).unwrap();

        let err = args.string("from_").unwrap_err();
        assert_eq!(err.to_string(), "Invalid from_: expected a string");
        assert!(args.opt_u32("limit").is_err());
    }

    #[test]
    fn interval_keeps_raw_text_for_duration() {
        let value = json!({"from_": "2024-01-01", "to": "2024-01-02T00:00:00Z"});
        let bounds = ToolArgs::from_value(&value).unwrap().interval().unwrap();

        assert_eq!(bounds.duration(), "2024-01-01 to 2024-01-02T00:00:00Z");
        assert_eq!(bounds.interval.length(), Duration::days(1));
    }

    #[test]
    fn missing_series_is_no_data() {
        assert!(series_summary(None).is_none());
        assert!(series_summary(Some(&json!([]))).is_none());
        assert!(series_summary(Some(&json!({"a": 1}))).is_none());
        assert_eq!(series_summary(Some(&json!([1, 2]))).unwrap().0, 2);
    }
}
