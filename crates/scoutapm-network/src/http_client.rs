//! Scout APM REST API 클라이언트.
//!
//! `ScoutApi` 포트 구현. `X-SCOUT-API` 인증 헤더 주입 + 응답 에러 분류.
//! 재시도는 하지 않는다. 호출 한 번 = 요청 한 번.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use scoutapm_core::clock::{Clock, SystemClock};
use scoutapm_core::config::ScoutConfig;
use scoutapm_core::error::CoreError;
use scoutapm_core::models::envelope::Envelope;
use scoutapm_core::models::interval::TimeInterval;
use scoutapm_core::ports::api_client::{ApiScope, ScoutApi};
use scoutapm_core::validation::{
    validate_insight_type, validate_interval, validate_metric_params, validate_trace_window,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// API 버전 경로 세그먼트
pub const API_VERSION: &str = "v0";

/// 인증 헤더 (`X-SCOUT-API`, 헤더 이름은 대소문자 무관)
pub const AUTH_HEADER: &str = "x-scout-api";

const AUTH_FAILED_MESSAGE: &str = "Authentication failed - check your API key";
const API_FAILED_MESSAGE: &str = "API request failed";
const UNKNOWN_API_ERROR_MESSAGE: &str = "Unknown API error";

/// REST API 클라이언트: `ScoutApi` 포트 구현
///
/// 연결(`reqwest::Client`)은 첫 요청 때 만들어 캐시하고, `close()` 후에는
/// 다음 요청에서 새로 만든다. 요청 중에 `open`/`close`를 동시에 호출하지 않는 것은
/// 호출자 책임이다.
pub struct ScoutHttpClient {
    api_key: String,
    base_url: Url,
    timeout: Duration,
    clock: Arc<dyn Clock>,
    connection: Mutex<Option<reqwest::Client>>,
}

impl ScoutHttpClient {
    /// 새 클라이언트 생성 (연결은 아직 만들지 않음)
    ///
    /// 빈 API 키는 여기서 거부하지 않는다. 첫 `open()`에서 설정 에러가 난다.
    pub fn new(config: &ScoutConfig) -> Result<Self, CoreError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            CoreError::Config(format!("Invalid base URL '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CoreError::Config(format!(
                "Invalid base URL '{}': not a hierarchical URL",
                config.base_url
            )));
        }

        debug!(
            base_url = %base_url,
            api_key = %config.masked_api_key(),
            timeout_ms = config.request_timeout_ms,
            "ScoutHttpClient 초기화"
        );

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url,
            timeout: config.request_timeout(),
            clock: Arc::new(SystemClock),
            connection: Mutex::new(None),
        })
    }

    /// 시계 교체 (트레이스 7일 제한 계산용)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 캐시된 연결 존재 여부
    pub fn is_open(&self) -> bool {
        self.connection.lock().is_some()
    }

    /// 연결을 열거나 캐시된 연결을 반환 (멱등)
    pub fn open(&self) -> Result<reqwest::Client, CoreError> {
        let mut connection = self.connection.lock();
        if let Some(client) = connection.as_ref() {
            return Ok(client.clone());
        }

        if self.api_key.is_empty() {
            return Err(CoreError::Config("API key is required".to_string()));
        }

        let mut key = HeaderValue::from_str(&self.api_key).map_err(|_| {
            CoreError::Config("API key contains characters not allowed in a header".to_string())
        })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(AUTH_HEADER), key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .map_err(|e| CoreError::Config(format!("Failed to build HTTP client: {e}")))?;

        info!(base_url = %self.base_url, "Scout API 연결 생성");
        *connection = Some(client.clone());
        Ok(client)
    }

    /// 캐시된 연결 해제 (없으면 no-op)
    pub fn close(&self) {
        if self.connection.lock().take().is_some() {
            info!("Scout API 연결 해제");
        }
    }

    /// 범위가 끝나면 연결을 해제하는 가드
    pub fn scope(&self) -> ApiScope<'_, Self> {
        ApiScope::new(self)
    }

    /// `{base_url}/v0/{segments...}`: 세그먼트마다 퍼센트 인코딩
    ///
    /// `/`, `?`, `#`가 들어간 id도 한 세그먼트로 남는다.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // new()에서 cannot-be-a-base URL은 거부했으므로 항상 Ok
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(API_VERSION).extend(segments);
        }
        url
    }

    /// 요청 실행 후 응답 분류
    ///
    /// `path`는 `/`로 나눠 세그먼트로 붙인다 (앞뒤 `/`는 무시).
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Envelope, CoreError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.send(method, self.url(&segments), query, body).await
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Envelope, CoreError> {
        let client = self.open()?;
        debug!(%method, %url, ?query, has_body = body.is_some(), "Scout API 요청");

        let mut req = client.request(method, url.clone());
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| {
            warn!(%url, "Scout API 요청 실패: {e}");
            CoreError::Network(e.to_string())
        })?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| CoreError::Network(format!("failed to read response body: {e}")))?;

        let result = classify_response(status, &text);
        match &result {
            Ok(_) => debug!(status, "Scout API 응답 성공"),
            Err(e) => warn!(status, kind = %e.kind(), "Scout API 에러 응답: {e}"),
        }
        result
    }

    async fn get(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Envelope, CoreError> {
        self.send(Method::GET, self.url(segments), query, None).await
    }
}

/// 응답 상태 코드 + 본문 → 엔벨로프 또는 에러
///
/// 판정 순서:
/// 1. 401 → 인증 에러 (본문 무관)
/// 2. JSON 파싱 실패 → API 에러 (`Invalid JSON response: ...`)
/// 3. 상태 ≥ 400 → API 에러 (`header.status.message` 또는 기본 메시지)
/// 4. 본문의 `header.status.code` ≥ 400 → API 에러 (2xx여도)
pub fn classify_response(status: u16, text: &str) -> Result<Envelope, CoreError> {
    if status == 401 {
        return Err(CoreError::Auth(AUTH_FAILED_MESSAGE.to_string()));
    }

    let body: Value = serde_json::from_str(text).map_err(|_| {
        CoreError::api(format!("Invalid JSON response: {text}"), Some(status), None)
    })?;
    let envelope = Envelope::new(body);

    if status >= 400 {
        let message = envelope
            .status_message()
            .unwrap_or_else(|| API_FAILED_MESSAGE.to_string());
        return Err(CoreError::api(
            message,
            Some(status),
            Some(envelope.into_inner()),
        ));
    }

    if let Some(code) = envelope.status_code().filter(|code| *code >= 400) {
        let message = envelope
            .status_message()
            .unwrap_or_else(|| UNKNOWN_API_ERROR_MESSAGE.to_string());
        return Err(CoreError::api(
            message,
            u16::try_from(code).ok(),
            Some(envelope.into_inner()),
        ));
    }

    Ok(envelope)
}

fn limit_param(limit: Option<u32>) -> Vec<(&'static str, String)> {
    limit
        .map(|n| vec![("limit", n.to_string())])
        .unwrap_or_default()
}

#[async_trait]
impl ScoutApi for ScoutHttpClient {
    async fn list_apps(&self) -> Result<Vec<Value>, CoreError> {
        self.get(&["apps"], &[]).await?.array_at(&["results", "apps"])
    }

    async fn get_app(&self, app_id: u64) -> Result<Map<String, Value>, CoreError> {
        self.get(&["apps", &app_id.to_string()], &[])
            .await?
            .object_at(&["results", "app"])
    }

    async fn list_metrics(&self, app_id: u64) -> Result<Vec<Value>, CoreError> {
        self.get(&["apps", &app_id.to_string(), "metrics"], &[])
            .await?
            .array_at(&["results", "availableMetrics"])
    }

    async fn get_metric_data(
        &self,
        app_id: u64,
        metric: &str,
        interval: &TimeInterval,
    ) -> Result<Map<String, Value>, CoreError> {
        let metric = validate_metric_params(metric, interval)?;
        self.get(
            &["apps", &app_id.to_string(), "metrics", metric.as_str()],
            &interval.query_params(),
        )
        .await?
        .object_at(&["results", "series"])
    }

    async fn list_endpoints(
        &self,
        app_id: u64,
        interval: &TimeInterval,
    ) -> Result<Vec<Value>, CoreError> {
        validate_interval(interval)?;
        let mut query = vec![("full", "true".to_string())];
        query.extend(interval.query_params());

        self.get(&["apps", &app_id.to_string(), "endpoints"], &query)
            .await?
            .array_at(&["results"])
    }

    async fn get_endpoint_metric(
        &self,
        app_id: u64,
        endpoint_id: &str,
        metric: &str,
        interval: &TimeInterval,
    ) -> Result<Vec<Value>, CoreError> {
        let metric = validate_metric_params(metric, interval)?;
        self.get(
            &[
                "apps",
                &app_id.to_string(),
                "endpoints",
                endpoint_id,
                "metrics",
                metric.as_str(),
            ],
            &interval.query_params(),
        )
        .await?
        .array_at(&["results", "series", metric.as_str()])
    }

    async fn get_endpoint_traces(
        &self,
        app_id: u64,
        endpoint_id: &str,
        interval: &TimeInterval,
    ) -> Result<Vec<Value>, CoreError> {
        validate_trace_window(interval, self.clock.now())?;
        self.get(
            &["apps", &app_id.to_string(), "endpoints", endpoint_id, "traces"],
            &interval.query_params(),
        )
        .await?
        .array_at(&["results", "traces"])
    }

    async fn get_trace(
        &self,
        app_id: u64,
        trace_id: u64,
    ) -> Result<Map<String, Value>, CoreError> {
        self.get(
            &["apps", &app_id.to_string(), "traces", &trace_id.to_string()],
            &[],
        )
            .await?
            .object_at(&["results", "trace"])
    }

    async fn list_error_groups(
        &self,
        app_id: u64,
        interval: &TimeInterval,
        endpoint: Option<&str>,
    ) -> Result<Vec<Value>, CoreError> {
        validate_interval(interval)?;
        let mut query = interval.query_params();
        if let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) {
            query.push(("endpoint", endpoint.to_string()));
        }

        self.get(&["apps", &app_id.to_string(), "error_groups"], &query)
            .await?
            .array_at(&["results", "error_groups"])
    }

    async fn get_error_group(
        &self,
        app_id: u64,
        error_group_id: u64,
    ) -> Result<Map<String, Value>, CoreError> {
        self.get(
            &[
                "apps",
                &app_id.to_string(),
                "error_groups",
                &error_group_id.to_string(),
            ],
            &[],
        )
            .await?
            .object_at(&["results", "error_group"])
    }

    async fn list_error_group_errors(
        &self,
        app_id: u64,
        error_group_id: u64,
    ) -> Result<Vec<Value>, CoreError> {
        self.get(
            &[
                "apps",
                &app_id.to_string(),
                "error_groups",
                &error_group_id.to_string(),
                "errors",
            ],
            &[],
        )
        .await?
        .array_at(&["results", "errors"])
    }

    async fn get_insights(
        &self,
        app_id: u64,
        limit: Option<u32>,
    ) -> Result<Map<String, Value>, CoreError> {
        self.get(
            &["apps", &app_id.to_string(), "insights"],
            &limit_param(limit),
        )
            .await?
            .object_at(&["results"])
    }

    async fn get_insight_by_type(
        &self,
        app_id: u64,
        insight_type: &str,
        limit: Option<u32>,
    ) -> Result<Map<String, Value>, CoreError> {
        let insight_type = validate_insight_type(insight_type)?;
        self.get(
            &["apps", &app_id.to_string(), "insights", insight_type.as_str()],
            &limit_param(limit),
        )
        .await?
        .object_at(&["results"])
    }

    fn close(&self) {
        ScoutHttpClient::close(self);
    }
}
