//! Scout API 클라이언트 포트.
//!
//! 구현: `scoutapm-network` crate (reqwest)

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::ops::Deref;

use crate::error::CoreError;
use crate::models::interval::TimeInterval;
use crate::models::resource::AppSummary;

/// Scout APM API 클라이언트
///
/// 각 연산은 자체 파라미터를 먼저 검증하고(실패 시 요청 없음),
/// 요청 한 번의 결과에서 `results` 하위 경로 하나를 꺼내 돌려준다.
#[async_trait]
pub trait ScoutApi: Send + Sync {
    /// 앱 목록: `GET apps` → `results.apps`
    async fn list_apps(&self) -> Result<Vec<Value>, CoreError>;

    /// 앱 상세: `GET apps/{id}` → `results.app`
    async fn get_app(&self, app_id: u64) -> Result<Map<String, Value>, CoreError>;

    /// 사용 가능한 메트릭: `GET apps/{id}/metrics` → `results.availableMetrics`
    async fn list_metrics(&self, app_id: u64) -> Result<Vec<Value>, CoreError>;

    /// 앱 메트릭 시계열: `results.series`
    async fn get_metric_data(
        &self,
        app_id: u64,
        metric: &str,
        interval: &TimeInterval,
    ) -> Result<Map<String, Value>, CoreError>;

    /// 엔드포인트 목록 + 구간 집계: `results`
    async fn list_endpoints(
        &self,
        app_id: u64,
        interval: &TimeInterval,
    ) -> Result<Vec<Value>, CoreError>;

    /// 엔드포인트 메트릭 시계열: `results.series[metric]`
    async fn get_endpoint_metric(
        &self,
        app_id: u64,
        endpoint_id: &str,
        metric: &str,
        interval: &TimeInterval,
    ) -> Result<Vec<Value>, CoreError>;

    /// 엔드포인트 트레이스: `results.traces`
    ///
    /// 구간 시작이 7일보다 오래되면 요청 없이 실패한다.
    async fn get_endpoint_traces(
        &self,
        app_id: u64,
        endpoint_id: &str,
        interval: &TimeInterval,
    ) -> Result<Vec<Value>, CoreError>;

    /// 트레이스 상세 (모든 span 포함): `results.trace`
    async fn get_trace(&self, app_id: u64, trace_id: u64)
        -> Result<Map<String, Value>, CoreError>;

    /// 에러 그룹 목록: `results.error_groups`
    async fn list_error_groups(
        &self,
        app_id: u64,
        interval: &TimeInterval,
        endpoint: Option<&str>,
    ) -> Result<Vec<Value>, CoreError>;

    /// 에러 그룹 상세: `results.error_group`
    async fn get_error_group(
        &self,
        app_id: u64,
        error_group_id: u64,
    ) -> Result<Map<String, Value>, CoreError>;

    /// 에러 그룹의 최근 에러: `results.errors`
    async fn list_error_group_errors(
        &self,
        app_id: u64,
        error_group_id: u64,
    ) -> Result<Vec<Value>, CoreError>;

    /// 전체 인사이트: `results` 전체
    async fn get_insights(
        &self,
        app_id: u64,
        limit: Option<u32>,
    ) -> Result<Map<String, Value>, CoreError>;

    /// 종류별 인사이트: `results` 전체
    async fn get_insight_by_type(
        &self,
        app_id: u64,
        insight_type: &str,
        limit: Option<u32>,
    ) -> Result<Map<String, Value>, CoreError>;

    /// 앱 요약: 앱 상세 → 메트릭 목록 순서로 두 번 호출
    ///
    /// 첫 호출이 실패하면 두 번째 호출은 하지 않는다.
    async fn get_app_summary(&self, app_id: u64) -> Result<AppSummary, CoreError> {
        let app = self.get_app(app_id).await?;
        let available_metrics = self.list_metrics(app_id).await?;
        Ok(AppSummary {
            app,
            available_metrics,
        })
    }

    /// 캐시된 연결 해제. 다음 호출이 새 연결을 연다.
    fn close(&self) {}
}

/// 사용 범위 가드
///
/// 클라이언트로 deref되며, 범위를 벗어나면(에러/패닉 포함) 항상 `close()`를 호출한다.
pub struct ApiScope<'a, A: ScoutApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: ScoutApi + ?Sized> ApiScope<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: ScoutApi + ?Sized> Deref for ApiScope<'_, A> {
    type Target = A;

    fn deref(&self) -> &A {
        self.api
    }
}

impl<A: ScoutApi + ?Sized> Drop for ApiScope<'_, A> {
    fn drop(&mut self) {
        self.api.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 호출 순서를 기록하는 가짜 API
    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<&'static str>>,
        closes: AtomicUsize,
        fail_get_app: bool,
    }

    impl RecordingApi {
        fn record(&self, name: &'static str) {
            self.calls.lock().unwrap().push(name);
        }
    }

    #[async_trait]
    impl ScoutApi for RecordingApi {
        async fn list_apps(&self) -> Result<Vec<Value>, CoreError> {
            self.record("list_apps");
            Ok(vec![])
        }
        async fn get_app(&self, app_id: u64) -> Result<Map<String, Value>, CoreError> {
            self.record("get_app");
            if self.fail_get_app {
                return Err(CoreError::api("Not found", Some(404), None));
            }
            let mut app = Map::new();
            app.insert("id".into(), Value::from(app_id));
            Ok(app)
        }
        async fn list_metrics(&self, _app_id: u64) -> Result<Vec<Value>, CoreError> {
            self.record("list_metrics");
            Ok(vec![Value::from("apdex")])
        }
        async fn get_metric_data(
            &self,
            _: u64,
            _: &str,
            _: &TimeInterval,
        ) -> Result<Map<String, Value>, CoreError> {
            unimplemented!()
        }
        async fn list_endpoints(&self, _: u64, _: &TimeInterval) -> Result<Vec<Value>, CoreError> {
            unimplemented!()
        }
        async fn get_endpoint_metric(
            &self,
            _: u64,
            _: &str,
            _: &str,
            _: &TimeInterval,
        ) -> Result<Vec<Value>, CoreError> {
            unimplemented!()
        }
        async fn get_endpoint_traces(
            &self,
            _: u64,
            _: &str,
            _: &TimeInterval,
        ) -> Result<Vec<Value>, CoreError> {
            unimplemented!()
        }
        async fn get_trace(&self, _: u64, _: u64) -> Result<Map<String, Value>, CoreError> {
            unimplemented!()
        }
        async fn list_error_groups(
            &self,
            _: u64,
            _: &TimeInterval,
            _: Option<&str>,
        ) -> Result<Vec<Value>, CoreError> {
            unimplemented!()
        }
        async fn get_error_group(&self, _: u64, _: u64) -> Result<Map<String, Value>, CoreError> {
            unimplemented!()
        }
        async fn list_error_group_errors(&self, _: u64, _: u64) -> Result<Vec<Value>, CoreError> {
            unimplemented!()
        }
        async fn get_insights(&self, _: u64, _: Option<u32>) -> Result<Map<String, Value>, CoreError> {
            unimplemented!()
        }
        async fn get_insight_by_type(
            &self,
            _: u64,
            _: &str,
            _: Option<u32>,
        ) -> Result<Map<String, Value>, CoreError> {
            unimplemented!()
        }
        fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn app_summary_calls_app_then_metrics() {
        let api = RecordingApi::default();
        let summary = api.get_app_summary(7).await.unwrap();

        assert_eq!(summary.app["id"], Value::from(7));
        assert_eq!(summary.available_metrics, vec![Value::from("apdex")]);
        assert_eq!(*api.calls.lock().unwrap(), vec!["get_app", "list_metrics"]);
    }

    #[tokio::test]
    async fn app_summary_stops_after_first_failure() {
        let api = RecordingApi {
            fail_get_app: true,
            ..Default::default()
        };
        let err = api.get_app_summary(7).await.unwrap_err();

        assert_eq!(err.to_string(), "Not found");
        assert_eq!(*api.calls.lock().unwrap(), vec!["get_app"]);
    }

    #[tokio::test]
    async fn scope_closes_on_drop() {
        let api = RecordingApi::default();
        {
            let scoped = ApiScope::new(&api);
            scoped.list_apps().await.unwrap();
            assert_eq!(api.closes.load(Ordering::SeqCst), 0);
        }
        assert_eq!(api.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn scope_closes_when_body_fails() {
        let api = RecordingApi {
            fail_get_app: true,
            ..Default::default()
        };
        let result = async {
            let scoped = ApiScope::new(&api);
            scoped.get_app(1).await
        }
        .await;

        assert!(result.is_err());
        assert_eq!(api.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn scope_works_through_trait_objects() {
        let api: Box<dyn ScoutApi> = Box::new(RecordingApi::default());
        drop(ApiScope::new(api.as_ref()));
    }
}
