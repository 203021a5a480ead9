//! 응답 엔벨로프.
//!
//! Scout API 응답은 `{"results": ..., "header": {"status": {"code", "message"}}}` 형태.
//! `results` 내부 모양은 리소스마다 다르므로 `serde_json::Value`로 유지하고
//! 연산마다 필요한 경로만 꺼낸다.
//!
//! 필드가 없거나 `null`이면 빈 컨테이너를 돌려주고, 필드가 있는데 타입이
//! 다를 때만 에러를 낸다.

use serde_json::{Map, Value};

use crate::error::CoreError;

/// 파싱된 응답 본문
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope(Value);

impl Envelope {
    pub fn new(body: Value) -> Self {
        Self(body)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    /// `header.status` 객체
    fn header_status(&self) -> Option<&Map<String, Value>> {
        self.0
            .get("header")
            .and_then(|h| h.get("status"))
            .and_then(Value::as_object)
    }

    /// `header.status.code`: 애플리케이션 레벨 상태 코드
    ///
    /// `404.0`처럼 실수로 온 코드도 정수로 읽는다.
    pub fn status_code(&self) -> Option<i64> {
        let code = self.header_status()?.get("code")?;
        code.as_i64().or_else(|| code.as_f64().map(|f| f as i64))
    }

    /// `header.status.message`
    pub fn status_message(&self) -> Option<String> {
        match self.header_status()?.get("message")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// 경로의 값을 찾는다. 중간에 필드가 없거나 `null`이면 `Ok(None)`.
    fn lookup(&self, path: &[&str]) -> Result<Option<&Value>, CoreError> {
        let mut current = &self.0;
        for (depth, key) in path.iter().enumerate() {
            let Value::Object(map) = current else {
                return Err(self.shape_error(&path[..depth], "an object"));
            };
            match map.get(*key) {
                None | Some(Value::Null) => return Ok(None),
                Some(next) => current = next,
            }
        }
        Ok(Some(current))
    }

    /// 경로의 배열 (없으면 빈 배열)
    pub fn array_at(&self, path: &[&str]) -> Result<Vec<Value>, CoreError> {
        match self.lookup(path)? {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(_) => Err(self.shape_error(path, "an array")),
        }
    }

    /// 경로의 객체 (없으면 빈 객체)
    pub fn object_at(&self, path: &[&str]) -> Result<Map<String, Value>, CoreError> {
        match self.lookup(path)? {
            None => Ok(Map::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(_) => Err(self.shape_error(path, "an object")),
        }
    }

    fn shape_error(&self, path: &[&str], expected: &str) -> CoreError {
        let location = if path.is_empty() {
            "response body".to_string()
        } else {
            format!("`{}`", path.join("."))
        };
        CoreError::api(
            format!("Unexpected response shape: {location} is not {expected}"),
            None,
            Some(self.0.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn missing_fields_default_to_empty() {
        let envelope = Envelope::new(json!({"results": {}}));
        assert!(envelope.array_at(&["results", "apps"]).unwrap().is_empty());
        assert!(envelope.object_at(&["results", "app"]).unwrap().is_empty());

        let envelope = Envelope::new(json!({}));
        assert!(envelope.array_at(&["results", "apps"]).unwrap().is_empty());
        assert!(envelope.array_at(&["results"]).unwrap().is_empty());
    }

    #[test]
    fn null_counts_as_absent() {
        let envelope = Envelope::new(json!({"results": null}));
        assert!(envelope.array_at(&["results", "traces"]).unwrap().is_empty());
    }

    #[test]
    fn extracts_nested_values() {
        let envelope = Envelope::new(json!({
            "results": {"series": {"response_time": [[1, 2.0]]}, "apps": [{"id": 1}]}
        }));
        assert_eq!(
            envelope.array_at(&["results", "apps"]).unwrap(),
            vec![json!({"id": 1})]
        );
        let series = envelope.object_at(&["results", "series"]).unwrap();
        assert_eq!(series["response_time"], json!([[1, 2.0]]));
        assert_eq!(
            envelope
                .array_at(&["results", "series", "response_time"])
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn type_mismatch_is_an_api_error() {
        let envelope = Envelope::new(json!({"results": {"apps": "nope"}}));
        let err = envelope.array_at(&["results", "apps"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Api);
        assert!(err.to_string().contains("`results.apps` is not an array"));
        assert!(err.response_body().is_some());

        // results 자체가 배열인데 하위 필드를 찾는 경우
        let envelope = Envelope::new(json!({"results": [1, 2]}));
        let err = envelope.object_at(&["results", "app"]).unwrap_err();
        assert!(err.to_string().contains("`results` is not an object"));
    }

    #[test]
    fn non_object_body() {
        let envelope = Envelope::new(json!([1, 2, 3]));
        let err = envelope.array_at(&["results"]).unwrap_err();
        assert!(err.to_string().contains("response body"));
    }

    #[test]
    fn header_status_fields() {
        let envelope = Envelope::new(json!({
            "header": {"status": {"code": 404, "message": "Not found"}}
        }));
        assert_eq!(envelope.status_code(), Some(404));
        assert_eq!(envelope.status_message().as_deref(), Some("Not found"));

        let envelope = Envelope::new(json!({"header": {"status": {"code": 200}}}));
        assert_eq!(envelope.status_code(), Some(200));
        assert_eq!(envelope.status_message(), None);

        let envelope = Envelope::new(json!({"results": []}));
        assert_eq!(envelope.status_code(), None);
    }

    #[test]
    fn float_status_code_is_read_numerically() {
        let envelope = Envelope::new(json!({
            "header": {"status": {"code": 404.0, "message": "Not found"}}
        }));
        assert_eq!(envelope.status_code(), Some(404));

        let envelope = Envelope::new(json!({"header": {"status": {"code": 200.5}}}));
        assert_eq!(envelope.status_code(), Some(200));

        // 숫자가 아닌 코드는 무시
        let envelope = Envelope::new(json!({"header": {"status": {"code": "404"}}}));
        assert_eq!(envelope.status_code(), None);
    }
}
