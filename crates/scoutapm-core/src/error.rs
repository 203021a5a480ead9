//! Scout APM 핵심 에러 타입.
//!
//! 모든 연산은 이 에러 하나로 실패를 보고한다. 도구 라우터는 어떤 variant든
//! `Display` 메시지를 그대로 `{"error": ...}` 응답으로 변환한다.

use std::fmt;

use thiserror::Error;

/// 에러 분류: 호출자가 복구 경로를 고르는 기준
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 로컬 설정 누락/오류 (예: 빈 API 키)
    Configuration,
    /// 호출자 파라미터가 로컬 전제 조건 위반
    InvalidArgument,
    /// 원격 API가 자격증명을 거부 (HTTP 401)
    Auth,
    /// 잘못된 응답, HTTP 4xx/5xx, 엔벨로프 내 에러 코드
    Api,
    /// 전송 계층 실패 (연결, 타임아웃, DNS)
    Network,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "CONFIGURATION_ERROR"),
            ErrorKind::InvalidArgument => write!(f, "INVALID_ARGUMENT"),
            ErrorKind::Auth => write!(f, "AUTH_ERROR"),
            ErrorKind::Api => write!(f, "API_ERROR"),
            ErrorKind::Network => write!(f, "NETWORK_ERROR"),
        }
    }
}

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정값 오류
    #[error("{0}")]
    Config(String),

    /// 잘못된 인자 (메트릭 이름, 인사이트 종류, 시간 구간 규칙 위반)
    #[error("{0}")]
    InvalidArgument(String),

    /// 입력 형식 오류 (ISO 8601 파싱 실패 등)
    #[error("{message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 인증 실패
    #[error("{0}")]
    Auth(String),

    /// API 에러 응답
    #[error("{message}")]
    Api {
        /// 사람이 읽을 수 있는 메시지
        message: String,
        /// HTTP 상태 코드 또는 엔벨로프에 담긴 애플리케이션 코드
        status_code: Option<u16>,
        /// 파싱된 응답 본문 (진단용)
        body: Option<serde_json::Value>,
    },

    /// 네트워크 에러 (연결 실패, 타임아웃)
    #[error("Network error: {0}")]
    Network(String),
}

impl CoreError {
    /// 상태 코드/본문이 붙은 API 에러 생성
    pub fn api(
        message: impl Into<String>,
        status_code: Option<u16>,
        body: Option<serde_json::Value>,
    ) -> Self {
        CoreError::Api {
            message: message.into(),
            status_code,
            body,
        }
    }

    /// 에러 분류
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Config(_) => ErrorKind::Configuration,
            CoreError::InvalidArgument(_) | CoreError::Validation { .. } => {
                ErrorKind::InvalidArgument
            }
            CoreError::Auth(_) => ErrorKind::Auth,
            CoreError::Api { .. } => ErrorKind::Api,
            CoreError::Network(_) => ErrorKind::Network,
        }
    }

    /// API 에러 계열 여부 (네트워크 에러는 API 에러의 하위 종류로 취급)
    pub fn is_api_error(&self) -> bool {
        matches!(self, CoreError::Api { .. } | CoreError::Network(_))
    }

    /// 요청 전에 로컬에서 걸러진 에러인지 여부
    pub fn is_local(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Configuration | ErrorKind::InvalidArgument
        )
    }

    /// API 에러에 붙은 상태 코드
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CoreError::Api { status_code, .. } => *status_code,
            CoreError::Auth(_) => Some(401),
            _ => None,
        }
    }

    /// API 에러에 붙은 응답 본문
    pub fn response_body(&self) -> Option<&serde_json::Value> {
        match self {
            CoreError::Api { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}
