//! Scout APM 도메인 모델.
//!
//! 원격 API 응답은 리소스마다 모양이 달라 정적 타입 대신
//! [`envelope::Envelope`] 하나로 다루고, 연산별로 필요한 필드만 꺼낸다.

pub mod envelope;
pub mod interval;
pub mod metric;
pub mod resource;
