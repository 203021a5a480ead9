//! # scoutapm-core
//!
//! Scout APM 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 네트워크 어댑터와 도구 라우터가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`]: 시간 구간, 메트릭/인사이트 종류, 응답 엔벨로프
//! - [`validation`]: 요청 전 로컬 파라미터 검증 (순수 함수)
//! - [`ports`]: Hexagonal Architecture 포트 인터페이스 (async_trait)
//! - [`error`]: 핵심 에러 타입 (thiserror)
//! - [`config`]: 클라이언트/도구 설정 구조체
//! - [`clock`]: 현재 시각 주입 (테스트용 고정 시계 포함)

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod ports;
pub mod validation;
